//! # Balances & Fixed-Point Display
//!
//! All ledger arithmetic happens on signed 64-bit integers in smallest
//! units; one whole unit is 10^7 smallest units. Floating point never
//! touches a balance -- the only place a decimal point appears is in the
//! display strings produced here, and those are built with integer
//! division, for human eyes only.

use crate::config::BALANCE_SCALE_DECIMALS;

/// A balance in smallest units.
///
/// Valid range is `[-(2^63 - 1), 2^63 - 1]`; the most negative `i64` is
/// excluded so negation is always safe.
pub type Balance = i64;

// ---------------------------------------------------------------------------
// Precision
// ---------------------------------------------------------------------------

/// Declared decimal precision of a fractional asset.
///
/// A closed enum rather than a bare `u8` so that an out-of-range precision
/// is unrepresentable -- the codec can reject bad bytes at the boundary and
/// everything past it can trust the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
    P7,
}

impl Precision {
    /// All precisions, in ascending order.
    pub const ALL: [Precision; 7] = [
        Precision::P1,
        Precision::P2,
        Precision::P3,
        Precision::P4,
        Precision::P5,
        Precision::P6,
        Precision::P7,
    ];

    /// Number of declared decimal places, in 1..=7.
    pub fn decimals(self) -> u8 {
        match self {
            Precision::P1 => 1,
            Precision::P2 => 2,
            Precision::P3 => 3,
            Precision::P4 => 4,
            Precision::P5 => 5,
            Precision::P6 => 6,
            Precision::P7 => 7,
        }
    }

    /// Inverse of [`Precision::decimals`]. `None` outside 1..=7.
    pub fn from_decimals(decimals: u8) -> Option<Precision> {
        match decimals {
            1 => Some(Precision::P1),
            2 => Some(Precision::P2),
            3 => Some(Precision::P3),
            4 => Some(Precision::P4),
            5 => Some(Precision::P5),
            6 => Some(Precision::P6),
            7 => Some(Precision::P7),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Fixed-point rendering
// ---------------------------------------------------------------------------

/// Renders `balance / 10^7` in fixed notation with exactly `digits` decimal
/// places.
///
/// Pure integer arithmetic. When `digits` is smaller than the scale's seven
/// sub-unit digits, the last kept digit is rounded half away from zero;
/// when it is larger, the extra positions are zero-filled.
pub(crate) fn format_scaled(balance: Balance, digits: u32) -> String {
    let scale = 10u128.pow(BALANCE_SCALE_DECIMALS);
    let mag = (balance as i128).unsigned_abs();

    let (whole, frac) = if digits >= BALANCE_SCALE_DECIMALS {
        let pad = 10u128.pow(digits - BALANCE_SCALE_DECIMALS);
        (mag / scale, (mag % scale) * pad)
    } else {
        let divisor = 10u128.pow(BALANCE_SCALE_DECIMALS - digits);
        let mut scaled = mag / divisor;
        if 2 * (mag % divisor) >= divisor {
            scaled += 1;
        }
        let frac_base = 10u128.pow(digits);
        (scaled / frac_base, scaled % frac_base)
    };

    format!(
        "{}{}.{:0>width$}",
        if balance < 0 { "-" } else { "" },
        whole,
        frac,
        width = digits as usize
    )
}
