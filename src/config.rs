//! # Ledger Constants
//!
//! Every magic number in the asset ledger lives here. These values are part
//! of the consensus surface: changing any of them after a network launches
//! means every node must upgrade in lockstep or the chain splits.

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Raw address width in bytes. Asset, account, and contract addresses all
/// share this representation; only the type-level tag differs.
pub const ADDRESS_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

/// Largest representable balance, in smallest units.
///
/// Balances are signed 64-bit integers; the valid range is symmetric,
/// `[-MAX_BALANCE, MAX_BALANCE]`. `i64::MIN` is excluded so that negation
/// never overflows.
pub const MAX_BALANCE: i64 = i64::MAX;

/// Fixed-point scaling divisor: one whole unit is 10^7 smallest units.
///
/// With 64-bit balances this yields a maximum displayable quantity of
/// 922,337,203,685.4775807 and a minimum non-zero fraction of 0.0000001.
pub const BALANCE_SCALE: i64 = 10_000_000;

/// Number of decimal digits in [`BALANCE_SCALE`].
pub const BALANCE_SCALE_DECIMALS: u32 = 7;

// ---------------------------------------------------------------------------
// Fractional precision
// ---------------------------------------------------------------------------

/// Smallest declarable fractional precision (decimal places).
pub const MIN_PRECISION_DECIMALS: u8 = 1;

/// Largest declarable fractional precision. Bounded by the scale: there are
/// only seven sub-unit digits to show.
pub const MAX_PRECISION_DECIMALS: u8 = 7;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Maximum length of a single length-prefixed field in the binary codec.
/// Length prefixes are 16-bit, so this is a hard wire-format ceiling, not
/// a tunable.
pub const MAX_WIRE_FIELD_BYTES: usize = u16::MAX as usize;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_matches_decimal_count() {
        assert_eq!(10i64.pow(BALANCE_SCALE_DECIMALS), BALANCE_SCALE);
    }

    #[test]
    fn precision_bounds_fit_the_scale() {
        assert!(MIN_PRECISION_DECIMALS >= 1);
        assert_eq!(MAX_PRECISION_DECIMALS as u32, BALANCE_SCALE_DECIMALS);
    }

    #[test]
    fn max_balance_negation_is_safe() {
        // The symmetric range exists so this never overflows.
        assert_eq!(-(-MAX_BALANCE), MAX_BALANCE);
    }
}
