//! # Assets & the Holdings Algebra
//!
//! An [`Asset`] is a named, fixed-supply quantity whose units are held by
//! accounts and contracts. The struct itself is plain data; all movement of
//! value goes through a small pure algebra -- [`Asset::circulate_supply`]
//! and [`Asset::transfer_holdings`] -- where every operation either returns
//! a fresh asset with the books balanced or an [`AssetError`] and leaves
//! the input untouched. There is no third outcome, which is what lets the
//! surrounding consensus machinery replay, reorder, and discard operations
//! without corrupting state.
//!
//! ## Supply model
//!
//! `supply` is the *remaining uncirculated* pool. Circulating `n` units to
//! a holder moves them out of the pool (`supply -= n`); the quantity
//! `supply + Σ holdings` is invariant under every operation after creation.
//! Supply is never increased and assets are never destroyed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::address::{AccountId, Address, AssetId, Holder};
use super::fixed::{format_scaled, Balance, Precision};

/// An opaque instant supplied, already parsed, by collaborators. The ledger
/// core never reads a clock.
pub type Timestamp = i64;

/// Free-form key/value annotations on an asset. A `BTreeMap` so that keys
/// are unique and iteration order -- and therefore the binary encoding --
/// is deterministic.
pub type Metadata = BTreeMap<String, String>;

/// The holdings ledger: holder to non-zero, positive balance. Ordered by
/// the holder's (tag, bytes) so encoding is insertion-order independent.
pub type Holdings = BTreeMap<Holder, Balance>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the holdings algebra.
///
/// Always returned, never thrown: on failure the input asset is unchanged
/// and the caller may keep using it. Codec failures are deliberately a
/// separate type ([`crate::codec::binary::DecodeError`]) -- they happen
/// outside the pure algebra.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    /// A transfer (or negative circulation) asked for more than the
    /// holder's balance.
    #[error("insufficient holdings for {holder}: balance is {balance}")]
    InsufficientHoldings {
        /// The debited holder.
        holder: Holder,
        /// That holder's balance at the time of the call.
        balance: Balance,
    },

    /// Circulation would drive the uncirculated supply negative.
    #[error("insufficient supply on asset {address}: {supply} remaining")]
    InsufficientSupply {
        /// The asset's address.
        address: Address<AssetId>,
        /// Remaining uncirculated supply at the time of the call.
        supply: Balance,
    },

    /// A party other than the issuer attempted circulation. Never raised
    /// by the algebra itself -- this is the policy hook callers enforce
    /// via [`Asset::authorize_circulator`].
    #[error("{holder} is not the issuer of asset {address}")]
    CirculatorIsNotIssuer {
        /// The party that attempted circulation.
        holder: Holder,
        /// The asset's address.
        address: Address<AssetId>,
    },

    /// Transfer with identical source and destination.
    #[error("self transfer by {0}")]
    SelfTransfer(Holder),

    /// Transfer source has no holdings entry at all.
    #[error("holder {0} has no holdings entry")]
    HolderDoesNotExist(Holder),
}

// ---------------------------------------------------------------------------
// Ref
// ---------------------------------------------------------------------------

/// Symbolic off-chain reference unit for an asset.
///
/// A closed set: the wire format spells these out as ASCII literals, so an
/// unknown reference is simply not constructible on any node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ref {
    USD,
    GBP,
    EUR,
    CHF,
    Token,
    Security,
}

impl Ref {
    /// The exact ASCII literal used on the wire.
    pub fn wire_tag(self) -> &'static str {
        match self {
            Ref::USD => "USD",
            Ref::GBP => "GBP",
            Ref::EUR => "EUR",
            Ref::CHF => "CHF",
            Ref::Token => "Token",
            Ref::Security => "Security",
        }
    }

    /// Inverse of [`Ref::wire_tag`]. `None` for anything else.
    pub fn from_wire_tag(tag: &str) -> Option<Ref> {
        match tag {
            "USD" => Some(Ref::USD),
            "GBP" => Some(Ref::GBP),
            "EUR" => Some(Ref::EUR),
            "CHF" => Some(Ref::CHF),
            "Token" => Some(Ref::Token),
            "Security" => Some(Ref::Security),
            _ => None,
        }
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_tag())
    }
}

// ---------------------------------------------------------------------------
// AssetType
// ---------------------------------------------------------------------------

/// How an asset's integer balances are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    /// Whole-unit quantities; displayed as the raw integer.
    Discrete,
    /// Fixed-point quantities with a declared decimal precision, stored at
    /// the full 10^7 scale.
    Fractional(Precision),
    /// Possession flag: only balances 0 and 1 are meaningful.
    Binary,
}

impl AssetType {
    /// Human-readable rendering of a balance under this type.
    ///
    /// Display only -- nothing on a consensus path consumes these strings.
    /// `Fractional(p)` renders with `p + 1` decimal places, one more than
    /// the declared precision; operator tooling has depended on that extra
    /// digit since the first network, so it stays.
    pub fn display(&self, balance: Balance) -> String {
        match self {
            AssetType::Discrete => balance.to_string(),
            AssetType::Binary => {
                if balance > 0 {
                    "held".to_string()
                } else {
                    "not-held".to_string()
                }
            }
            AssetType::Fractional(p) => format_scaled(balance, p.decimals() as u32 + 1),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A named, fixed-supply on-chain asset and its holdings ledger.
///
/// Field order matters: the binary codec serializes fields in declaration
/// order, so reordering them is a wire-format break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Human-readable asset name.
    pub name: String,

    /// Account that issued the asset and may circulate its supply.
    pub issuer: Address<AccountId>,

    /// Issuance instant, supplied by the caller at creation.
    pub issued_on: Timestamp,

    /// Remaining uncirculated supply, in smallest units. Decreases as
    /// units circulate; never increases after creation.
    pub supply: Balance,

    /// Holder balances. Maintained by the algebra: no zero entries, no
    /// negative entries. Mutate only through [`Asset::circulate_supply`],
    /// [`Asset::transfer_holdings`], or [`Asset::preallocate`].
    pub(crate) holdings: Holdings,

    /// Optional off-chain reference unit.
    pub reference: Option<Ref>,

    /// Interpretation of this asset's balances.
    pub asset_type: AssetType,

    /// The asset's own address, content-addressed at creation.
    pub address: Address<AssetId>,

    /// Free-form annotations. Not interpreted by the ledger.
    pub metadata: Metadata,
}

/// Derives an asset address from the creation parameters.
///
/// SHA-256 over name, issuer bytes, and timestamp with `0x00` separators
/// (the separators keep `("ab", "c")` and `("a", "bc")` from colliding).
/// Same inputs, same address, on every node.
pub fn derive_asset_address(
    name: &str,
    issuer: &Address<AccountId>,
    issued_on: Timestamp,
) -> Address<AssetId> {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update([0x00]);
    hasher.update(issuer.as_bytes());
    hasher.update([0x00]);
    hasher.update(issued_on.to_be_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    Address::from_raw(digest)
}

impl Asset {
    /// Pure constructor: empty holdings, the full supply uncirculated.
    ///
    /// Performs no validation -- callers are expected to have checked
    /// `supply >= 0` and the address format upstream (RPC and genesis both
    /// do). Garbage in, garbage ledger.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        issuer: Address<AccountId>,
        supply: Balance,
        reference: Option<Ref>,
        asset_type: AssetType,
        issued_on: Timestamp,
        address: Address<AssetId>,
        metadata: Metadata,
    ) -> Asset {
        Asset {
            name: name.into(),
            issuer,
            issued_on,
            supply,
            holdings: Holdings::new(),
            reference,
            asset_type,
            address,
            metadata,
        }
    }

    /// Read-only view of the holdings ledger.
    pub fn holdings(&self) -> &Holdings {
        &self.holdings
    }

    /// A holder's balance, or `None` if the holder has no entry.
    ///
    /// `Some(0)` is never returned: zero entries are pruned on every
    /// update, so absence and zero are the same observation.
    pub fn balance(&self, holder: &Holder) -> Option<Balance> {
        self.holdings.get(holder).copied()
    }

    /// Total units currently in circulation: the sum of all holdings.
    pub fn circulation(&self) -> Balance {
        self.holdings.values().sum()
    }

    /// Checks that circulated holdings do not exceed the remaining supply.
    ///
    /// This is the historical check, measured against the *current*
    /// remaining supply rather than the (unrecorded) initial supply -- so
    /// a fully-preallocated asset fails it. Every validator runs the same
    /// check, which is what consensus actually requires of it.
    pub fn validate(&self) -> bool {
        self.circulation() <= self.supply
    }

    /// `true` when the holdings map satisfies its structural invariants:
    /// every entry strictly positive, supply non-negative.
    pub(crate) fn holdings_well_formed(&self) -> bool {
        self.supply >= 0 && self.holdings.values().all(|b| *b > 0)
    }

    /// Installs an initial holdings map wholesale, replacing any existing
    /// entries without adjusting `supply`.
    ///
    /// Genesis-only: this is the one path that sets holdings without a
    /// matching supply decrement, and nothing here stops a preallocation
    /// that exceeds the supply. Enforcement is the genesis loader's job.
    pub fn preallocate(&self, holdings: Holdings) -> Asset {
        let mut updated = self.clone();
        updated.holdings = holdings;
        updated
    }

    /// Moves `amount` units between the uncirculated pool and `holder`.
    ///
    /// Positive `amount` circulates units to the holder (`supply` drops);
    /// negative `amount` returns them to the pool. Zero-balance entries
    /// are pruned. The input asset is never modified.
    ///
    /// # Errors
    ///
    /// [`AssetError::InsufficientSupply`] when `supply < amount`;
    /// [`AssetError::InsufficientHoldings`] when a negative `amount` would
    /// drive the holder's balance below zero.
    pub fn circulate_supply(&self, holder: &Holder, amount: Balance) -> Result<Asset, AssetError> {
        debug_assert!(self.holdings_well_formed(), "asset invariants violated");

        if self.supply < amount {
            return Err(AssetError::InsufficientSupply {
                address: self.address,
                supply: self.supply,
            });
        }

        let current = self.balance(holder).unwrap_or(0);
        let next = current + amount;
        if next < 0 {
            return Err(AssetError::InsufficientHoldings {
                holder: *holder,
                balance: current,
            });
        }

        let mut updated = self.clone();
        if next == 0 {
            updated.holdings.remove(holder);
        } else {
            updated.holdings.insert(*holder, next);
        }
        updated.supply -= amount;
        Ok(updated)
    }

    /// Transfers `amount` units from one holder to another.
    ///
    /// Implemented as two circulations -- debit `from`, credit `to` -- so
    /// net supply impact is zero by construction. A zero-amount transfer
    /// between distinct parties succeeds and changes nothing.
    ///
    /// # Errors
    ///
    /// Checked in order: [`AssetError::SelfTransfer`] when `from == to`;
    /// [`AssetError::HolderDoesNotExist`] when `from` has no entry;
    /// [`AssetError::InsufficientHoldings`] when `amount` is negative or
    /// exceeds the source balance.
    pub fn transfer_holdings(
        &self,
        from: &Holder,
        to: &Holder,
        amount: Balance,
    ) -> Result<Asset, AssetError> {
        if from == to {
            return Err(AssetError::SelfTransfer(*from));
        }

        let balance = match self.balance(from) {
            Some(b) => b,
            None => return Err(AssetError::HolderDoesNotExist(*from)),
        };

        if amount < 0 || amount > balance {
            return Err(AssetError::InsufficientHoldings {
                holder: *from,
                balance,
            });
        }

        let debited = self.circulate_supply(from, -amount)?;
        debited.circulate_supply(to, amount)
    }

    /// Issuer policy check for circulation requests.
    ///
    /// The pure algebra does not care who circulates; the RPC and block
    /// application layers do. They call this before `circulate_supply`
    /// and map the error to a transaction rejection.
    pub fn authorize_circulator(&self, holder: &Holder) -> Result<(), AssetError> {
        match holder {
            Holder::Account(addr) if addr.as_bytes() == self.issuer.as_bytes() => Ok(()),
            _ => Err(AssetError::CirculatorIsNotIssuer {
                holder: *holder,
                address: self.address,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
