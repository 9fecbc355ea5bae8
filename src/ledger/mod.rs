//! # Ledger Module — The Asset Data Model & Algebra
//!
//! Everything consensus must agree on about assets lives here. If the codec
//! module is the ledger's wire protocol, this module is the ledger itself:
//! who can hold value, how much, and which movements are legal.
//!
//! ## Architecture
//!
//! ```text
//! address.rs — Typed 32-byte addresses with phantom kinds; Holder union
//! fixed.rs   — Balance type, declared precisions, fixed-point display
//! asset.rs   — Asset record, error taxonomy, the holdings algebra
//! ```
//!
//! ## Design Principles
//!
//! 1. **All balances are `i64` in smallest units.** The 10^7 scale exists
//!    only at the display boundary; the algebra never divides.
//!
//! 2. **Pure operations.** Every mutation is `&Asset -> Result<Asset, _>`.
//!    No partial updates to unwind, no error that leaves the books torn.
//!
//! 3. **Ordered everything.** Holdings and metadata are B-tree maps so a
//!    given ledger state has exactly one iteration order and therefore
//!    exactly one encoding.

pub mod address;
pub mod asset;
pub mod fixed;

pub use address::{AccountId, Address, AddressError, AddressKind, AssetId, ContractId, Holder};
pub use asset::{
    derive_asset_address, Asset, AssetError, AssetType, Holdings, Metadata, Ref, Timestamp,
};
pub use fixed::{Balance, Precision};
