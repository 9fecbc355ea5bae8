// Copyright (c) 2026 Uplink Technologies. MIT License.
// See LICENSE for details.

//! # Uplink Ledger — Deterministic Asset Core
//!
//! The canonical representation of assets on an Uplink network: who issued
//! what, who holds how much, and the algebra that moves units around
//! without ever minting or losing one. Every node must agree on this state
//! bit for bit, so the crate is built around one obsession: a given ledger
//! value has exactly one byte encoding, on every platform, forever.
//!
//! ## Architecture
//!
//! The modules mirror the actual concerns of a ledger core:
//!
//! - **ledger** — Typed addresses, holders, balances, the asset record,
//!   and the supply-preserving transfer algebra. Pure functions only.
//! - **codec** — The consensus-critical binary form (hashed, signed,
//!   gossiped) and the human-facing JSON form (genesis files, tooling).
//! - **store** — sled-backed persistence keyed by address bytes, storing
//!   the canonical encoding verbatim.
//! - **genesis** — The preallocated-assets loader for network bootstrap.
//! - **config** — The constants everything above agrees on.
//!
//! ## Design Philosophy
//!
//! 1. Determinism over ergonomics: ordered maps, explicit prefixes, fixed
//!    endianness. Convenience that can reorder bytes is not convenience.
//! 2. Errors are values. The algebra returns `Result` and never touches
//!    the input on failure; panics are reserved for corrupted invariants.
//! 3. Floating point is banned from every consensus path. The only
//!    decimal points in this crate are in display strings.
//!
//! The networking, consensus, and RPC layers that drive this core live in
//! their own crates; they consume the values and errors defined here.

pub mod codec;
pub mod config;
pub mod genesis;
pub mod ledger;
pub mod store;

pub use codec::binary::{decode_asset, encode_asset, DecodeError};
pub use codec::json::{load_asset, save_asset, AssetFileError};
pub use genesis::{load_preallocated, GenesisError};
pub use ledger::address::{
    AccountId, Address, AddressError, AddressKind, AssetId, ContractId, Holder,
};
pub use ledger::asset::{
    derive_asset_address, Asset, AssetError, AssetType, Holdings, Metadata, Ref, Timestamp,
};
pub use ledger::fixed::{Balance, Precision};
pub use store::{AssetStore, StoreError};
