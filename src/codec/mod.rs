//! # Codec Module — Wire & File Forms
//!
//! Two serializations with very different contracts:
//!
//! ```text
//! binary.rs — Deterministic, length-prefixed byte form. Consensus-critical:
//!             it feeds the ledger hash and inter-node transmission, and a
//!             single divergent byte forks the network.
//! json.rs   — Human-facing form for genesis files, inspection, and disk
//!             persistence. Stable but lossy (holder tags), never hashed.
//! ```
//!
//! When the two disagree about a value, the binary form wins.

pub mod binary;
pub mod json;

pub use binary::{decode_asset, encode_asset, DecodeError};
pub use json::{load_asset, save_asset, AssetFileError};
