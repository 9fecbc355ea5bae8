//! # Genesis Preallocation Loader
//!
//! At network genesis, operators drop one JSON file per asset into the
//! directory named by `network.preallocated`; this module reads them back
//! into ledger state. Preallocated files are the one place holdings appear
//! without a matching supply decrement ([`Asset::preallocate`] semantics),
//! so the loader is also where their structure gets checked -- the pure
//! algebra deliberately does not.
//!
//! The loader is all-or-nothing. A genesis state that silently skipped an
//! unreadable file would differ between nodes, which is the exact failure
//! the ledger exists to prevent, so any bad file fails the whole load.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::codec::json::{load_asset, AssetFileError};
use crate::ledger::asset::Asset;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading the preallocated-assets directory.
#[derive(Debug, Error)]
pub enum GenesisError {
    /// The directory itself cannot be read.
    #[error("cannot read preallocation directory {path}: {source}")]
    ReadDir {
        /// The configured directory.
        path: PathBuf,
        /// The underlying IO failure.
        source: std::io::Error,
    },

    /// One of the asset files failed to load or parse.
    #[error("cannot load {path}: {source}")]
    Load {
        /// The offending file.
        path: PathBuf,
        /// The load failure.
        source: AssetFileError,
    },

    /// A loaded asset has a zero or negative holdings entry, or negative
    /// supply. Such a file can only come from broken tooling.
    #[error("asset in {path} has malformed holdings or supply")]
    Malformed {
        /// The offending file.
        path: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Loads every `*.json` asset file in `dir`.
///
/// Returns the assets sorted by address, so downstream iteration (state
/// hashing, store population) is deterministic regardless of directory
/// listing order. Non-JSON files are ignored; JSON files that fail to
/// parse or violate holdings structure fail the whole load.
pub fn load_preallocated<P: AsRef<Path>>(dir: P) -> Result<Vec<Asset>, GenesisError> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|source| GenesisError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GenesisError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        } else {
            warn!("ignoring non-JSON entry {} in preallocation dir", path.display());
        }
    }
    // Deterministic load order, so the first error is the same on every node.
    paths.sort();

    let mut assets = Vec::with_capacity(paths.len());
    for path in paths {
        let asset = load_asset(&path).map_err(|source| GenesisError::Load {
            path: path.clone(),
            source,
        })?;
        if !asset.holdings_well_formed() {
            return Err(GenesisError::Malformed { path });
        }
        info!(
            "loaded preallocated asset {} ({}, {} holders, supply {})",
            asset.name,
            asset.address,
            asset.holdings().len(),
            asset.supply
        );
        assets.push(asset);
    }

    assets.sort_by(|a, b| a.address.cmp(&b.address));
    Ok(assets)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::json::save_asset;
    use crate::config::ADDRESS_LENGTH;
    use crate::ledger::address::{Address, Holder};
    use crate::ledger::asset::{derive_asset_address, AssetType, Holdings, Metadata, Ref};

    fn preallocated(name: &str, balances: &[(u8, i64)]) -> Asset {
        let issuer = Address::from_raw([0xAA; ADDRESS_LENGTH]);
        let address = derive_asset_address(name, &issuer, 0);
        let mut holdings = Holdings::new();
        for (fill, balance) in balances {
            holdings.insert(
                Holder::Account(Address::from_raw([*fill; ADDRESS_LENGTH])),
                *balance,
            );
        }
        Asset::new(
            name,
            issuer,
            0,
            Some(Ref::Token),
            AssetType::Discrete,
            0,
            address,
            Metadata::new(),
        )
        .preallocate(holdings)
    }

    #[test]
    fn loads_every_json_file_sorted_by_address() {
        let dir = tempfile::tempdir().unwrap();
        let gold = preallocated("gold", &[(0x01, 600), (0x02, 400)]);
        let silver = preallocated("silver", &[(0x01, 50)]);
        save_asset(dir.path().join("gold.json"), &gold).unwrap();
        save_asset(dir.path().join("silver.json"), &silver).unwrap();
        // A stray non-JSON file is ignored.
        std::fs::write(dir.path().join("README"), "not an asset").unwrap();

        let assets = load_preallocated(dir.path()).unwrap();
        assert_eq!(assets.len(), 2);
        assert!(assets[0].address < assets[1].address);
        assert!(assets.iter().any(|a| a.name == "gold"));
        assert!(assets.iter().any(|a| a.name == "silver"));
    }

    #[test]
    fn empty_directory_yields_no_assets() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_preallocated(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_preallocated(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, GenesisError::ReadDir { .. }));
    }

    #[test]
    fn one_bad_file_fails_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        save_asset(
            dir.path().join("good.json"),
            &preallocated("good", &[(0x01, 10)]),
        )
        .unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ nope").unwrap();

        let err = load_preallocated(dir.path()).unwrap_err();
        match err {
            GenesisError::Load { path, .. } => {
                assert_eq!(path.file_name().unwrap(), "bad.json");
            }
            other => panic!("expected Load error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_holdings_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        // A zero entry violates the holdings invariant.
        let bad = preallocated("bad", &[(0x01, 0)]);
        save_asset(dir.path().join("bad.json"), &bad).unwrap();

        let err = load_preallocated(dir.path()).unwrap_err();
        assert!(matches!(err, GenesisError::Malformed { .. }));
    }
}
