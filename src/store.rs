//! # Asset Store — Embedded Persistence
//!
//! Assets live in a sled tree keyed by their 32 address bytes, with the
//! canonical binary encoding as the value. Using the consensus codec for
//! storage is deliberate: the stored bytes ARE the hash input, so a node
//! can prove what it has on disk without re-encoding anything.
//!
//! sled handles its own locking -- trees support lock-free concurrent reads
//! and serialized writes -- so an `AssetStore` can be shared across threads
//! behind an `Arc` with no further ceremony.

use std::path::Path;

use sled::{Db, Tree};
use thiserror::Error;
use tracing::{debug, warn};

use crate::codec::binary::{decode_asset, encode_asset, DecodeError};
use crate::ledger::address::{Address, AssetId};
use crate::ledger::asset::Asset;

/// Tree holding `address bytes -> binary asset` entries.
const ASSETS_TREE: &str = "assets";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from asset store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying sled database failed.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// A stored value did not decode. Either the disk bit-rotted or
    /// something other than this store wrote the key.
    #[error("stored asset is corrupt: {0}")]
    Codec(#[from] DecodeError),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// AssetStore
// ---------------------------------------------------------------------------

/// Persistent store of assets, keyed by asset address.
#[derive(Debug, Clone)]
pub struct AssetStore {
    db: Db,
    assets: Tree,
}

impl AssetStore {
    /// Opens (or creates) a store at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Opens a temporary in-memory store that vanishes on drop. For tests.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let assets = db.open_tree(ASSETS_TREE)?;
        Ok(Self { db, assets })
    }

    /// Writes an asset under its address, replacing any previous version.
    pub fn put_asset(&self, asset: &Asset) -> StoreResult<()> {
        let bytes = encode_asset(asset);
        debug!(
            "storing asset {} ({} bytes, {} holders)",
            asset.address,
            bytes.len(),
            asset.holdings().len()
        );
        self.assets.insert(asset.address.as_bytes(), bytes)?;
        Ok(())
    }

    /// Reads the asset at `address`, or `None` if absent.
    pub fn get_asset(&self, address: &Address<AssetId>) -> StoreResult<Option<Asset>> {
        match self.assets.get(address.as_bytes())? {
            None => Ok(None),
            Some(bytes) => {
                let asset = decode_asset(&bytes).map_err(|e| {
                    warn!("corrupt asset at {}: {}", address, e);
                    e
                })?;
                Ok(Some(asset))
            }
        }
    }

    /// `true` if an asset exists at `address`.
    pub fn contains(&self, address: &Address<AssetId>) -> StoreResult<bool> {
        Ok(self.assets.contains_key(address.as_bytes())?)
    }

    /// Number of stored assets.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Forces buffered writes to disk.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
