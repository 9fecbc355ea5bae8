//! # JSON Codec — The Operator Surface
//!
//! JSON is how humans and tooling look at assets: genesis files, inspection
//! dumps, `save_asset`/`load_asset`. It is deliberately NOT consensus
//! material -- the binary codec is authoritative -- and it is lossy in one
//! documented way: holders serialize as bare address strings, so the
//! account/contract tag evaporates and every decoded holder is an account.
//!
//! The hand-written serde impls in this module exist because the wire
//! shapes predate this implementation: `AssetType` uses a `{"tag",
//! "contents"}` envelope whose `contents` is the precision *plus one*, and
//! addresses are hex strings rather than byte arrays. Those shapes are
//! frozen; the impls adapt to them, not the other way around.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::address::{Address, AddressKind, Holder};
use crate::ledger::asset::{Asset, AssetType};
use crate::ledger::fixed::Precision;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from reading or writing asset files.
#[derive(Debug, Error)]
pub enum AssetFileError {
    /// Filesystem failure (missing file, permissions, short write).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists but does not parse as an asset.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Address & Holder
// ---------------------------------------------------------------------------

impl<K: AddressKind> Serialize for Address<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de, K: AddressKind> Deserialize<'de> for Address<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::from_hex(&text).map_err(de::Error::custom)
    }
}

impl Serialize for Holder {
    /// Both variants serialize as the bare address string; the tag is not
    /// representable in this form.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.address_bytes()))
    }
}

impl<'de> Deserialize<'de> for Holder {
    /// Decodes the bare address string; the variant defaults to `Account`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let address = Address::from_hex(&text).map_err(de::Error::custom)?;
        Ok(Holder::Account(address))
    }
}

// ---------------------------------------------------------------------------
// AssetType
// ---------------------------------------------------------------------------

/// On-disk envelope for [`AssetType`]: `{"tag": ..., "contents": ...}`.
/// `contents` is `null` except for `Fractional`, where it carries the
/// precision's decimal count plus one -- a historical off-by-one that
/// external tooling has calcified around.
#[derive(Deserialize)]
struct AssetTypeWire {
    tag: String,
    #[serde(default)]
    contents: Option<u8>,
}

impl Serialize for AssetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut envelope = serializer.serialize_struct("AssetType", 2)?;
        match self {
            AssetType::Discrete => {
                envelope.serialize_field("tag", "Discrete")?;
                envelope.serialize_field("contents", &Option::<u8>::None)?;
            }
            AssetType::Binary => {
                envelope.serialize_field("tag", "Binary")?;
                envelope.serialize_field("contents", &Option::<u8>::None)?;
            }
            AssetType::Fractional(p) => {
                envelope.serialize_field("tag", "Fractional")?;
                envelope.serialize_field("contents", &Some(p.decimals() + 1))?;
            }
        }
        envelope.end()
    }
}

impl<'de> Deserialize<'de> for AssetType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = AssetTypeWire::deserialize(deserializer)?;
        match wire.tag.as_str() {
            "Discrete" => Ok(AssetType::Discrete),
            "Binary" => Ok(AssetType::Binary),
            "Fractional" => {
                let contents = wire
                    .contents
                    .ok_or_else(|| de::Error::custom("Fractional asset type requires contents"))?;
                contents
                    .checked_sub(1)
                    .and_then(Precision::from_decimals)
                    .map(AssetType::Fractional)
                    .ok_or_else(|| {
                        de::Error::custom(format_args!(
                            "Fractional contents {contents} out of range"
                        ))
                    })
            }
            other => Err(de::Error::custom(format_args!(
                "unknown asset type tag {other:?}"
            ))),
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::Discrete => write!(f, "Discrete"),
            AssetType::Binary => write!(f, "Binary"),
            AssetType::Fractional(p) => write!(f, "Fractional({})", p.decimals()),
        }
    }
}

// ---------------------------------------------------------------------------
// File persistence
// ---------------------------------------------------------------------------

/// Writes an asset to `path` as pretty-printed UTF-8 JSON.
///
/// The file is opened, written, and closed within this call; no handle
/// survives on any exit path.
pub fn save_asset<P: AsRef<Path>>(path: P, asset: &Asset) -> Result<(), AssetFileError> {
    let json = serde_json::to_string_pretty(asset)?;
    fs::write(path, json)?;
    Ok(())
}

/// Reads an asset previously written by [`save_asset`].
///
/// Holder variants come back as `Account` -- the JSON form does not carry
/// the tag.
pub fn load_asset<P: AsRef<Path>>(path: P) -> Result<Asset, AssetFileError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ADDRESS_LENGTH;
    use crate::ledger::asset::{derive_asset_address, Metadata, Ref};

    fn account(fill: u8) -> Holder {
        Holder::Account(Address::from_raw([fill; ADDRESS_LENGTH]))
    }

    fn sample_asset() -> Asset {
        let issuer = Address::from_raw([0xAA; ADDRESS_LENGTH]);
        let address = derive_asset_address("notes", &issuer, 99);
        let mut asset = Asset::new(
            "notes",
            issuer,
            500,
            Some(Ref::USD),
            AssetType::Fractional(Precision::P2),
            99,
            address,
            Metadata::new(),
        );
        asset = asset.circulate_supply(&account(0x01), 120).unwrap();
        asset.metadata.insert("series".into(), "A".into());
        asset
    }

    #[test]
    fn asset_type_envelope_shape() {
        let json = serde_json::to_value(AssetType::Discrete).unwrap();
        assert_eq!(json, serde_json::json!({"tag": "Discrete", "contents": null}));

        let json = serde_json::to_value(AssetType::Binary).unwrap();
        assert_eq!(json, serde_json::json!({"tag": "Binary", "contents": null}));
    }

    #[test]
    fn fractional_contents_is_precision_plus_one() {
        let json = serde_json::to_value(AssetType::Fractional(Precision::P3)).unwrap();
        assert_eq!(json, serde_json::json!({"tag": "Fractional", "contents": 4}));

        let back: AssetType = serde_json::from_value(json).unwrap();
        assert_eq!(back, AssetType::Fractional(Precision::P3));
    }

    #[test]
    fn fractional_contents_bounds() {
        // contents 2..=8 map to precisions 1..=7; everything else is junk.
        for (contents, ok) in [(1u8, false), (2, true), (8, true), (9, false), (0, false)] {
            let json = serde_json::json!({"tag": "Fractional", "contents": contents});
            assert_eq!(
                serde_json::from_value::<AssetType>(json).is_ok(),
                ok,
                "contents {contents}"
            );
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let json = serde_json::json!({"tag": "Continuous", "contents": null});
        assert!(serde_json::from_value::<AssetType>(json).is_err());
    }

    #[test]
    fn ref_serializes_as_constructor_name() {
        assert_eq!(serde_json::to_value(Ref::Security).unwrap(), "Security");
        let back: Ref = serde_json::from_value(serde_json::json!("CHF")).unwrap();
        assert_eq!(back, Ref::CHF);
    }

    #[test]
    fn holder_json_is_the_bare_address() {
        let contract = Holder::Contract(Address::from_raw([0x0C; ADDRESS_LENGTH]));
        let json = serde_json::to_value(contract).unwrap();
        assert_eq!(json, serde_json::json!("0c".repeat(32)));

        // The variant is lost: it comes back as an account.
        let back: Holder = serde_json::from_value(json).unwrap();
        assert_eq!(back, account(0x0C));
        assert_eq!(back.address_bytes(), contract.address_bytes());
    }

    #[test]
    fn asset_roundtrip_with_account_holders() {
        let asset = sample_asset();
        let json = serde_json::to_string(&asset).unwrap();
        let back: Asset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, asset);
    }

    #[test]
    fn asset_json_uses_the_frozen_field_names() {
        let json = serde_json::to_value(sample_asset()).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "name", "issuer", "issuedOn", "supply", "holdings", "reference", "assetType",
            "address", "metadata",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        let asset = sample_asset();

        save_asset(&path, &asset).unwrap();
        let loaded = load_asset(&path).unwrap();
        assert_eq!(loaded, asset);

        // The on-disk form is pretty-printed for human diffing.
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'));
    }

    #[test]
    fn load_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_asset(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AssetFileError::Io(_)));
    }

    #[test]
    fn load_malformed_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_asset(&path).unwrap_err();
        assert!(matches!(err, AssetFileError::Json(_)));
    }
}
