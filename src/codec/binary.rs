//! # Binary Codec — The Authoritative Wire Form
//!
//! This is the encoding consensus hashes and signs. One value, one byte
//! sequence: big-endian integers of natural width, 16-bit length prefixes
//! on byte strings, tag bytes on options, and maps written in their B-tree
//! iteration order. serde is deliberately absent -- a derive-based format
//! leaves field ordering and integer widths to someone else's crate, and
//! "someone else" does not get a vote on consensus bytes.
//!
//! Holders encode as their 32 address bytes alone; the account/contract
//! tag is not on the wire. Decoding therefore reconstructs every holder as
//! an `Account`. That lossiness is part of the format -- changing it is a
//! consensus break, not a bug fix.
//!
//! Decode failures are [`DecodeError`], a separate type from the ledger's
//! [`AssetError`](crate::ledger::AssetError): they occur at the boundary,
//! outside the pure algebra.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::{ADDRESS_LENGTH, MAX_WIRE_FIELD_BYTES};
use crate::ledger::address::{Address, AddressError, AddressKind, Holder};
use crate::ledger::asset::{Asset, AssetType, Holdings, Metadata, Ref};
use crate::ledger::fixed::Precision;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while decoding the binary form.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The input ended before the field at `offset` could be read.
    #[error("truncated input: needed {needed} more bytes at offset {offset}")]
    Truncated {
        /// Byte offset at which the read started.
        offset: usize,
        /// Bytes the read still required.
        needed: usize,
    },

    /// A reference tag that is not one of the known literals.
    #[error("unknown reference tag {0:?}")]
    UnknownRef(String),

    /// An asset type tag that is not one of the known literals.
    #[error("unknown asset type tag {0:?}")]
    UnknownAssetType(String),

    /// A `Fractional` precision byte outside 1..=7.
    #[error("invalid precision byte {0}")]
    InvalidPrecision(u8),

    /// An option tag byte other than 0 or 1.
    #[error("invalid option tag {0}")]
    InvalidOptionTag(u8),

    /// A length-prefixed text field that is not UTF-8.
    #[error("field {0:?} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    /// Bytes left over after a complete value was decoded.
    #[error("{0} trailing bytes after value")]
    TrailingInput(usize),

    /// An embedded address failed validation.
    #[error(transparent)]
    Address(#[from] AddressError),
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

fn put_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    // A field over 64 KiB cannot be represented on the wire at all; hitting
    // this is a programmer error upstream, not a runtime condition.
    assert!(
        bytes.len() <= MAX_WIRE_FIELD_BYTES,
        "wire field of {} bytes exceeds the u16 length prefix",
        bytes.len()
    );
    buf.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    buf.extend_from_slice(bytes);
}

fn put_ref(buf: &mut Vec<u8>, reference: Ref) {
    put_len_prefixed(buf, reference.wire_tag().as_bytes());
}

fn put_asset_type(buf: &mut Vec<u8>, asset_type: &AssetType) {
    match asset_type {
        AssetType::Discrete => put_len_prefixed(buf, b"Discrete"),
        AssetType::Binary => put_len_prefixed(buf, b"Binary"),
        AssetType::Fractional(p) => {
            put_len_prefixed(buf, b"Fractional");
            buf.push(p.decimals());
        }
    }
}

fn put_holdings(buf: &mut Vec<u8>, holdings: &Holdings) {
    buf.extend_from_slice(&(holdings.len() as u64).to_be_bytes());
    // BTreeMap iteration is ascending (tag, bytes) holder order, which is
    // exactly the ordering the format mandates.
    for (holder, balance) in holdings {
        buf.extend_from_slice(holder.address_bytes());
        buf.extend_from_slice(&balance.to_be_bytes());
    }
}

fn put_metadata(buf: &mut Vec<u8>, metadata: &Metadata) {
    buf.extend_from_slice(&(metadata.len() as u64).to_be_bytes());
    for (key, value) in metadata {
        put_len_prefixed(buf, key.as_bytes());
        put_len_prefixed(buf, value.as_bytes());
    }
}

/// Encodes a reference tag alone. Exposed for the store of literals it
/// pins: `Security` is always `00 08 "Security"`.
pub fn encode_ref(reference: Ref) -> Vec<u8> {
    let mut buf = Vec::new();
    put_ref(&mut buf, reference);
    buf
}

/// Encodes an asset type tag alone (plus precision byte for `Fractional`).
pub fn encode_asset_type(asset_type: &AssetType) -> Vec<u8> {
    let mut buf = Vec::new();
    put_asset_type(&mut buf, asset_type);
    buf
}

/// Encodes an asset to its canonical byte sequence.
///
/// Fields are written in declaration order: name, issuer, issued_on,
/// supply, holdings, reference, asset_type, address, metadata. The output
/// is the input to the ledger hash and to storage -- equal assets produce
/// identical bytes, always.
pub fn encode_asset(asset: &Asset) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + 40 * asset.holdings().len());

    put_len_prefixed(&mut buf, asset.name.as_bytes());
    buf.extend_from_slice(asset.issuer.as_bytes());
    buf.extend_from_slice(&asset.issued_on.to_be_bytes());
    buf.extend_from_slice(&asset.supply.to_be_bytes());
    put_holdings(&mut buf, asset.holdings());
    match asset.reference {
        None => buf.push(0x00),
        Some(r) => {
            buf.push(0x01);
            put_ref(&mut buf, r);
        }
    }
    put_asset_type(&mut buf, &asset.asset_type);
    buf.extend_from_slice(asset.address.as_bytes());
    put_metadata(&mut buf, &asset.metadata);

    buf
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over an input buffer. Every read is bounds-checked; running off
/// the end is a [`DecodeError::Truncated`], never a panic.
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16_be(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u64_be(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(raw))
    }

    fn i64_be(&mut self) -> Result<i64, DecodeError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(raw))
    }

    fn len_prefixed(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.u16_be()? as usize;
        self.take(len)
    }

    fn text(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let bytes = self.len_prefixed()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8(field))
    }

    fn address<K: AddressKind>(&mut self) -> Result<Address<K>, DecodeError> {
        Ok(Address::from_bytes(self.take(ADDRESS_LENGTH)?)?)
    }

    fn reference(&mut self) -> Result<Ref, DecodeError> {
        let tag = self.len_prefixed()?;
        std::str::from_utf8(tag)
            .ok()
            .and_then(Ref::from_wire_tag)
            .ok_or_else(|| DecodeError::UnknownRef(String::from_utf8_lossy(tag).into_owned()))
    }

    fn asset_type(&mut self) -> Result<AssetType, DecodeError> {
        let tag = self.len_prefixed()?;
        match tag {
            b"Discrete" => Ok(AssetType::Discrete),
            b"Binary" => Ok(AssetType::Binary),
            b"Fractional" => {
                let byte = self.u8()?;
                let precision = Precision::from_decimals(byte)
                    .ok_or(DecodeError::InvalidPrecision(byte))?;
                Ok(AssetType::Fractional(precision))
            }
            other => Err(DecodeError::UnknownAssetType(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    fn holdings(&mut self) -> Result<Holdings, DecodeError> {
        let len = self.u64_be()?;
        let mut holdings = Holdings::new();
        for _ in 0..len {
            // The wire carries no holder tag; every decoded holder is an
            // account by convention.
            let holder = Holder::Account(self.address()?);
            let balance = self.i64_be()?;
            holdings.insert(holder, balance);
        }
        Ok(holdings)
    }

    fn metadata(&mut self) -> Result<Metadata, DecodeError> {
        let len = self.u64_be()?;
        let mut metadata = BTreeMap::new();
        for _ in 0..len {
            let key = self.text("metadata key")?;
            let value = self.text("metadata value")?;
            metadata.insert(key, value);
        }
        Ok(metadata)
    }

    fn asset(&mut self) -> Result<Asset, DecodeError> {
        let name = self.text("name")?;
        let issuer = self.address()?;
        let issued_on = self.i64_be()?;
        let supply = self.i64_be()?;
        let holdings = self.holdings()?;
        let reference = match self.u8()? {
            0x00 => None,
            0x01 => Some(self.reference()?),
            other => return Err(DecodeError::InvalidOptionTag(other)),
        };
        let asset_type = self.asset_type()?;
        let address = self.address()?;
        let metadata = self.metadata()?;

        Ok(Asset {
            name,
            issuer,
            issued_on,
            supply,
            holdings,
            reference,
            asset_type,
            address,
            metadata,
        })
    }

    fn finish(self) -> Result<(), DecodeError> {
        if self.remaining() > 0 {
            return Err(DecodeError::TrailingInput(self.remaining()));
        }
        Ok(())
    }
}

/// Decodes a reference tag from exactly the bytes produced by
/// [`encode_ref`]. Trailing input is an error.
pub fn decode_ref(bytes: &[u8]) -> Result<Ref, DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let reference = reader.reference()?;
    reader.finish()?;
    Ok(reference)
}

/// Decodes an asset type from exactly the bytes produced by
/// [`encode_asset_type`].
pub fn decode_asset_type(bytes: &[u8]) -> Result<AssetType, DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let asset_type = reader.asset_type()?;
    reader.finish()?;
    Ok(asset_type)
}

/// Decodes an asset from its canonical byte sequence.
///
/// Strict: the buffer must contain exactly one asset, and trailing bytes
/// are rejected. Holder tags are reconstructed as `Account` (see the
/// module docs).
pub fn decode_asset(bytes: &[u8]) -> Result<Asset, DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let asset = reader.asset()?;
    reader.finish()?;
    Ok(asset)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::asset::derive_asset_address;
    use crate::ledger::fixed::Balance;

    fn account(fill: u8) -> Holder {
        Holder::Account(Address::from_raw([fill; ADDRESS_LENGTH]))
    }

    fn sample_asset() -> Asset {
        let issuer = Address::from_raw([0xAA; ADDRESS_LENGTH]);
        let address = derive_asset_address("silver", &issuer, 7);
        let mut asset = Asset::new(
            "silver",
            issuer,
            1_000,
            Some(Ref::Security),
            AssetType::Fractional(Precision::P3),
            7,
            address,
            Metadata::new(),
        );
        asset = asset.circulate_supply(&account(0x01), 600).unwrap();
        asset = asset.circulate_supply(&account(0x02), 250).unwrap();
        asset.metadata.insert("kind".into(), "bar".into());
        asset.metadata.insert("assay".into(), "0.999".into());
        asset
    }

    #[test]
    fn ref_security_pins_its_bytes() {
        let mut expected = vec![0x00, 0x08];
        expected.extend_from_slice(b"Security");
        assert_eq!(encode_ref(Ref::Security), expected);
        assert_eq!(decode_ref(&expected), Ok(Ref::Security));
    }

    #[test]
    fn ref_rejects_unknown_tags() {
        let mut bytes = vec![0x00, 0x07];
        bytes.extend_from_slice(b"Bitcoin");
        assert_eq!(
            decode_ref(&bytes),
            Err(DecodeError::UnknownRef("Bitcoin".into()))
        );
    }

    #[test]
    fn asset_type_tags_pin_their_bytes() {
        let mut discrete = vec![0x00, 0x08];
        discrete.extend_from_slice(b"Discrete");
        assert_eq!(encode_asset_type(&AssetType::Discrete), discrete);

        let mut binary = vec![0x00, 0x06];
        binary.extend_from_slice(b"Binary");
        assert_eq!(encode_asset_type(&AssetType::Binary), binary);

        let mut fractional = vec![0x00, 0x0A];
        fractional.extend_from_slice(b"Fractional");
        fractional.push(5);
        assert_eq!(
            encode_asset_type(&AssetType::Fractional(Precision::P5)),
            fractional
        );
        assert_eq!(
            decode_asset_type(&fractional),
            Ok(AssetType::Fractional(Precision::P5))
        );
    }

    #[test]
    fn asset_type_rejects_bad_precision() {
        let mut bytes = vec![0x00, 0x0A];
        bytes.extend_from_slice(b"Fractional");
        bytes.push(0);
        assert_eq!(decode_asset_type(&bytes), Err(DecodeError::InvalidPrecision(0)));

        bytes.pop();
        bytes.push(8);
        assert_eq!(decode_asset_type(&bytes), Err(DecodeError::InvalidPrecision(8)));
    }

    #[test]
    fn asset_roundtrip() {
        let asset = sample_asset();
        let bytes = encode_asset(&asset);
        let decoded = decode_asset(&bytes).unwrap();
        assert_eq!(decoded, asset);
    }

    #[test]
    fn encoding_is_deterministic() {
        let asset = sample_asset();
        assert_eq!(encode_asset(&asset), encode_asset(&asset));
    }

    #[test]
    fn holdings_encode_in_holder_order() {
        let issuer = Address::from_raw([0xAA; ADDRESS_LENGTH]);
        let address = derive_asset_address("o", &issuer, 1);
        let base = Asset::new(
            "o",
            issuer,
            100,
            None,
            AssetType::Discrete,
            1,
            address,
            Metadata::new(),
        );

        // Same content, opposite circulation order.
        let forward = base
            .circulate_supply(&account(0x01), 10)
            .unwrap()
            .circulate_supply(&account(0x02), 20)
            .unwrap();
        let backward = base
            .circulate_supply(&account(0x02), 20)
            .unwrap()
            .circulate_supply(&account(0x01), 10)
            .unwrap();

        assert_eq!(encode_asset(&forward), encode_asset(&backward));
    }

    #[test]
    fn truncated_input_is_an_error_not_a_panic() {
        let bytes = encode_asset(&sample_asset());
        for cut in [0, 1, 2, 10, bytes.len() / 2, bytes.len() - 1] {
            let err = decode_asset(&bytes[..cut]).unwrap_err();
            assert!(
                matches!(err, DecodeError::Truncated { .. }),
                "cut at {cut} gave {err:?}"
            );
        }
    }

    #[test]
    fn oversized_length_prefix_is_a_truncation_error() {
        // Prefix claims 0xFFFF bytes of name; buffer has two.
        let bytes = [0xFF, 0xFF, 0x41, 0x42];
        assert!(matches!(
            decode_asset(&bytes),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode_asset(&sample_asset());
        bytes.push(0x00);
        assert_eq!(decode_asset(&bytes), Err(DecodeError::TrailingInput(1)));
    }

    #[test]
    fn bad_option_tag_is_rejected() {
        let asset = sample_asset();
        let bytes = encode_asset(&asset);
        // The option tag sits right after the fixed-width prefix fields
        // and the holdings map.
        let offset = 2 + asset.name.len()    // name
            + ADDRESS_LENGTH                 // issuer
            + 8 + 8                          // issued_on, supply
            + 8 + asset.holdings().len() * (ADDRESS_LENGTH + 8);
        assert_eq!(bytes[offset], 0x01);

        let mut mangled = bytes.clone();
        mangled[offset] = 0x02;
        assert_eq!(decode_asset(&mangled), Err(DecodeError::InvalidOptionTag(0x02)));
    }

    #[test]
    fn negative_balances_survive_the_wire() {
        // The codec is structural; it does not police ledger invariants.
        let mut asset = sample_asset();
        let negative: Balance = -5;
        asset.holdings.insert(account(0x03), negative);
        let decoded = decode_asset(&encode_asset(&asset)).unwrap();
        assert_eq!(decoded.balance(&account(0x03)), Some(-5));
    }
}
