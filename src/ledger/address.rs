//! # Typed Addresses & Holders
//!
//! Every on-chain entity -- asset, account, contract -- is identified by the
//! same 32 raw bytes. What differs is what the bytes *refer to*, and mixing
//! referents up is the kind of bug that moves money to the wrong place. So
//! the kind lives in the type: [`Address<K>`] carries a zero-size phantom
//! marker and the compiler refuses to pass an asset address where an
//! account address is expected. No runtime cost, no runtime casts.
//!
//! A [`Holder`] is the closed union of the two kinds that can own a
//! balance. Holders key the holdings map, so they are ordered -- by tag
//! first, then bytes -- and hashable.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use thiserror::Error;

use crate::config::ADDRESS_LENGTH;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from address construction and parsing.
#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    /// The byte slice has the wrong width.
    #[error("address must be {expected} bytes, got {actual}")]
    BadLength {
        /// Required width ([`ADDRESS_LENGTH`]).
        expected: usize,
        /// Width actually supplied.
        actual: usize,
    },

    /// The textual form is not valid hex.
    #[error("address is not valid hex: {0}")]
    BadHex(#[from] hex::FromHexError),
}

// ---------------------------------------------------------------------------
// Address kinds
// ---------------------------------------------------------------------------

/// Marker for addresses that identify assets.
pub enum AssetId {}
/// Marker for addresses that identify accounts.
pub enum AccountId {}
/// Marker for addresses that identify contracts.
pub enum ContractId {}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::AssetId {}
    impl Sealed for super::AccountId {}
    impl Sealed for super::ContractId {}
}

/// Type-level discriminator for what an address refers to.
///
/// Sealed: the three kinds above are the only ones, ever. Adding a kind is
/// a ledger redesign, not an extension point.
pub trait AddressKind: sealed::Sealed {
    /// Lowercase kind label, used in `Debug` output only.
    const LABEL: &'static str;
}

impl AddressKind for AssetId {
    const LABEL: &'static str = "asset";
}
impl AddressKind for AccountId {
    const LABEL: &'static str = "account";
}
impl AddressKind for ContractId {
    const LABEL: &'static str = "contract";
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// An opaque 32-byte identifier tagged with its referent kind.
///
/// The tag has no runtime footprint: two addresses of different kinds with
/// the same bytes are bit-identical in memory and on the wire. Equality,
/// ordering, and hashing are over the bytes alone (and are only defined
/// within one kind -- the type system forbids cross-kind comparison).
pub struct Address<K: AddressKind> {
    bytes: [u8; ADDRESS_LENGTH],
    _kind: PhantomData<K>,
}

impl<K: AddressKind> Address<K> {
    /// Wraps raw bytes of the exact width. Infallible by construction.
    pub fn from_raw(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self {
            bytes,
            _kind: PhantomData,
        }
    }

    /// Validates the width of a byte slice and wraps it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let raw: [u8; ADDRESS_LENGTH] =
            bytes.try_into().map_err(|_| AddressError::BadLength {
                expected: ADDRESS_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self::from_raw(raw))
    }

    /// The raw byte representation.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.bytes
    }

    /// Lowercase hex textual form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parses the hex textual form.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Reinterprets these bytes under a different kind.
    ///
    /// This is a view, not a cast with a safety net -- nothing checks that
    /// the bytes actually identify a `T`. Confined to this module; the
    /// public tag-discarding surface is [`Holder::holder_to_account`] and
    /// [`Holder::holder_to_contract`].
    fn retag<T: AddressKind>(self) -> Address<T> {
        Address::from_raw(self.bytes)
    }
}

// Manual trait impls: derives would demand the marker type itself be
// Clone/Ord/etc., which uninhabited markers are not.

impl<K: AddressKind> Clone for Address<K> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K: AddressKind> Copy for Address<K> {}

impl<K: AddressKind> PartialEq for Address<K> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}
impl<K: AddressKind> Eq for Address<K> {}

impl<K: AddressKind> PartialOrd for Address<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<K: AddressKind> Ord for Address<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(&other.bytes)
    }
}

impl<K: AddressKind> Hash for Address<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl<K: AddressKind> fmt::Debug for Address<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address<{}>({}...)", K::LABEL, &self.to_hex()[..12])
    }
}

impl<K: AddressKind> fmt::Display for Address<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl<K: AddressKind> FromStr for Address<K> {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// Holder
// ---------------------------------------------------------------------------

/// A party that can own a balance: an account or a contract.
///
/// Two holders are equal iff both the tag and the bytes match. Ordering is
/// (tag, bytes) lexicographically with `Account < Contract`; ties cannot
/// occur because the tags are distinct. The derived `Ord` below produces
/// exactly that order, which is what makes holdings iteration -- and
/// therefore the binary encoding -- deterministic.
///
/// Note that the wire forms do NOT carry the tag (see the codec modules):
/// a decoded holder is always an `Account`. The tag is authoritative only
/// within a running node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Holder {
    /// Balance owned by an account.
    Account(Address<AccountId>),
    /// Balance owned by a contract.
    Contract(Address<ContractId>),
}

impl Holder {
    /// The raw bytes of the contained address, whichever variant.
    pub fn address_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        match self {
            Holder::Account(addr) => addr.as_bytes(),
            Holder::Contract(addr) => addr.as_bytes(),
        }
    }

    /// Views the holder's bytes as an account address, discarding the tag.
    ///
    /// Not a safe cast: a `Contract` holder passes through unchanged in
    /// bytes. Intended for RPC/JSON boundaries where the caller knows the
    /// intended kind out of band; calling it on the wrong variant is a
    /// caller bug the core cannot detect.
    pub fn holder_to_account(&self) -> Address<AccountId> {
        match self {
            Holder::Account(addr) => *addr,
            Holder::Contract(addr) => addr.retag(),
        }
    }

    /// Views the holder's bytes as a contract address, discarding the tag.
    ///
    /// Same contract as [`Holder::holder_to_account`], in the other
    /// direction.
    pub fn holder_to_contract(&self) -> Address<ContractId> {
        match self {
            Holder::Account(addr) => addr.retag(),
            Holder::Contract(addr) => *addr,
        }
    }
}

impl From<Address<AccountId>> for Holder {
    fn from(addr: Address<AccountId>) -> Self {
        Holder::Account(addr)
    }
}

impl From<Address<ContractId>> for Holder {
    fn from(addr: Address<ContractId>) -> Self {
        Holder::Contract(addr)
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.address_bytes()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn addr<K: AddressKind>(fill: u8) -> Address<K> {
        Address::from_raw([fill; ADDRESS_LENGTH])
    }

    #[test]
    fn from_bytes_validates_length() {
        assert!(Address::<AccountId>::from_bytes(&[0u8; 32]).is_ok());
        assert_eq!(
            Address::<AccountId>::from_bytes(&[0u8; 31]),
            Err(AddressError::BadLength {
                expected: 32,
                actual: 31
            })
        );
    }

    #[test]
    fn hex_roundtrip() {
        let a: Address<AssetId> = addr(0xAB);
        let parsed = Address::<AssetId>::from_hex(&a.to_hex()).unwrap();
        assert_eq!(a, parsed);
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            Address::<AccountId>::from_hex("zz"),
            Err(AddressError::BadHex(_))
        ));
    }

    #[test]
    fn ordering_is_over_bytes() {
        let lo: Address<AccountId> = addr(0x01);
        let hi: Address<AccountId> = addr(0x02);
        assert!(lo < hi);
    }

    #[test]
    fn holder_equality_requires_matching_tag() {
        let account = Holder::Account(addr(0x11));
        let contract = Holder::Contract(addr(0x11));
        assert_ne!(account, contract);
        assert_eq!(account.address_bytes(), contract.address_bytes());
    }

    #[test]
    fn holder_ordering_is_tag_then_bytes() {
        let a1 = Holder::Account(addr(0x01));
        let a2 = Holder::Account(addr(0xFF));
        let c1 = Holder::Contract(addr(0x00));
        // Every account sorts before every contract, regardless of bytes.
        assert!(a1 < a2);
        assert!(a2 < c1);
    }

    #[test]
    fn projections_discard_the_tag() {
        let contract = Holder::Contract(addr(0x42));
        let as_account = contract.holder_to_account();
        assert_eq!(as_account.as_bytes(), contract.address_bytes());

        let account = Holder::Account(addr(0x43));
        let as_contract = account.holder_to_contract();
        assert_eq!(as_contract.as_bytes(), account.address_bytes());
    }

    #[test]
    fn display_is_full_hex() {
        let h = Holder::Account(addr(0xCD));
        assert_eq!(h.to_string(), "cd".repeat(32));
    }
}
