use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length in bytes of every content identifier.
pub const OBJECT_ID_LEN: usize = 32;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is the 256-bit digest of an object's canonical bytes, as
/// produced by a hash provider. Identical bytes always produce the same
/// `ObjectId`, making objects deduplicatable and verifiable. The type does
/// not know which algorithm produced it; a store must be read with the
/// algorithm it was written with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Wrap a pre-computed digest.
    pub const fn from_hash(hash: [u8; OBJECT_ID_LEN]) -> Self {
        Self(hash)
    }

    /// Build an `ObjectId` from a digest slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; OBJECT_ID_LEN] =
            bytes.try_into().map_err(|_| TypeError::InvalidLength {
                expected: OBJECT_ID_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
    fn from(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; OBJECT_ID_LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
