//! Chain hash type for transaction identification.
//!
//! Provides a `Hash` type: a 32-byte digest stored in internal byte order
//! and displayed as byte-reversed hex, which is how nodes print txids in
//! `listunspent`, `getrawtransaction` and `sendrawtransaction`.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte hash used for transaction IDs.
///
/// When displayed as a string, the bytes are reversed to match the node's
/// representation (little-endian internal, big-endian display).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Create a Hash from a raw 32-byte array in internal byte order.
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a byte slice that must be exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            ))
        })?;
        Ok(Hash(arr))
    }

    /// Parse a display-order (byte-reversed) hex string.
    ///
    /// Unlike block explorers that accept abbreviated hashes, a txid used
    /// to spend an output must be complete, so exactly 64 hex characters
    /// are required.
    ///
    /// # Returns
    /// `Ok(Hash)` on success, or an error for bad length or bad hex.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_SIZE * 2 {
            return Err(PrimitivesError::InvalidHash(format!(
                "expected {} hex characters, got {}",
                HASH_SIZE * 2,
                hex_str.len()
            )));
        }
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        bytes.reverse();
        Ok(Hash(bytes))
    }

    /// Access the internal byte array.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

/// Display the hash as byte-reversed hex.
impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "{}", hex::encode(reversed))
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the double SHA-256 of `data` as a Hash.
///
/// Applied to a serialized transaction this is its txid.
pub fn double_hash_h(data: &[u8]) -> Hash {
    Hash(sha256d(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bitcoin genesis block hash, internal byte order.
    const GENESIS: [u8; 32] = [
        0x6f, 0xe2, 0x8c, 0x0a, 0xb6, 0xf1, 0xb3, 0x72,
        0xc1, 0xa6, 0xa2, 0x46, 0xae, 0x63, 0xf7, 0x4f,
        0x93, 0x1e, 0x83, 0x65, 0xe1, 0x5a, 0x08, 0x9c,
        0x68, 0xd6, 0x19, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    const GENESIS_HEX: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

    #[test]
    fn test_display_is_byte_reversed() {
        assert_eq!(Hash::new(GENESIS).to_string(), GENESIS_HEX);
    }

    #[test]
    fn test_from_hex_reverses_into_internal_order() {
        let h = Hash::from_hex(GENESIS_HEX).unwrap();
        assert_eq!(h.as_bytes(), &GENESIS);
        assert_eq!(GENESIS_HEX.parse::<Hash>().unwrap(), h);
    }

    #[test]
    fn test_from_hex_rejects_short_and_bad_hex() {
        assert!(Hash::from_hex("abcd").is_err());
        assert!(Hash::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_from_bytes_length() {
        assert!(Hash::from_bytes(&[0u8; 31]).is_err());
        assert!(Hash::from_bytes(&[0u8; 32]).is_ok());
    }

    #[test]
    fn test_serde_uses_display_hex() {
        let h = Hash::new(GENESIS);
        let json = serde_json_roundtrip(&h);
        assert_eq!(json, h);
    }

    fn serde_json_roundtrip(h: &Hash) -> Hash {
        use serde::de::IntoDeserializer;
        let s = h.to_string();
        let de: serde::de::value::StrDeserializer<serde::de::value::Error> =
            s.as_str().into_deserializer();
        Hash::deserialize(de).unwrap()
    }
}
