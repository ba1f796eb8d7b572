//! secp256k1 private key with WIF support.
//!
//! Wraps a k256 signing key. WIF decoding is always bound to an explicit
//! network version byte; there is no implicit "mainnet" default because a
//! secret for one ledger must never silently sign on another.

use k256::ecdsa::SigningKey;
use zeroize::Zeroizing;

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Compression flag byte appended to WIF for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 private key for signing.
///
/// The inner k256 key zeroizes its scalar on drop.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

/// The result of decoding a WIF string.
#[derive(Clone, Debug)]
pub struct WifKey {
    /// The decoded private key.
    pub key: PrivateKey,
    /// Whether the WIF asked for the compressed public key encoding.
    pub compressed: bool,
}

impl PrivateKey {
    /// Create a private key from a raw 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes represent a valid non-zero scalar
    /// below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a private key from a 64-character hexadecimal string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Decode a WIF (Wallet Import Format) string for a specific network.
    ///
    /// Layout after Base58Check decoding: `version || key(32) [|| 0x01]`.
    ///
    /// # Arguments
    /// * `wif` - The Base58Check-encoded secret.
    /// * `version` - The network's WIF version byte (e.g. `0xdf` for Fairbrix).
    ///
    /// # Returns
    /// `Ok(WifKey)` on success. Fails on bad Base58, checksum, length,
    /// compression flag, scalar, or when the version byte belongs to
    /// another network.
    pub fn from_wif(wif: &str, version: u8) -> Result<WifKey, PrimitivesError> {
        let payload = Zeroizing::new(base58::check_decode(wif.trim()).map_err(|e| match e {
            checksum @ PrimitivesError::ChecksumMismatch => checksum,
            other => PrimitivesError::InvalidWif(other.to_string()),
        })?);

        let compressed = match payload.len() {
            34 => {
                if payload[33] != COMPRESS_MAGIC {
                    return Err(PrimitivesError::InvalidWif(
                        "malformed private key: invalid compression flag".to_string(),
                    ));
                }
                true
            }
            33 => false,
            n => {
                return Err(PrimitivesError::InvalidWif(format!(
                    "malformed private key: invalid length {}",
                    n + 4
                )));
            }
        };

        if payload[0] != version {
            return Err(PrimitivesError::WifNetworkMismatch {
                expected: version,
                found: payload[0],
            });
        }

        let key = Self::from_bytes(&payload[1..1 + PRIVATE_KEY_BYTES_LEN])?;
        Ok(WifKey { key, compressed })
    }

    /// Encode the private key as WIF with the given network version byte.
    pub fn to_wif(&self, version: u8, compressed: bool) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(2 + PRIVATE_KEY_BYTES_LEN));
        payload.push(version);
        payload.extend_from_slice(&self.to_bytes());
        if compressed {
            payload.push(COMPRESS_MAGIC);
        }
        base58::check_encode(&payload)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest with an RFC6979 deterministic, low-S signature.
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

/// Never print key material.
impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey").finish_non_exhaustive()
    }
}
