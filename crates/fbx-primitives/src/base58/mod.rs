//! Base58 encoding and decoding with optional checksum support.
//!
//! Base58Check (payload plus the first four bytes of its double SHA-256)
//! is the text encoding of both WIF secrets and legacy Fairbrix addresses.
//! Every Base58Check payload starts with a one-byte network version.

use crate::PrimitivesError;
use crate::hash::sha256d;

/// Length of the Base58Check checksum suffix.
const CHECKSUM_LEN: usize = 4;

/// Encode a byte slice to a Base58 string using the Bitcoin alphabet.
///
/// Leading zero bytes are encoded as leading '1' characters.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error for invalid characters.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode a byte slice with a 4-byte double-SHA-256 checksum appended (Base58Check).
///
/// # Arguments
/// * `data` - The bytes to encode (version byte + payload).
///
/// # Returns
/// A Base58Check-encoded string.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&payload)
}

/// Decode a Base58Check string, verifying the 4-byte checksum.
///
/// # Returns
/// `Ok(Vec<u8>)` of the payload (version byte included, checksum
/// stripped), or an error for invalid encoding or checksum mismatch.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() <= CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string()
        ));
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    let expected = sha256d(payload);
    if checksum != &expected[..CHECKSUM_LEN] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

/// Decode a Base58Check string and split off its leading version byte.
///
/// # Returns
/// `Ok((version, body))` where `body` excludes both the version byte and
/// the checksum.
pub fn check_decode_versioned(s: &str) -> Result<(u8, Vec<u8>), PrimitivesError> {
    let mut payload = check_decode(s)?;
    let version = payload.remove(0);
    Ok((version, payload))
}
