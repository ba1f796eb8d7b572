/// Unified error type for all primitives operations.
///
/// Covers errors from hashing, EC operations, encoding, and key decoding.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    /// The WIF version byte belongs to a different network.
    #[error("WIF version byte 0x{found:02x} does not match network version 0x{expected:02x}")]
    WifNetworkMismatch { expected: u8, found: u8 },

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    /// A decimal coin amount that is not a plain non-negative number or
    /// does not fit in 64-bit satoshis.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
