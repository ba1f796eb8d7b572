/// Error types for script and address operations.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Attempted to use append_opcodes for a push data opcode.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds maximum allowed size.
    #[error("data too big")]
    DataTooBig,

    /// Address string failed Base58Check decoding.
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Address decoded but its payload is not a 20-byte hash.
    #[error("invalid address length for '{0}'")]
    InvalidAddressLength(String),

    /// Address version byte belongs to neither the key-hash nor the
    /// script-hash version of the configured network.
    #[error("address '{address}' has version 0x{version:02x}, not valid on this network")]
    WrongNetwork { address: String, version: u8 },
}
