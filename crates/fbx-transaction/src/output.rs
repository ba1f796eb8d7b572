//! Transaction output with satoshi value and locking script.

use fbx_primitives::util::{WireReader, WireWriter};
use fbx_script::Script;

use crate::TransactionError;

/// A single output in a transaction.
///
/// # Wire format
///
/// | Field            | Size           |
/// |------------------|----------------|
/// | satoshis         | 8 bytes (LE)   |
/// | script length    | VarInt         |
/// | locking_script   | variable       |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    /// The number of satoshis (1 satoshi = 10^-8 FBX) locked by this output.
    pub satoshis: u64,

    /// The locking script (scriptPubKey) that defines spending conditions.
    pub locking_script: Script,
}

impl TransactionOutput {
    /// Create an output paying `satoshis` to `locking_script`.
    pub fn new(satoshis: u64, locking_script: Script) -> Self {
        TransactionOutput {
            satoshis,
            locking_script,
        }
    }

    /// Deserialize a `TransactionOutput` from a `WireReader`.
    ///
    /// # Returns
    /// `Ok(TransactionOutput)` on success, or a `TransactionError` if the
    /// data is truncated.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let satoshis = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading satoshis: {}", e))
        })?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading locking script: {}", e))
        })?;

        Ok(TransactionOutput {
            satoshis,
            locking_script: Script::from_bytes(script_bytes),
        })
    }

    /// Serialize this output into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_u64_le(self.satoshis);
        writer.write_var_bytes(self.locking_script.to_bytes());
    }

    /// Serialize this output to a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(9 + self.locking_script.len());
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}
