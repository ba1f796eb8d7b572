//! Transaction input referencing a previous output.
//!
//! Besides the wire fields, an input can carry the full parent transaction
//! it spends from. The legacy signature hash commits to the parent output's
//! locking script, so signing needs it.

use fbx_primitives::chainhash::Hash;
use fbx_primitives::util::{WireReader, WireWriter};
use fbx_script::Script;

use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Default sequence number indicating a finalized input (no relative lock-time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single input in a transaction.
///
/// # Wire format
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | source_txid        | 32 bytes (LE)    |
/// | source_tx_out_index| 4 bytes (LE)     |
/// | script length      | VarInt           |
/// | unlocking_script   | variable         |
/// | sequence_number    | 4 bytes (LE)     |
#[derive(Clone, Debug)]
pub struct TransactionInput {
    /// The transaction ID of the output being spent.
    pub source_txid: Hash,

    /// Index of the output within the source transaction.
    pub source_tx_out_index: u32,

    /// Sequence number. Defaults to `0xFFFFFFFF` (finalized).
    pub sequence_number: u32,

    /// The unlocking script (scriptSig). `None` until the input is signed.
    pub unlocking_script: Option<Script>,

    /// Optional full parent transaction, not serialized.
    pub source_transaction: Option<Box<Transaction>>,
}

impl TransactionInput {
    /// Create an unsigned input spending `source_txid:vout`.
    pub fn new(source_txid: Hash, vout: u32) -> Self {
        TransactionInput {
            source_txid,
            source_tx_out_index: vout,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_script: None,
            source_transaction: None,
        }
    }

    /// Deserialize a `TransactionInput` from a `WireReader`.
    ///
    /// # Returns
    /// `Ok(TransactionInput)` on success, or a `TransactionError` if the
    /// data is truncated.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let txid: [u8; 32] = reader.read_array().map_err(|e| {
            TransactionError::SerializationError(format!("reading source txid: {}", e))
        })?;

        let source_tx_out_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading unlocking script: {}", e))
        })?;

        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {}", e))
        })?;

        let unlocking_script = if script_bytes.is_empty() {
            None
        } else {
            Some(Script::from_bytes(script_bytes))
        };

        Ok(TransactionInput {
            source_txid: Hash::new(txid),
            source_tx_out_index,
            sequence_number,
            unlocking_script,
            source_transaction: None,
        })
    }

    /// Serialize this input into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        let script = self.unlocking_script.as_ref().map(Script::to_bytes);
        self.write_with(writer, script, self.sequence_number);
    }

    /// Serialize this input with `script` substituted for the unlocking
    /// script and `sequence` for the sequence number. Used to build
    /// signature hash preimages.
    pub(crate) fn write_with(&self, writer: &mut WireWriter, script: Option<&[u8]>, sequence: u32) {
        writer.write_bytes(self.source_txid.as_bytes());
        writer.write_u32_le(self.source_tx_out_index);
        writer.write_var_bytes(script.unwrap_or_default());
        writer.write_u32_le(sequence);
    }

    /// Look up the output being spent, if source info is attached.
    pub fn source_tx_output(&self) -> Option<&TransactionOutput> {
        self.source_transaction
            .as_ref()
            .and_then(|tx| tx.outputs.get(self.source_tx_out_index as usize))
    }

    /// The satoshi value of the output being spent, if known.
    pub fn source_tx_satoshis(&self) -> Option<u64> {
        self.source_tx_output().map(|o| o.satoshis)
    }

    /// The locking script of the output being spent, if known.
    pub fn source_tx_script(&self) -> Option<&Script> {
        self.source_tx_output().map(|o| &o.locking_script)
    }
}
