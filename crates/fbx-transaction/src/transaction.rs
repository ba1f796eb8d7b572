//! Core transaction type.
//!
//! Represents a legacy (non-witness) transaction with version, inputs,
//! outputs, and locktime, and provides binary and hex serialization,
//! transaction ID computation, and signature hash lookup per input.

use fbx_primitives::chainhash::{double_hash_h, Hash};
use fbx_primitives::util::{VarInt, WireReader, WireWriter};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash;
use crate::TransactionError;

/// A transaction consisting of a version, a set of inputs, a set of
/// outputs, and a lock time.
///
/// # Wire format
///
/// | Field        | Size                      |
/// |--------------|---------------------------|
/// | version      | 4 bytes (LE)              |
/// | input count  | VarInt                    |
/// | inputs       | variable (per input)      |
/// | output count | VarInt                    |
/// | outputs      | variable (per output)     |
/// | lock_time    | 4 bytes (LE)              |
#[derive(Clone, Debug)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u32,

    /// Ordered list of transaction inputs.
    pub inputs: Vec<TransactionInput>,

    /// Ordered list of transaction outputs.
    pub outputs: Vec<TransactionOutput>,

    /// Lock time. Zero for an immediately final transaction.
    pub lock_time: u32,
}

impl Transaction {
    /// Create a new empty transaction with version 1 and lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    /// Parse a transaction from a hex-encoded string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|e| {
            TransactionError::SerializationError(format!("invalid hex: {}", e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// The slice must contain exactly one complete transaction with no
    /// trailing data.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = WireReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `WireReader`.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading version: {}", e))
        })?;

        let input_count = read_count(reader, "input")?;
        // Each input is at least 41 bytes; cap the preallocation by what is left.
        let mut inputs = Vec::with_capacity(input_count.min(reader.remaining() / 41));
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = read_count(reader, "output")?;
        let mut outputs = Vec::with_capacity(output_count.min(reader.remaining() / 9));
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading lock time: {}", e))
        })?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Serialize this transaction to raw wire-format bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(256);
        writer.write_u32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    /// Serialize this transaction to a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Compute the transaction ID (double SHA-256 of the serialized bytes).
    ///
    /// `Hash` displays in the reversed order nodes use for txids.
    pub fn tx_id(&self) -> Hash {
        double_hash_h(&self.to_bytes())
    }

    /// Return the size of this transaction in bytes.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Append an input.
    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    /// Append an output.
    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    /// Sum of all output values, or `None` on overflow.
    pub fn total_output_satoshis(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.satoshis))
    }

    /// Sum of all input values from their attached source outputs.
    ///
    /// # Returns
    /// An error if any input lacks source info or the sum overflows.
    pub fn total_input_satoshis(&self) -> Result<u64, TransactionError> {
        self.inputs.iter().enumerate().try_fold(0u64, |acc, (i, input)| {
            let sats = input.source_tx_satoshis().ok_or_else(|| {
                TransactionError::InvalidTransaction(format!(
                    "missing source output on input {}",
                    i
                ))
            })?;
            acc.checked_add(sats).ok_or_else(|| {
                TransactionError::InvalidTransaction("input value overflow".to_string())
            })
        })
    }

    /// Compute the legacy signature hash for one input.
    ///
    /// The subscript is the locking script of the output being spent,
    /// taken from the input's attached source info.
    ///
    /// # Arguments
    /// * `input_index` - Index of the input being signed.
    /// * `sighash_flag` - The sighash type (e.g. `SIGHASH_ALL`).
    ///
    /// # Returns
    /// The 32-byte digest to be signed by ECDSA.
    pub fn calc_input_signature_hash(
        &self,
        input_index: usize,
        sighash_flag: u32,
    ) -> Result<[u8; 32], TransactionError> {
        let input = self.inputs.get(input_index).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                self.inputs.len()
            ))
        })?;

        let subscript = input.source_tx_script().ok_or_else(|| {
            TransactionError::SigningError(format!(
                "missing source output on input {} (no parent tx info)",
                input_index
            ))
        })?;

        sighash::signature_hash(self, input_index, subscript, sighash_flag)
    }
}

fn read_count(reader: &mut WireReader, what: &str) -> Result<usize, TransactionError> {
    let count = reader.read_varint().map_err(|e| {
        TransactionError::SerializationError(format!("reading {} count: {}", what, e))
    })?;
    usize::try_from(count.value()).map_err(|_| {
        TransactionError::SerializationError(format!("{} count {} too large", what, count.value()))
    })
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
