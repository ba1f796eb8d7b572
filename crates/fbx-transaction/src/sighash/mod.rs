//! Legacy signature hash computation.
//!
//! Computes the digest that ECDSA signs to authorize spending an input, in
//! the original (pre-segwit, no FORKID) form: the whole transaction is
//! re-serialized with every unlocking script blanked except the one being
//! signed, which is replaced by the subscript, and the 4-byte hash type is
//! appended before double-hashing.

use fbx_primitives::hash::sha256d;
use fbx_primitives::util::{VarInt, WireWriter};
use fbx_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Sign all inputs and all outputs (the default).
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs but no outputs, allowing outputs to be modified.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and only the output with the same index as the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Combined with another flag: only sign the current input, allowing other
/// inputs to be added later.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Mask applied to extract the base sighash type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

/// The digest returned for SIGHASH_SINGLE when the signed input has no
/// matching output: the little-endian integer 1.
pub const SIGHASH_SINGLE_OUT_OF_RANGE: [u8; 32] = {
    let mut one = [0u8; 32];
    one[0] = 1;
    one
};

/// Compute the legacy signature hash for a given input.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `subscript` - The locking script of the output being spent.
/// * `sighash_type` - The sighash type (e.g. `SIGHASH_ALL`).
///
/// # Returns
/// A 32-byte double-SHA256 hash to be signed by ECDSA.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    subscript: &Script,
    sighash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    check_index(tx, input_index)?;

    if sighash_type & SIGHASH_MASK == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        return Ok(SIGHASH_SINGLE_OUT_OF_RANGE);
    }

    let preimage = calc_preimage(tx, input_index, subscript, sighash_type)?;
    Ok(sha256d(&preimage))
}

/// Build the legacy preimage bytes before double-hashing.
///
/// The preimage is the transaction serialized with these changes:
/// 1. The signed input's script is the subscript with `OP_CODESEPARATOR`s
///    removed; every other input's script is empty.
/// 2. For NONE and SINGLE, other inputs' sequence numbers are zeroed.
/// 3. With ANYONECANPAY, only the signed input is serialized.
/// 4. NONE drops all outputs; SINGLE keeps outputs up to the input's
///    index, with earlier ones replaced by (-1, empty script).
/// 5. The hash type is appended as 4 bytes little-endian.
///
/// # Returns
/// The preimage, or an error for SIGHASH_SINGLE without a matching output
/// (that case has no preimage; `signature_hash` returns the fixed digest).
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    subscript: &Script,
    sighash_type: u32,
) -> Result<Vec<u8>, TransactionError> {
    check_index(tx, input_index)?;

    let base_type = sighash_type & SIGHASH_MASK;
    let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;

    if base_type == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        return Err(TransactionError::SigningError(format!(
            "SIGHASH_SINGLE input {} has no matching output",
            input_index
        )));
    }

    let script_code = subscript.without_code_separators()?;
    let mut writer = WireWriter::with_capacity(tx.size() + script_code.len() + 4);

    writer.write_u32_le(tx.version);

    if anyone_can_pay {
        writer.write_varint(VarInt(1));
        let input = &tx.inputs[input_index];
        input.write_with(&mut writer, Some(script_code.to_bytes()), input.sequence_number);
    } else {
        writer.write_varint(VarInt::from(tx.inputs.len()));
        for (i, input) in tx.inputs.iter().enumerate() {
            if i == input_index {
                input.write_with(&mut writer, Some(script_code.to_bytes()), input.sequence_number);
            } else {
                let sequence = match base_type {
                    SIGHASH_NONE | SIGHASH_SINGLE => 0,
                    _ => input.sequence_number,
                };
                input.write_with(&mut writer, None, sequence);
            }
        }
    }

    match base_type {
        SIGHASH_NONE => writer.write_varint(VarInt(0)),
        SIGHASH_SINGLE => {
            writer.write_varint(VarInt::from(input_index + 1));
            for _ in 0..input_index {
                writer.write_u64_le(u64::MAX);
                writer.write_varint(VarInt(0));
            }
            tx.outputs[input_index].write_to(&mut writer);
        }
        _ => {
            writer.write_varint(VarInt::from(tx.outputs.len()));
            for output in &tx.outputs {
                output.write_to(&mut writer);
            }
        }
    }

    writer.write_u32_le(tx.lock_time);
    writer.write_u32_le(sighash_type);
    Ok(writer.into_bytes())
}

fn check_index(tx: &Transaction, input_index: usize) -> Result<(), TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        )));
    }
    Ok(())
}
