//! Signing an assembled transaction into its wire form.

use fbx_primitives::chainhash::{double_hash_h, Hash};
use fbx_transaction::template::UnlockingScriptTemplate;
use fbx_transaction::{Transaction, TransactionInput, TransactionOutput};
use tracing::debug;

use crate::builder::{FundingInput, UnsignedTransaction};
use crate::key_material::KeyMaterial;
use crate::SendError;

/// A fully signed transaction in wire encoding.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    tx: Transaction,
    bytes: Vec<u8>,
    txid: Hash,
}

impl SignedTransaction {
    pub fn to_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn txid(&self) -> Hash {
        self.txid
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }
}

/// Sign every input of `unsigned` with `key`.
///
/// Each funding input is checked against its parent transaction first: the
/// parent must hash to the referenced txid, contain the referenced output,
/// agree on its value, and lock it to `key`'s public key hash. The fee left
/// over by the assembled transaction must equal the quoted miner fee.
///
/// # Returns
/// The signed transaction, or `SigningFailed` if any check or signature
/// fails.
pub fn sign(unsigned: &UnsignedTransaction, key: &KeyMaterial) -> Result<SignedTransaction, SendError> {
    unsigned.check_balance()?;

    let mut tx = Transaction::new();
    for (index, funding) in unsigned.inputs.iter().enumerate() {
        tx.add_input(attach_parent(index, funding, key)?);
    }
    for planned in &unsigned.outputs {
        tx.add_output(TransactionOutput::new(
            planned.satoshis,
            planned.address.locking_script(),
        ));
    }
    check_implied_fee(&tx, unsigned.breakdown.miner_fee)?;

    let unlocker = key.unlocker();
    let mut scripts = Vec::with_capacity(tx.inputs.len());
    for index in 0..tx.inputs.len() {
        let script = unlocker
            .sign(&tx, index as u32)
            .map_err(|e| SendError::SigningFailed {
                reason: format!("input {}: {}", index, e),
                source: Some(e),
            })?;
        scripts.push(script);
    }
    for (input, script) in tx.inputs.iter_mut().zip(scripts) {
        input.unlocking_script = Some(script);
    }

    let bytes = tx.to_bytes();
    let txid = double_hash_h(&bytes);
    debug!(%txid, size = bytes.len(), "signed transaction");

    Ok(SignedTransaction { tx, bytes, txid })
}

fn check_implied_fee(tx: &Transaction, miner_fee: u64) -> Result<(), SendError> {
    let inputs = tx.total_input_satoshis().map_err(|e| SendError::SigningFailed {
        reason: "input total unavailable".to_string(),
        source: Some(e),
    })?;
    let implied = tx
        .total_output_satoshis()
        .and_then(|outputs| inputs.checked_sub(outputs))
        .ok_or_else(|| SendError::signing("outputs exceed inputs"))?;
    if implied != miner_fee {
        return Err(SendError::signing(format!(
            "transaction leaves {} satoshis to the miner, quoted {}",
            implied, miner_fee
        )));
    }
    Ok(())
}

fn attach_parent(
    index: usize,
    funding: &FundingInput,
    key: &KeyMaterial,
) -> Result<TransactionInput, SendError> {
    let utxo = &funding.utxo;
    let fail = |what: String| SendError::signing(format!("input {}: {}", index, what));

    let parent_id = double_hash_h(&funding.parent_raw);
    if parent_id != utxo.txid {
        return Err(fail(format!(
            "parent transaction hashes to {}, expected {}",
            parent_id, utxo.txid
        )));
    }

    let parent = Transaction::from_bytes(&funding.parent_raw).map_err(|e| SendError::SigningFailed {
        reason: format!("input {}: parent transaction does not parse", index),
        source: Some(e),
    })?;

    let spent = parent
        .outputs
        .get(utxo.vout as usize)
        .ok_or_else(|| fail(format!("parent has no output {}", utxo.vout)))?;

    if spent.satoshis != utxo.value_satoshis {
        return Err(fail(format!(
            "parent output {} holds {} satoshis, node reported {}",
            utxo.vout, spent.satoshis, utxo.value_satoshis
        )));
    }

    if spent.locking_script.public_key_hash() != Some(key.public_key_hash()) {
        return Err(fail(format!(
            "parent output {} is not pay-to-key-hash to {}",
            utxo.vout,
            key.address()
        )));
    }

    let mut input = TransactionInput::new(utxo.txid, utxo.vout);
    input.source_transaction = Some(Box::new(parent));
    Ok(input)
}
