//! Pay-to-Public-Key-Hash (P2PKH) script template.
//!
//! Produces unlocking scripts (`<sig> <pubkey>`) signed over the legacy
//! signature hash. Locking scripts come from `Address::locking_script`.

use fbx_primitives::ec::PrivateKey;
use fbx_script::Script;

use crate::sighash::SIGHASH_ALL;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Create a P2PKH unlocker for signing transaction inputs.
///
/// # Arguments
/// * `private_key` - The private key used to sign.
/// * `compressed` - Which public key encoding to push; must be the one
///   hashed into the spent output's address.
/// * `sighash_flag` - Optional sighash flag. Defaults to `SIGHASH_ALL`.
pub fn unlock(private_key: PrivateKey, compressed: bool, sighash_flag: Option<u32>) -> P2PKH {
    P2PKH {
        private_key,
        compressed,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL),
    }
}

/// P2PKH signing template holding a private key and sighash flag.
pub struct P2PKH {
    private_key: PrivateKey,
    compressed: bool,
    sighash_flag: u32,
}

impl UnlockingScriptTemplate for P2PKH {
    /// Sign the specified input and produce the unlocking script.
    ///
    /// Computes the legacy signature hash, signs it with RFC6979
    /// deterministic ECDSA, checks the signature against the public key,
    /// and returns `<DER_sig || sighash_byte> <pubkey>`.
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError> {
        let idx = input_index as usize;

        let sig_hash = tx.calc_input_signature_hash(idx, self.sighash_flag)?;
        let signature = self.private_key.sign(&sig_hash)?;

        let pub_key = self.private_key.pub_key();
        if !pub_key.verify(&sig_hash, &signature) {
            return Err(TransactionError::SigningError(format!(
                "signature for input {} does not verify",
                idx
            )));
        }

        let der_sig = signature.to_der()?;
        let mut sig_buf = Vec::with_capacity(der_sig.len() + 1);
        sig_buf.extend_from_slice(&der_sig);
        sig_buf.push(self.sighash_flag as u8);

        let mut script = Script::new();
        script.append_push_data(&sig_buf)?;
        script.append_push_data(&pub_key.to_bytes(self.compressed))?;

        Ok(script)
    }
}
