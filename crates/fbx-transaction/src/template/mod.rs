//! Script templates for signing transaction inputs.
//!
//! Provides the `UnlockingScriptTemplate` trait and the pay-to-key-hash
//! implementation, the only spend type the engine produces.

pub mod p2pkh;

use fbx_script::Script;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Trait for script templates that produce unlocking scripts.
///
/// The `sign` method receives the full transaction and the input index,
/// computes the appropriate signature hash, signs it, and returns the
/// unlocking script.
pub trait UnlockingScriptTemplate {
    /// Produce an unlocking script for the given input.
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError>;
}
