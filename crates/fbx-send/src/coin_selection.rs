//! Funding output selection.

use fbx_rpc::Utxo;

use crate::SendError;

/// Pick the first output, in the order given, whose value covers
/// `required_total`.
///
/// Exactly one output is ever chosen. When funds are split across several
/// smaller outputs this fails even though their sum would be enough.
///
/// # Returns
/// The chosen output, `NoSpendableFunds` for an empty list, or
/// `InsufficientFunds` when no single output is large enough.
pub fn select_first_fit(utxos: &[Utxo], required_total: u64) -> Result<Utxo, SendError> {
    if utxos.is_empty() {
        return Err(SendError::NoSpendableFunds {
            address: None,
            source: None,
        });
    }

    if let Some(utxo) = utxos.iter().find(|u| u.value_satoshis >= required_total) {
        return Ok(*utxo);
    }

    Err(SendError::InsufficientFunds {
        required: required_total,
        largest: utxos.iter().map(|u| u.value_satoshis).max().unwrap_or(0),
        total: utxos
            .iter()
            .fold(0u64, |acc, u| acc.saturating_add(u.value_satoshis)),
        count: utxos.len(),
    })
}
