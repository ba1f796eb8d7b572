//! Unsigned transaction assembly.

use fbx_rpc::Utxo;
use fbx_script::Address;

use crate::fee::{FeeBreakdown, FeeQuote};
use crate::SendError;

/// What an output is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputRole {
    Payment,
    PlatformFee,
    Change,
}

/// An output before serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOutput {
    pub role: OutputRole,
    pub address: Address,
    pub satoshis: u64,
}

/// A spent output together with the raw bytes of the transaction that
/// created it.
#[derive(Debug, Clone)]
pub struct FundingInput {
    pub utxo: Utxo,
    pub parent_raw: Vec<u8>,
}

/// A transaction ready for signing.
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    pub inputs: Vec<FundingInput>,
    /// Payment first, then platform fee, then change.
    pub outputs: Vec<PlannedOutput>,
    pub breakdown: FeeBreakdown,
}

impl UnsignedTransaction {
    /// Sum of the funding outputs, or `None` on overflow.
    pub fn total_input(&self) -> Option<u64> {
        self.inputs
            .iter()
            .try_fold(0u64, |acc, i| acc.checked_add(i.utxo.value_satoshis))
    }

    /// Sum of the planned outputs, or `None` on overflow.
    pub fn total_output(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.satoshis))
    }

    /// The miner fee actually paid: inputs minus outputs.
    pub fn implied_fee(&self) -> Option<u64> {
        self.total_input()?.checked_sub(self.total_output()?)
    }

    /// Check `sum(outputs) + miner_fee <= sum(inputs)`.
    pub fn check_balance(&self) -> Result<(), SendError> {
        let inputs = self
            .total_input()
            .ok_or_else(|| SendError::signing("input total overflows"))?;
        let spent = self
            .total_output()
            .and_then(|o| o.checked_add(self.breakdown.miner_fee))
            .ok_or_else(|| SendError::signing("output total overflows"))?;
        if spent > inputs {
            return Err(SendError::signing(format!(
                "outputs plus miner fee ({} satoshis) exceed inputs ({} satoshis)",
                spent, inputs
            )));
        }
        Ok(())
    }

    pub fn output(&self, role: OutputRole) -> Option<&PlannedOutput> {
        self.outputs.iter().find(|o| o.role == role)
    }
}

/// Assemble a one-input transaction spending `selected`.
///
/// The input must cover the whole quote before any output is planned.
/// Outputs are the payment, then the platform fee if positive, then change
/// back to the sender if positive. A zero-value output is never created.
///
/// # Returns
/// The unsigned transaction, `NegativeChange` if the input is too small,
/// or `InvalidAddress` if a platform fee is quoted with no fee address.
pub fn build(
    selected: Utxo,
    parent_raw: Vec<u8>,
    destination: &Address,
    quote: &FeeQuote,
    change_address: &Address,
    fee_address: Option<&Address>,
) -> Result<UnsignedTransaction, SendError> {
    let breakdown = quote.settle(selected.value_satoshis)?;

    let mut outputs = Vec::with_capacity(3);
    outputs.push(PlannedOutput {
        role: OutputRole::Payment,
        address: destination.clone(),
        satoshis: breakdown.payment,
    });

    if breakdown.platform_fee > 0 {
        let address = fee_address.ok_or_else(|| SendError::InvalidAddress {
            address: String::new(),
            reason: format!(
                "platform fee of {} satoshis quoted without a fee address",
                breakdown.platform_fee
            ),
        })?;
        outputs.push(PlannedOutput {
            role: OutputRole::PlatformFee,
            address: address.clone(),
            satoshis: breakdown.platform_fee,
        });
    }

    if breakdown.change > 0 {
        outputs.push(PlannedOutput {
            role: OutputRole::Change,
            address: change_address.clone(),
            satoshis: breakdown.change,
        });
    }

    Ok(UnsignedTransaction {
        inputs: vec![FundingInput {
            utxo: selected,
            parent_raw,
        }],
        outputs,
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeePercent;
    use crate::fee::split;
    use fbx_primitives::chainhash::Hash;
    use fbx_script::NetworkParams;

    fn addr(tag: u8) -> Address {
        Address::from_public_key_hash(&[tag; 20], &NetworkParams::default())
    }

    fn utxo(value: u64) -> Utxo {
        Utxo {
            txid: Hash::new([7; 32]),
            vout: 0,
            value_satoshis: value,
        }
    }

    #[test]
    fn test_output_order_and_values() {
        let quote = split(100_000_000, FeePercent::whole(1), true, 1000).unwrap();
        let tx = build(utxo(102_100_000), vec![], &addr(1), &quote, &addr(2), Some(&addr(3))).unwrap();

        let roles: Vec<_> = tx.outputs.iter().map(|o| (o.role, o.satoshis)).collect();
        assert_eq!(
            roles,
            vec![
                (OutputRole::Payment, 100_000_000),
                (OutputRole::PlatformFee, 1_000_000),
                (OutputRole::Change, 1_099_000),
            ]
        );
        assert_eq!(tx.output(OutputRole::Change).unwrap().address, addr(2));
        assert_eq!(tx.output(OutputRole::PlatformFee).unwrap().address, addr(3));
        assert_eq!(tx.implied_fee(), Some(1000));
        tx.check_balance().unwrap();
    }

    #[test]
    fn test_zero_change_has_no_change_output() {
        let quote = split(50_000, FeePercent::ZERO, false, 1000).unwrap();
        let tx = build(utxo(51_000), vec![], &addr(1), &quote, &addr(2), None).unwrap();
        assert_eq!(tx.outputs.len(), 1);
        assert!(tx.output(OutputRole::Change).is_none());
        assert_eq!(tx.breakdown.change, 0);
        assert_eq!(tx.implied_fee(), Some(1000));
    }

    #[test]
    fn test_insufficient_input_fails_before_outputs() {
        let quote = split(100_000_000, FeePercent::whole(1), true, 1000).unwrap();
        let err = build(utxo(100_500_000), vec![], &addr(1), &quote, &addr(2), Some(&addr(3)))
            .unwrap_err();
        assert!(matches!(
            err,
            SendError::NegativeChange { available: 100_500_000, required: 101_001_000 }
        ));
    }

    #[test]
    fn test_fee_without_address_is_rejected() {
        let quote = split(100_000, FeePercent::whole(1), true, 0).unwrap();
        let err = build(utxo(200_000), vec![], &addr(1), &quote, &addr(2), None).unwrap_err();
        assert!(matches!(err, SendError::InvalidAddress { .. }));
    }

    #[test]
    fn test_unbalanced_transaction_is_caught() {
        let quote = split(1_000, FeePercent::ZERO, false, 100).unwrap();
        let mut tx = build(utxo(2_000), vec![], &addr(1), &quote, &addr(2), None).unwrap();
        tx.outputs[0].satoshis += 1;
        assert!(matches!(tx.check_balance(), Err(SendError::SigningFailed { .. })));
    }
}
