mod common;

use common::*;

use fbx_primitives::chainhash::Hash;
use fbx_primitives::ec::{PublicKey, Signature};
use fbx_send::{
    send, ErrorKind, FeePercent, FlowState, SendConfig, SendError, SendFlow, SendMode, SendRequest,
};
use fbx_transaction::sighash::SIGHASH_ALL;
use fbx_transaction::Transaction;

fn request(amount: &str) -> SendRequest {
    SendRequest::new(destination().to_string(), amount).with_secret(WIF_COMPRESSED)
}

/// Re-parse a broadcast transaction, reattach its parent, and check the
/// input signature against the legacy signature hash.
fn assert_input_signed_by_owner(tx_hex: &str, parent: &Transaction, compressed: bool) -> Transaction {
    let mut tx = Transaction::from_hex(tx_hex).unwrap();
    assert_eq!(tx.inputs.len(), 1);
    tx.inputs[0].source_transaction = Some(Box::new(parent.clone()));

    let chunks = tx.inputs[0].unlocking_script.as_ref().unwrap().chunks().unwrap();
    assert_eq!(chunks.len(), 2);
    let sig_push = chunks[0].data.clone().unwrap();
    let pub_push = chunks[1].data.clone().unwrap();
    assert_eq!(*sig_push.last().unwrap(), SIGHASH_ALL as u8);
    assert_eq!(pub_push.len(), if compressed { 33 } else { 65 });

    let digest = tx.calc_input_signature_hash(0, SIGHASH_ALL).unwrap();
    let sig = Signature::from_der(&sig_push[..sig_push.len() - 1]).unwrap();
    let pub_key = PublicKey::from_bytes(&pub_push).unwrap();
    assert!(pub_key.verify(&digest, &sig));
    assert_eq!(pub_key.hash160(compressed), owner(compressed).hash);
    tx
}

#[tokio::test]
async fn client_signed_send_with_platform_fee() {
    let parent = funding_parent(&owner(true), &[102_100_000]);
    let node = MockNode::funded_by(&parent);
    let config = config_with_fee();

    let outcome = SendFlow::new(&config, &node).run(&request("1.0")).await;
    let receipt = outcome.result.unwrap();

    let breakdown = receipt.breakdown.unwrap();
    assert_eq!(breakdown.payment, 100_000_000);
    assert_eq!(breakdown.platform_fee, 1_000_000);
    assert_eq!(breakdown.miner_fee, 1_000);
    assert_eq!(breakdown.change, 1_099_000);
    assert_eq!(receipt.mode, SendMode::ClientSigned);

    let tx_hex = receipt.tx_hex.unwrap();
    let tx = assert_input_signed_by_owner(&tx_hex, &parent, true);
    assert_eq!(tx.inputs[0].source_txid, parent.tx_id());
    assert_eq!(tx.inputs[0].source_tx_out_index, 0);

    let outputs: Vec<_> = tx
        .outputs
        .iter()
        .map(|o| (o.satoshis, o.locking_script.clone()))
        .collect();
    assert_eq!(
        outputs,
        vec![
            (100_000_000, destination().locking_script()),
            (1_000_000, fee_address().locking_script()),
            (1_099_000, owner(true).locking_script()),
        ]
    );
    assert_eq!(tx.total_output_satoshis().unwrap() + 1_000, 102_100_000);
    assert_eq!(receipt.txid, tx.tx_id());

    assert_eq!(
        node.calls(),
        vec!["validateaddress", "listunspent", "getrawtransaction", "sendrawtransaction"]
    );
    assert_eq!(node.broadcasts(), vec![tx_hex]);

    assert_eq!(
        outcome.history,
        vec![
            FlowState::Idle,
            FlowState::ValidatingInput,
            FlowState::FetchingUtxos,
            FlowState::SelectingCoin,
            FlowState::ComputingFees,
            FlowState::Building,
            FlowState::Signing,
            FlowState::Broadcasting,
            FlowState::Succeeded(receipt.txid),
        ]
    );
}

#[tokio::test]
async fn insufficient_output_fails_before_signing() {
    let parent = funding_parent(&owner(true), &[100_500_000]);
    let node = MockNode::funded_by(&parent);

    // Selection rejects the output first; NegativeChange is covered by
    // builder::tests::test_insufficient_input_fails_before_outputs.
    let outcome = SendFlow::new(&config_with_fee(), &node).run(&request("1.0")).await;
    match outcome.result.unwrap_err() {
        SendError::InsufficientFunds { required, largest, .. } => {
            assert_eq!(required, 101_001_000);
            assert_eq!(largest, 100_500_000);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(node.calls(), vec!["validateaddress", "listunspent"]);
    assert_eq!(
        outcome.history.last(),
        Some(&FlowState::Failed(ErrorKind::InsufficientFunds))
    );
    assert!(!outcome.history.contains(&FlowState::Signing));
}

#[tokio::test]
async fn empty_listing_is_no_spendable_funds() {
    let node = MockNode::new();
    let err = send(&config_with_fee(), &node, &request("1.0")).await.unwrap_err();
    match err {
        SendError::NoSpendableFunds { address, source } => {
            assert_eq!(address.as_deref(), Some(OWNER));
            assert!(source.is_none());
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(node.calls(), vec!["validateaddress", "listunspent"]);
}

#[tokio::test]
async fn malformed_listing_is_no_spendable_funds() {
    let mut node = MockNode::new();
    node.malformed_listing = true;
    let err = send(&config_with_fee(), &node, &request("1.0")).await.unwrap_err();
    assert!(matches!(
        err,
        SendError::NoSpendableFunds { source: Some(_), .. }
    ));
}

#[tokio::test]
async fn foreign_secret_makes_no_remote_calls() {
    let node = MockNode::new();
    let req = SendRequest::new(destination().to_string(), "1.0").with_secret(FOREIGN_WIF);

    let outcome = SendFlow::new(&config_with_fee(), &node).run(&req).await;
    assert_eq!(outcome.result.unwrap_err().kind(), ErrorKind::InvalidSecret);
    assert!(node.calls().is_empty());
    assert_eq!(
        outcome.history,
        vec![
            FlowState::Idle,
            FlowState::ValidatingInput,
            FlowState::Failed(ErrorKind::InvalidSecret),
        ]
    );
}

#[tokio::test]
async fn missing_secret_is_invalid_secret() {
    let node = MockNode::new();
    let req = SendRequest::new(destination().to_string(), "1.0");
    let err = send(&config_with_fee(), &node, &req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSecret);
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn amount_is_validated_before_secret() {
    let node = MockNode::new();
    let req = SendRequest::new(destination().to_string(), "0").with_secret(FOREIGN_WIF);
    let err = send(&config_with_fee(), &node, &req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn foreign_destination_fails_locally() {
    let node = MockNode::new();
    let req = SendRequest::new("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH", "1").with_secret(WIF_COMPRESSED);
    let err = send(&config_with_fee(), &node, &req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAddress);
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn destination_rejected_by_node() {
    let mut node = MockNode::new();
    node.address_valid = false;
    let err = send(&config_with_fee(), &node, &request("1")).await.unwrap_err();
    assert!(matches!(err, SendError::InvalidAddress { ref reason, .. } if reason == "rejected by node"));
    assert_eq!(node.calls(), vec!["validateaddress"]);
}

#[tokio::test]
async fn first_sufficient_output_is_spent() {
    let parent = funding_parent(&owner(true), &[10_000, 3_000_000, 2_000_000]);
    let node = MockNode::funded_by(&parent);
    let config = SendConfig::default();

    let receipt = send(&config, &node, &request("0.01")).await.unwrap();
    let tx = Transaction::from_hex(receipt.tx_hex.as_deref().unwrap()).unwrap();
    assert_eq!(tx.inputs[0].source_tx_out_index, 1);

    // No fee address configured: payment and change only.
    assert_eq!(tx.outputs.len(), 2);
    assert_eq!(tx.outputs[0].satoshis, 1_000_000);
    assert_eq!(tx.outputs[1].satoshis, 3_000_000 - 1_000_000 - 1_000);
}

#[tokio::test]
async fn exact_input_has_no_change_output() {
    let parent = funding_parent(&owner(true), &[101_001_000]);
    let node = MockNode::funded_by(&parent);

    let receipt = send(&config_with_fee(), &node, &request("1")).await.unwrap();
    assert_eq!(receipt.breakdown.unwrap().change, 0);

    let tx = Transaction::from_hex(receipt.tx_hex.as_deref().unwrap()).unwrap();
    assert_eq!(tx.outputs.len(), 2);
    assert!(tx.outputs.iter().all(|o| o.satoshis > 0));
    assert_eq!(tx.outputs[1].locking_script, fee_address().locking_script());
}

#[tokio::test]
async fn zero_percent_skips_fee_output() {
    let parent = funding_parent(&owner(true), &[5_000_000]);
    let node = MockNode::funded_by(&parent);
    let config = SendConfig {
        fee_percent: FeePercent::ZERO,
        ..config_with_fee()
    };

    let receipt = send(&config, &node, &request("0.02")).await.unwrap();
    let breakdown = receipt.breakdown.unwrap();
    assert_eq!(breakdown.platform_fee, 0);
    assert_eq!(breakdown.change, 5_000_000 - 2_000_000 - 1_000);
}

#[tokio::test]
async fn uncompressed_key_signs_with_full_public_key() {
    let parent = funding_parent(&owner(false), &[50_000]);
    let node = MockNode::funded_by(&parent);
    let req = SendRequest::new(destination().to_string(), "0.0001").with_secret(WIF_UNCOMPRESSED);

    let receipt = send(&SendConfig::default(), &node, &req).await.unwrap();
    let tx = assert_input_signed_by_owner(receipt.tx_hex.as_deref().unwrap(), &parent, false);
    assert_eq!(tx.outputs[1].locking_script, owner(false).locking_script());
}

#[tokio::test]
async fn parent_that_does_not_match_txid_is_refused() {
    let parent = funding_parent(&owner(true), &[5_000_000]);
    let impostor = funding_parent(&owner(true), &[5_000_001]);
    let mut node = MockNode::funded_by(&parent);
    node.parents.insert(parent.tx_id(), impostor.to_hex());

    let outcome = SendFlow::new(&SendConfig::default(), &node).run(&request("0.01")).await;
    assert_eq!(outcome.result.unwrap_err().kind(), ErrorKind::SigningFailed);
    assert!(node.broadcasts().is_empty());
    assert!(outcome.history.contains(&FlowState::Signing));
    assert!(!outcome.history.contains(&FlowState::Broadcasting));
}

#[tokio::test]
async fn output_locked_to_someone_else_is_refused() {
    let parent = funding_parent(&address(0x99), &[5_000_000]);
    let node = MockNode::funded_by(&parent);
    let err = send(&SendConfig::default(), &node, &request("0.01")).await.unwrap_err();
    assert!(matches!(err, SendError::SigningFailed { .. }));
    assert!(node.broadcasts().is_empty());
}

#[tokio::test]
async fn node_reported_value_must_match_parent() {
    let parent = funding_parent(&owner(true), &[5_000_000]);
    let mut node = MockNode::funded_by(&parent);
    node.utxos[0].value_satoshis = 6_000_000;
    let err = send(&SendConfig::default(), &node, &request("0.01")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SigningFailed);
}

#[tokio::test]
async fn missing_parent_is_fetch_failure() {
    let parent = funding_parent(&owner(true), &[5_000_000]);
    let mut node = MockNode::funded_by(&parent);
    node.parents.clear();
    let err = send(&SendConfig::default(), &node, &request("0.01")).await.unwrap_err();
    assert!(matches!(err, SendError::FetchFailed { .. }));
    assert!(node.broadcasts().is_empty());
}

#[tokio::test]
async fn rejected_broadcast_keeps_signed_hex() {
    let parent = funding_parent(&owner(true), &[5_000_000]);
    let mut node = MockNode::funded_by(&parent);
    node.reject_broadcast = true;

    let err = send(&SendConfig::default(), &node, &request("0.01")).await.unwrap_err();
    match err {
        SendError::BroadcastFailed { txid, tx_hex, source } => {
            let tx = Transaction::from_hex(&tx_hex).unwrap();
            assert_eq!(tx.tx_id(), txid);
            assert_eq!(node.broadcasts(), vec![tx_hex]);
            assert!(source.to_string().contains("min relay fee not met"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn node_wallet_mode_skips_local_signing() {
    let node = MockNode::new();
    let config = SendConfig {
        mode: SendMode::NodeWallet,
        ..config_with_fee()
    };
    let req = SendRequest::new(destination().to_string(), "2.5");

    let outcome = SendFlow::new(&config, &node).run(&req).await;
    let receipt = outcome.result.unwrap();
    assert_eq!(receipt.txid, Hash::new([0xab; 32]));
    assert_eq!(receipt.mode, SendMode::NodeWallet);
    assert!(receipt.tx_hex.is_none());
    assert_eq!(node.calls(), vec!["validateaddress", "sendtoaddress"]);
    assert_eq!(
        outcome.history,
        vec![
            FlowState::Idle,
            FlowState::ValidatingInput,
            FlowState::Broadcasting,
            FlowState::Succeeded(receipt.txid),
        ]
    );
}

#[tokio::test]
async fn concurrent_sends_share_config_and_node() {
    let parent = funding_parent(&owner(true), &[5_000_000, 7_000_000]);
    let node = MockNode::funded_by(&parent);
    let config = config_with_fee();

    let a = request("0.01");
    let b = request("0.02");
    let (ra, rb) = tokio::join!(send(&config, &node, &a), send(&config, &node, &b));
    assert_eq!(ra.unwrap().breakdown.unwrap().payment, 1_000_000);
    assert_eq!(rb.unwrap().breakdown.unwrap().payment, 2_000_000);
    assert_eq!(node.broadcasts().len(), 2);
}
