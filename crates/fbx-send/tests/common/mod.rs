#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use fbx_primitives::chainhash::{double_hash_h, Hash};
use fbx_rpc::{
    AddressValidation, AddressValidator, Broadcaster, NodeWallet, RpcError, Utxo, UtxoSource,
};
use fbx_script::{Address, NetworkParams};
use fbx_send::SendConfig;
use fbx_transaction::{Transaction, TransactionInput, TransactionOutput};

/// Fairbrix WIF of private key 1, compressed.
pub const WIF_COMPRESSED: &str = "ZzJcVzMc3HJfJPxJKu29Xp6cVtoUAKU7JWv4nJG7Vi4ioKPGkf8n";
/// Fairbrix WIF of private key 1, uncompressed.
pub const WIF_UNCOMPRESSED: &str = "8UV1Li682spW4wbHAGQphWhhDSL8y2vGUXo1QQPug8VV3ohsedD";
/// Address of `WIF_COMPRESSED`.
pub const OWNER: &str = "fQna6UCypCszqVSDYdkbtmGiv2vAYP9zmo";
/// Address of `WIF_UNCOMPRESSED`.
pub const OWNER_UNCOMPRESSED: &str = "fTPg7QiRm849cYVBeunPq8unWg1KXFZ4Wx";
/// Bitcoin mainnet WIF of private key 1.
pub const FOREIGN_WIF: &str = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn";

pub fn address(tag: u8) -> Address {
    Address::from_public_key_hash(&[tag; 20], &NetworkParams::default())
}

pub fn destination() -> Address {
    address(0x33)
}

pub fn fee_address() -> Address {
    address(0x44)
}

pub fn owner(compressed: bool) -> Address {
    let s = if compressed { OWNER } else { OWNER_UNCOMPRESSED };
    Address::from_string(s, &NetworkParams::default()).unwrap()
}

/// Default config with a platform fee address set (1%, 1000 sat miner fee).
pub fn config_with_fee() -> SendConfig {
    SendConfig {
        fee_address: Some(fee_address()),
        ..SendConfig::default()
    }
}

/// A parent transaction paying each of `values` to `to`.
pub fn funding_parent(to: &Address, values: &[u64]) -> Transaction {
    let mut parent = Transaction::new();
    parent.add_input(TransactionInput::new(Hash::new([0xee; 32]), 0));
    for value in values {
        parent.add_output(TransactionOutput::new(*value, to.locking_script()));
    }
    parent
}

pub fn utxos_of(parent: &Transaction) -> Vec<Utxo> {
    let txid = parent.tx_id();
    parent
        .outputs
        .iter()
        .enumerate()
        .map(|(vout, o)| Utxo {
            txid,
            vout: vout as u32,
            value_satoshis: o.satoshis,
        })
        .collect()
}

/// In-memory node recording every call made to it.
pub struct MockNode {
    pub utxos: Vec<Utxo>,
    pub parents: HashMap<Hash, String>,
    pub address_valid: bool,
    pub malformed_listing: bool,
    pub reject_broadcast: bool,
    calls: Mutex<Vec<&'static str>>,
    broadcasts: Mutex<Vec<String>>,
}

impl MockNode {
    pub fn new() -> Self {
        MockNode {
            utxos: Vec::new(),
            parents: HashMap::new(),
            address_valid: true,
            malformed_listing: false,
            reject_broadcast: false,
            calls: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
        }
    }

    /// Serve `parent` and list all of its outputs as unspent.
    pub fn funded_by(parent: &Transaction) -> Self {
        let mut node = Self::new();
        node.utxos = utxos_of(parent);
        node.parents.insert(parent.tx_id(), parent.to_hex());
        node
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().unwrap().push(method);
    }
}

fn node_error(method: &str, code: i64, message: &str) -> RpcError {
    RpcError::Node {
        method: method.to_string(),
        code,
        message: message.to_string(),
        payload: serde_json::json!({ "code": code, "message": message }),
    }
}

impl UtxoSource for MockNode {
    async fn list_unspent(
        &self,
        _address: &str,
        _min_conf: u32,
        _max_conf: u32,
    ) -> Result<Vec<Utxo>, RpcError> {
        self.record("listunspent");
        if self.malformed_listing {
            return Err(RpcError::MalformedResult {
                method: "listunspent".to_string(),
                reason: "expected an array".to_string(),
            });
        }
        Ok(self.utxos.clone())
    }
}

impl Broadcaster for MockNode {
    async fn get_raw_transaction(&self, txid: &Hash) -> Result<String, RpcError> {
        self.record("getrawtransaction");
        self.parents
            .get(txid)
            .cloned()
            .ok_or_else(|| node_error("getrawtransaction", -5, "No such mempool or blockchain transaction"))
    }

    async fn send_raw_transaction(&self, tx_hex: &str) -> Result<Hash, RpcError> {
        self.record("sendrawtransaction");
        self.broadcasts.lock().unwrap().push(tx_hex.to_string());
        if self.reject_broadcast {
            return Err(node_error("sendrawtransaction", -26, "min relay fee not met"));
        }
        let bytes = hex::decode(tx_hex).unwrap();
        Ok(double_hash_h(&bytes))
    }
}

impl AddressValidator for MockNode {
    async fn validate_address(&self, address: &str) -> Result<AddressValidation, RpcError> {
        self.record("validateaddress");
        Ok(AddressValidation {
            isvalid: self.address_valid,
            address: Some(address.to_string()),
            script_pub_key: None,
            isscript: Some(false),
        })
    }
}

impl NodeWallet for MockNode {
    async fn send_to_address(&self, _address: &str, _satoshis: u64) -> Result<Hash, RpcError> {
        self.record("sendtoaddress");
        Ok(Hash::new([0xab; 32]))
    }
}
