//! RPC data types: client configuration, the JSON-RPC envelope, and the
//! result shapes of the calls the send engine makes.

use std::time::Duration;

use fbx_primitives::amount::parse_coins;
use fbx_primitives::chainhash::Hash;
use serde::{Deserialize, Serialize};

use crate::RpcError;

/// The production JSON-RPC proxy.
pub const DEFAULT_RPC_URL: &str = "https://www.dopelganga.com/api/rpc";

/// Configuration for an [`RpcClient`](crate::RpcClient).
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Endpoint every call is POSTed to.
    pub url: String,
    /// Basic-auth user for direct node access.
    pub user: Option<String>,
    /// Basic-auth password; only sent together with `user`.
    pub password: Option<String>,
    /// Per-request timeout. `None` waits as long as the transport does.
    pub timeout: Option<Duration>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            user: None,
            password: None,
            timeout: None,
        }
    }
}

/// JSON-RPC 1.0 request body.
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: &'a str,
    pub method: &'a str,
    pub params: serde_json::Value,
}

/// JSON-RPC 1.0 response body.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub error: serde_json::Value,
}

/// One entry of a `listunspent` result, as the node reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct UnspentEntry {
    /// Funding transaction id.
    pub txid: Hash,
    /// Output index within the funding transaction.
    pub vout: u32,
    /// Value in coins. Kept as the literal JSON number so no float is involved.
    pub amount: serde_json::Number,
    /// Address the output pays to.
    #[serde(default)]
    pub address: Option<String>,
    /// Confirmation count.
    #[serde(default)]
    pub confirmations: Option<u64>,
    /// Locking script hex.
    #[serde(default, rename = "scriptPubKey")]
    pub script_pub_key: Option<String>,
}

/// An unspent output owned by the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utxo {
    /// Funding transaction id.
    pub txid: Hash,
    /// Output index within the funding transaction.
    pub vout: u32,
    /// Value in satoshis.
    pub value_satoshis: u64,
}

impl UnspentEntry {
    /// Convert the node's decimal amount into satoshis.
    pub fn into_utxo(self) -> Result<Utxo, RpcError> {
        let value_satoshis = parse_coins(&self.amount.to_string())
            .map_err(|e| RpcError::malformed("listunspent", e.to_string()))?;
        Ok(Utxo {
            txid: self.txid,
            vout: self.vout,
            value_satoshis,
        })
    }
}

/// Result of `validateaddress`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressValidation {
    /// Whether the node accepts the address.
    pub isvalid: bool,
    /// Normalized address, when valid.
    #[serde(default)]
    pub address: Option<String>,
    /// Locking script for the address, when valid.
    #[serde(default, rename = "scriptPubKey")]
    pub script_pub_key: Option<String>,
    /// Whether the address is a script hash.
    #[serde(default)]
    pub isscript: Option<bool>,
}
