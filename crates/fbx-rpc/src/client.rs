//! JSON-RPC HTTP client and the collaborator traits the send engine uses.

use std::future::Future;
use std::str::FromStr;

use fbx_primitives::amount::format_coins;
use fbx_primitives::chainhash::Hash;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::RpcError;
use crate::types::{AddressValidation, RpcConfig, RpcRequest, RpcResponse, UnspentEntry, Utxo};

/// Source of spendable outputs for an address.
pub trait UtxoSource {
    /// List unspent outputs paying `address` with a confirmation count in
    /// `min_conf..=max_conf`, in the order the node returns them.
    fn list_unspent(
        &self,
        address: &str,
        min_conf: u32,
        max_conf: u32,
    ) -> impl Future<Output = Result<Vec<Utxo>, RpcError>> + Send;
}

/// Fetches parent transactions and relays signed ones.
pub trait Broadcaster {
    /// Fetch a transaction's raw hex by id.
    fn get_raw_transaction(
        &self,
        txid: &Hash,
    ) -> impl Future<Output = Result<String, RpcError>> + Send;

    /// Submit a signed transaction; returns the txid the node assigned.
    fn send_raw_transaction(
        &self,
        tx_hex: &str,
    ) -> impl Future<Output = Result<Hash, RpcError>> + Send;
}

/// Remote address validation.
pub trait AddressValidator {
    /// Ask the node whether `address` is valid on its network.
    fn validate_address(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<AddressValidation, RpcError>> + Send;
}

/// A node that holds the sender's key and signs on their behalf.
pub trait NodeWallet {
    /// Pay `satoshis` to `address` from the node's wallet.
    fn send_to_address(
        &self,
        address: &str,
        satoshis: u64,
    ) -> impl Future<Output = Result<Hash, RpcError>> + Send;
}

/// HTTP client for a node's JSON-RPC interface.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RpcClient {
    /// Client configuration.
    config: RpcConfig,
    /// Underlying HTTP client.
    client: reqwest::Client,
}

impl RpcClient {
    /// Create a new RPC client with the given configuration.
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(RpcError::Client)?;
        Ok(Self { config, client })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Call `method` with positional `params` and decode `result` as `T`.
    ///
    /// A non-null `error` object wins over the HTTP status, since nodes
    /// report RPC failures with a 500 and a well-formed envelope.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let transport = |source| RpcError::Transport {
            method: method.to_string(),
            source,
        };

        let body = serde_json::to_vec(&RpcRequest {
            jsonrpc: "1.0",
            id: method,
            method,
            params,
        })?;

        debug!(method, url = %self.config.url, "rpc call");

        let mut request = self
            .client
            .post(&self.config.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(ref user) = self.config.user {
            request = request.basic_auth(user, self.config.password.as_ref());
        }

        let resp = request.send().await.map_err(transport)?;
        let status = resp.status();
        let text = resp.text().await.map_err(transport)?;

        let envelope = serde_json::from_str::<RpcResponse>(&text);
        if let Ok(RpcResponse { ref error, .. }) = envelope {
            if !error.is_null() {
                debug!(method, %error, "rpc error");
                return Err(RpcError::Node {
                    method: method.to_string(),
                    code: error.get("code").and_then(|c| c.as_i64()).unwrap_or(0),
                    message: error
                        .get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string()),
                    payload: error.clone(),
                });
            }
        }

        if !status.is_success() {
            return Err(RpcError::HttpStatus {
                method: method.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope = envelope
            .map_err(|e| RpcError::malformed(method, format!("not a JSON-RPC response: {e}")))?;
        serde_json::from_value(envelope.result)
            .map_err(|e| RpcError::malformed(method, e.to_string()))
    }

    /// `listunspent minconf maxconf [address]`.
    pub async fn list_unspent(
        &self,
        address: &str,
        min_conf: u32,
        max_conf: u32,
    ) -> Result<Vec<Utxo>, RpcError> {
        let entries: Vec<UnspentEntry> = self
            .call("listunspent", json!([min_conf, max_conf, [address]]))
            .await?;
        debug!(address, count = entries.len(), "listunspent");
        entries.into_iter().map(UnspentEntry::into_utxo).collect()
    }

    /// `getrawtransaction txid`, non-verbose.
    pub async fn get_raw_transaction(&self, txid: &Hash) -> Result<String, RpcError> {
        self.call("getrawtransaction", json!([txid.to_string()])).await
    }

    /// `sendrawtransaction hex`.
    pub async fn send_raw_transaction(&self, tx_hex: &str) -> Result<Hash, RpcError> {
        let txid: String = self.call("sendrawtransaction", json!([tx_hex])).await?;
        parse_txid("sendrawtransaction", &txid)
    }

    /// `validateaddress address`.
    pub async fn validate_address(&self, address: &str) -> Result<AddressValidation, RpcError> {
        self.call("validateaddress", json!([address])).await
    }

    /// `sendtoaddress address amount`, the amount as an exact decimal number.
    pub async fn send_to_address(&self, address: &str, satoshis: u64) -> Result<Hash, RpcError> {
        let amount = serde_json::Number::from_str(&format_coins(satoshis))
            .map_err(|e| RpcError::malformed("sendtoaddress", e.to_string()))?;
        let txid: String = self.call("sendtoaddress", json!([address, amount])).await?;
        parse_txid("sendtoaddress", &txid)
    }
}

fn parse_txid(method: &str, txid: &str) -> Result<Hash, RpcError> {
    Hash::from_hex(txid).map_err(|e| RpcError::malformed(method, format!("txid {txid:?}: {e}")))
}

impl UtxoSource for RpcClient {
    async fn list_unspent(
        &self,
        address: &str,
        min_conf: u32,
        max_conf: u32,
    ) -> Result<Vec<Utxo>, RpcError> {
        RpcClient::list_unspent(self, address, min_conf, max_conf).await
    }
}

impl Broadcaster for RpcClient {
    async fn get_raw_transaction(&self, txid: &Hash) -> Result<String, RpcError> {
        RpcClient::get_raw_transaction(self, txid).await
    }

    async fn send_raw_transaction(&self, tx_hex: &str) -> Result<Hash, RpcError> {
        RpcClient::send_raw_transaction(self, tx_hex).await
    }
}

impl AddressValidator for RpcClient {
    async fn validate_address(&self, address: &str) -> Result<AddressValidation, RpcError> {
        RpcClient::validate_address(self, address).await
    }
}

impl NodeWallet for RpcClient {
    async fn send_to_address(&self, address: &str, satoshis: u64) -> Result<Hash, RpcError> {
        RpcClient::send_to_address(self, address, satoshis).await
    }
}
