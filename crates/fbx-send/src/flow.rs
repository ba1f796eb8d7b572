//! The send state machine.
//!
//! A [`SendFlow`] drives one send from `Idle` to a terminal state, moving
//! strictly forward and recording every state it enters. It is consumed by
//! [`SendFlow::run`], so a second send always starts from a fresh flow.

use std::fmt;

use fbx_primitives::chainhash::Hash;
use fbx_rpc::{AddressValidator, Broadcaster, NodeWallet, RpcError, UtxoSource};
use fbx_script::Address;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::amount::parse_amount;
use crate::config::{SendConfig, SendMode};
use crate::fee::FeeBreakdown;
use crate::key_material::KeyMaterial;
use crate::{builder, coin_selection, fee, signer, ErrorKind, SendError};

/// What the caller asks for.
#[derive(Clone)]
pub struct SendRequest {
    /// Recipient address.
    pub destination: String,
    /// Decimal coin amount, e.g. `"1.5"`.
    pub amount: String,
    /// WIF secret. Required for client-signed sends, ignored otherwise.
    pub secret: Option<Zeroizing<String>>,
}

impl SendRequest {
    pub fn new(destination: impl Into<String>, amount: impl Into<String>) -> Self {
        SendRequest {
            destination: destination.into(),
            amount: amount.into(),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(Zeroizing::new(secret.into()));
        self
    }
}

impl fmt::Debug for SendRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendRequest")
            .field("destination", &self.destination)
            .field("amount", &self.amount)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// States of a send, in the only order they can be entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    ValidatingInput,
    FetchingUtxos,
    SelectingCoin,
    ComputingFees,
    Building,
    Signing,
    Broadcasting,
    Succeeded(Hash),
    Failed(ErrorKind),
}

impl FlowState {
    fn step(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::ValidatingInput => 1,
            Self::FetchingUtxos => 2,
            Self::SelectingCoin => 3,
            Self::ComputingFees => 4,
            Self::Building => 5,
            Self::Signing => 6,
            Self::Broadcasting => 7,
            Self::Succeeded(_) | Self::Failed(_) => 8,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::ValidatingInput => write!(f, "validating-input"),
            Self::FetchingUtxos => write!(f, "fetching-utxos"),
            Self::SelectingCoin => write!(f, "selecting-coin"),
            Self::ComputingFees => write!(f, "computing-fees"),
            Self::Building => write!(f, "building"),
            Self::Signing => write!(f, "signing"),
            Self::Broadcasting => write!(f, "broadcasting"),
            Self::Succeeded(txid) => write!(f, "succeeded({})", txid),
            Self::Failed(kind) => write!(f, "failed({:?})", kind),
        }
    }
}

/// A successful send.
#[derive(Debug, Clone)]
pub struct SendReceipt {
    /// Txid reported by the node.
    pub txid: Hash,
    pub mode: SendMode,
    /// Value split; only known for client-signed sends.
    pub breakdown: Option<FeeBreakdown>,
    /// Signed transaction hex; only known for client-signed sends.
    pub tx_hex: Option<String>,
}

/// Result of a finished flow together with the states it went through.
#[derive(Debug)]
pub struct FlowOutcome {
    pub result: Result<SendReceipt, SendError>,
    pub history: Vec<FlowState>,
}

/// One send, from input validation to broadcast.
pub struct SendFlow<'a, N> {
    config: &'a SendConfig,
    node: &'a N,
    state: FlowState,
    history: Vec<FlowState>,
}

impl<'a, N> SendFlow<'a, N>
where
    N: UtxoSource + Broadcaster + AddressValidator + NodeWallet + Sync,
{
    pub fn new(config: &'a SendConfig, node: &'a N) -> Self {
        SendFlow {
            config,
            node,
            state: FlowState::Idle,
            history: vec![FlowState::Idle],
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Run the send to completion.
    pub async fn run(mut self, request: &SendRequest) -> FlowOutcome {
        let result = self.execute(request).await;
        let terminal = match &result {
            Ok(receipt) => {
                info!(txid = %receipt.txid, "send succeeded");
                FlowState::Succeeded(receipt.txid)
            }
            Err(e) => {
                warn!(state = %self.state, error = %e, "send failed");
                FlowState::Failed(e.kind())
            }
        };
        self.advance(terminal);
        FlowOutcome {
            result,
            history: self.history,
        }
    }

    fn advance(&mut self, next: FlowState) {
        debug_assert!(
            next.step() > self.state.step(),
            "flow moved backwards from {} to {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "send transition");
        self.state = next.clone();
        self.history.push(next);
    }

    async fn execute(&mut self, request: &SendRequest) -> Result<SendReceipt, SendError> {
        self.advance(FlowState::ValidatingInput);
        let payment = parse_amount(&request.amount)?;

        match self.config.mode {
            SendMode::NodeWallet => {
                let destination = self.validate_destination(&request.destination).await?;
                self.send_from_node_wallet(&destination, payment).await
            }
            SendMode::ClientSigned => {
                let secret = request.secret.as_ref().ok_or_else(|| SendError::InvalidSecret {
                    reason: "no secret key supplied".to_string(),
                    source: None,
                })?;
                let key = KeyMaterial::decode(secret, &self.config.network)?;
                let destination = self.validate_destination(&request.destination).await?;
                self.send_client_signed(&key, &destination, payment).await
            }
        }
    }

    /// Parse locally first, so a typo never costs a round trip, then ask
    /// the node.
    async fn validate_destination(&self, destination: &str) -> Result<Address, SendError> {
        let address = Address::from_string(destination, &self.config.network).map_err(|e| {
            SendError::InvalidAddress {
                address: destination.to_string(),
                reason: e.to_string(),
            }
        })?;

        let validation = self
            .node
            .validate_address(&address.address_string)
            .await
            .map_err(|e| SendError::FetchFailed {
                what: format!("validation of {}", address),
                source: e,
            })?;
        if !validation.isvalid {
            return Err(SendError::InvalidAddress {
                address: address.address_string,
                reason: "rejected by node".to_string(),
            });
        }
        Ok(address)
    }

    async fn send_from_node_wallet(
        &mut self,
        destination: &Address,
        payment: u64,
    ) -> Result<SendReceipt, SendError> {
        self.advance(FlowState::Broadcasting);
        info!(to = %destination, satoshis = payment, "sending from node wallet");
        let txid = self
            .node
            .send_to_address(&destination.address_string, payment)
            .await
            .map_err(|e| SendError::FetchFailed {
                what: "sendtoaddress".to_string(),
                source: e,
            })?;
        Ok(SendReceipt {
            txid,
            mode: SendMode::NodeWallet,
            breakdown: None,
            tx_hex: None,
        })
    }

    async fn send_client_signed(
        &mut self,
        key: &KeyMaterial,
        destination: &Address,
        payment: u64,
    ) -> Result<SendReceipt, SendError> {
        let config = self.config;
        let owner = key.address().address_string.clone();

        self.advance(FlowState::FetchingUtxos);
        let utxos = self
            .node
            .list_unspent(&owner, config.min_conf, config.max_conf)
            .await
            .map_err(|e| match e {
                RpcError::MalformedResult { .. } => SendError::NoSpendableFunds {
                    address: Some(owner.clone()),
                    source: Some(e),
                },
                other => SendError::FetchFailed {
                    what: format!("unspent outputs of {}", owner),
                    source: other,
                },
            })?;
        if utxos.is_empty() {
            return Err(SendError::NoSpendableFunds {
                address: Some(owner),
                source: None,
            });
        }
        debug!(address = %owner, count = utxos.len(), "fetched unspent outputs");

        self.advance(FlowState::SelectingCoin);
        let quote = fee::split(
            payment,
            config.fee_percent,
            config.fee_address.is_some(),
            config.miner_fee_sats,
        )?;
        let selected = coin_selection::select_first_fit(&utxos, quote.required_total)?;
        debug!(txid = %selected.txid, vout = selected.vout, value = selected.value_satoshis, "selected output");

        self.advance(FlowState::ComputingFees);
        let breakdown = quote.settle(selected.value_satoshis)?;
        debug!(?breakdown, "fees");

        self.advance(FlowState::Building);
        let parent_hex = self
            .node
            .get_raw_transaction(&selected.txid)
            .await
            .map_err(|e| SendError::FetchFailed {
                what: format!("parent transaction {}", selected.txid),
                source: e,
            })?;
        let parent_raw = hex::decode(parent_hex.trim()).map_err(|e| SendError::FetchFailed {
            what: format!("parent transaction {}", selected.txid),
            source: RpcError::MalformedResult {
                method: "getrawtransaction".to_string(),
                reason: e.to_string(),
            },
        })?;
        let unsigned = builder::build(
            selected,
            parent_raw,
            destination,
            &quote,
            key.address(),
            config.fee_address.as_ref(),
        )?;

        self.advance(FlowState::Signing);
        let signed = signer::sign(&unsigned, key)?;

        self.advance(FlowState::Broadcasting);
        let tx_hex = signed.to_hex();
        let txid = self
            .node
            .send_raw_transaction(&tx_hex)
            .await
            .map_err(|e| SendError::BroadcastFailed {
                txid: signed.txid(),
                tx_hex: tx_hex.clone(),
                source: e,
            })?;
        if txid != signed.txid() {
            warn!(node = %txid, local = %signed.txid(), "node reported a different txid");
        }

        Ok(SendReceipt {
            txid,
            mode: SendMode::ClientSigned,
            breakdown: Some(unsigned.breakdown),
            tx_hex: Some(tx_hex),
        })
    }
}

/// Run one send with a fresh flow and return its result.
pub async fn send<N>(
    config: &SendConfig,
    node: &N,
    request: &SendRequest,
) -> Result<SendReceipt, SendError>
where
    N: UtxoSource + Broadcaster + AddressValidator + NodeWallet + Sync,
{
    SendFlow::new(config, node).run(request).await.result
}
