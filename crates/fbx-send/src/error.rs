use fbx_primitives::chainhash::Hash;
use fbx_primitives::PrimitivesError;
use fbx_rpc::RpcError;
use fbx_transaction::TransactionError;

/// Terminal failures of a send. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The secret is missing, malformed, or belongs to another network.
    #[error("invalid secret key: {reason}")]
    InvalidSecret {
        reason: String,
        #[source]
        source: Option<PrimitivesError>,
    },

    /// The amount does not parse, is zero, or overflows with fees added.
    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    /// The address fails local parsing or remote validation.
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The node reports no unspent outputs, or an unreadable list of them.
    #[error(
        "no spendable funds{}",
        .address.as_deref().map(|a| format!(" for {a}")).unwrap_or_default()
    )]
    NoSpendableFunds {
        address: Option<String>,
        #[source]
        source: Option<RpcError>,
    },

    /// No single output covers the required total.
    #[error(
        "insufficient funds: need {required} satoshis in one output, \
         largest is {largest} ({total} across {count} outputs)"
    )]
    InsufficientFunds {
        required: u64,
        largest: u64,
        total: u64,
        count: usize,
    },

    /// The selected input cannot pay the payment, platform fee and miner fee.
    #[error("input of {available} satoshis cannot cover {required} satoshis")]
    NegativeChange { available: u64, required: u64 },

    /// The transaction could not be assembled or signed as requested.
    #[error("signing failed: {reason}")]
    SigningFailed {
        reason: String,
        #[source]
        source: Option<TransactionError>,
    },

    /// A node call needed before signing failed.
    #[error("failed to fetch {what}: {source}")]
    FetchFailed {
        what: String,
        #[source]
        source: RpcError,
    },

    /// The node refused or never answered the broadcast. `tx_hex` is the
    /// fully signed transaction, ready to resubmit by hand.
    #[error("broadcast of {txid} failed: {source}")]
    BroadcastFailed {
        txid: Hash,
        tx_hex: String,
        #[source]
        source: RpcError,
    },
}

/// Payload-free tag of a [`SendError`], for state records and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSecret,
    InvalidAmount,
    InvalidAddress,
    NoSpendableFunds,
    InsufficientFunds,
    NegativeChange,
    SigningFailed,
    FetchFailed,
    BroadcastFailed,
}

impl SendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSecret { .. } => ErrorKind::InvalidSecret,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            Self::NoSpendableFunds { .. } => ErrorKind::NoSpendableFunds,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::NegativeChange { .. } => ErrorKind::NegativeChange,
            Self::SigningFailed { .. } => ErrorKind::SigningFailed,
            Self::FetchFailed { .. } => ErrorKind::FetchFailed,
            Self::BroadcastFailed { .. } => ErrorKind::BroadcastFailed,
        }
    }

    pub(crate) fn signing(reason: impl Into<String>) -> Self {
        Self::SigningFailed {
            reason: reason.into(),
            source: None,
        }
    }
}
