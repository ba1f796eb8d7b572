//! Send configuration.
//!
//! Built once per process, usually from the environment, and then passed by
//! reference into every send. Malformed overrides never abort startup: they
//! are logged and the default is used instead.

use std::fmt;

use fbx_primitives::amount::{format_coins, parse_coins, SATOSHIS_PER_COIN};
use fbx_rpc::RpcConfig;
use fbx_script::network::parse_env_number;
use fbx_script::{Address, NetworkParams};
use tracing::warn;

/// Platform fee percentage (decimal, negative clamps to zero).
pub const ENV_PLATFORM_FEE_PCT: &str = "FAIRBRIX_PLATFORM_FEE_PCT";
/// Address receiving the platform fee; blank disables the fee.
pub const ENV_DEV_FEE_ADDRESS: &str = "FAIRBRIX_DEV_FEE_ADDRESS";
/// Flat miner fee in satoshis.
pub const ENV_MINER_FEE_SATS: &str = "FAIRBRIX_MINER_FEE_SATS";
/// `true` delegates signing to the node's wallet.
pub const ENV_NODE_WALLET_MODE: &str = "FAIRBRIX_NODE_WALLET_MODE";
/// JSON-RPC endpoint.
pub const ENV_RPC_URL: &str = "FAIRBRIX_RPC_URL";
/// Basic-auth user for direct node access.
pub const ENV_RPC_USER: &str = "FAIRBRIX_RPC_USER";
/// Basic-auth password for direct node access.
pub const ENV_RPC_PASS: &str = "FAIRBRIX_RPC_PASS";

pub const DEFAULT_MINER_FEE_SATS: u64 = 1000;
pub const MIN_CONFIRMATIONS: u32 = 1;
pub const MAX_CONFIRMATIONS: u32 = 9_999_999;

/// A percentage with eight exact decimal places.
///
/// Stored as hundred-millionths of a percent so that `0.25` percent is
/// `25_000_000` and no float is ever involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FeePercent(u64);

impl FeePercent {
    pub const ZERO: FeePercent = FeePercent(0);

    /// A whole-number percentage.
    pub const fn whole(percent: u32) -> Self {
        FeePercent(percent as u64 * SATOSHIS_PER_COIN)
    }

    /// Parse a decimal percentage such as `"1"` or `"0.5"`.
    ///
    /// A leading minus sign clamps the value to zero. Returns `None` if the
    /// text is not a number.
    pub fn parse(text: &str) -> Option<Self> {
        let s = text.trim();
        match s.strip_prefix('-') {
            Some(rest) => parse_coins(rest).ok().map(|_| Self::ZERO),
            None => parse_coins(s).ok().map(FeePercent),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `floor(amount * self / 100)`, or `None` if that exceeds `u64`.
    pub fn of(&self, amount: u64) -> Option<u64> {
        let scaled = u128::from(amount) * u128::from(self.0);
        u64::try_from(scaled / (100 * u128::from(SATOSHIS_PER_COIN))).ok()
    }
}

impl fmt::Display for FeePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format_coins(self.0);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{}%", text)
    }
}

/// Who signs the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendMode {
    /// Build and sign locally from the user's secret.
    #[default]
    ClientSigned,
    /// Ask the node to pay from its own wallet via `sendtoaddress`.
    NodeWallet,
}

/// Immutable configuration shared by all sends.
#[derive(Debug, Clone)]
pub struct SendConfig {
    pub network: NetworkParams,
    pub fee_percent: FeePercent,
    /// Platform fee recipient. `None` disables the fee regardless of percent.
    pub fee_address: Option<Address>,
    pub miner_fee_sats: u64,
    pub mode: SendMode,
    pub rpc: RpcConfig,
    pub min_conf: u32,
    pub max_conf: u32,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            network: NetworkParams::default(),
            fee_percent: FeePercent::whole(1),
            fee_address: None,
            miner_fee_sats: DEFAULT_MINER_FEE_SATS,
            mode: SendMode::ClientSigned,
            rpc: RpcConfig::default(),
            min_conf: MIN_CONFIRMATIONS,
            max_conf: MAX_CONFIRMATIONS,
        }
    }
}

impl SendConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Network overrides are read through [`NetworkParams::from_lookup`]
    /// first, so the fee address is checked against the final network.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let network = NetworkParams::from_lookup(&lookup);
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let fee_percent = match value(ENV_PLATFORM_FEE_PCT) {
            None => defaults.fee_percent,
            Some(raw) => FeePercent::parse(&raw).unwrap_or_else(|| {
                warn!(key = ENV_PLATFORM_FEE_PCT, value = %raw, "ignoring malformed fee percent");
                defaults.fee_percent
            }),
        };

        let fee_address = value(ENV_DEV_FEE_ADDRESS).and_then(|raw| {
            Address::from_string(&raw, &network)
                .map_err(|e| {
                    warn!(key = ENV_DEV_FEE_ADDRESS, error = %e, "platform fee disabled");
                })
                .ok()
        });

        let mode = match value(ENV_NODE_WALLET_MODE).as_deref() {
            Some("true") => SendMode::NodeWallet,
            None | Some("false") => SendMode::ClientSigned,
            Some(other) => {
                warn!(key = ENV_NODE_WALLET_MODE, value = other, "expected true or false");
                SendMode::ClientSigned
            }
        };

        let rpc = RpcConfig {
            url: value(ENV_RPC_URL).unwrap_or(defaults.rpc.url),
            user: value(ENV_RPC_USER),
            password: value(ENV_RPC_PASS),
            timeout: None,
        };

        SendConfig {
            network,
            fee_percent,
            fee_address,
            miner_fee_sats: parse_env_number(
                ENV_MINER_FEE_SATS,
                lookup(ENV_MINER_FEE_SATS),
                defaults.miner_fee_sats,
            ),
            mode,
            rpc,
            min_conf: defaults.min_conf,
            max_conf: defaults.max_conf,
        }
    }

    /// Whether sends add a platform fee output.
    pub fn platform_fee_enabled(&self) -> bool {
        self.fee_address.is_some() && !self.fee_percent.is_zero()
    }
}
