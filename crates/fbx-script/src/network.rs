//! Network parameters binding version bytes to a ledger.
//!
//! A `NetworkParams` value is built once at process start, either from the
//! Fairbrix defaults or from environment overrides, and is then shared
//! read-only by every send.

use tracing::warn;

/// Environment variable overriding the signed-message prefix.
pub const ENV_MESSAGE_PREFIX: &str = "FAIRBRIX_MESSAGE_PREFIX";
/// Environment variable overriding the bech32 human-readable part.
pub const ENV_BECH32: &str = "FAIRBRIX_BECH32";
/// Environment variable overriding the BIP32 public version.
pub const ENV_BIP32_PUBLIC: &str = "FAIRBRIX_BIP32_PUBLIC";
/// Environment variable overriding the BIP32 private version.
pub const ENV_BIP32_PRIVATE: &str = "FAIRBRIX_BIP32_PRIVATE";
/// Environment variable overriding the pay-to-key-hash version byte.
pub const ENV_PUB_KEY_HASH: &str = "FAIRBRIX_PKH";
/// Environment variable overriding the script-hash version byte.
pub const ENV_SCRIPT_HASH: &str = "FAIRBRIX_SH";
/// Environment variable overriding the WIF version byte.
pub const ENV_WIF: &str = "FAIRBRIX_WIF";

/// BIP32 extended key version bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bip32Versions {
    pub public: u32,
    pub private: u32,
}

/// Version bytes and prefixes that identify a ledger.
///
/// Only `pub_key_hash`, `script_hash` and `wif` influence sending; the
/// remaining fields are carried so a single record describes the network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkParams {
    /// Prefix hashed in front of signed messages.
    pub message_prefix: String,
    /// Human-readable part of segwit addresses.
    pub bech32: String,
    /// Extended key version bytes.
    pub bip32: Bip32Versions,
    /// Base58Check version of pay-to-key-hash addresses.
    pub pub_key_hash: u8,
    /// Base58Check version of pay-to-script-hash addresses.
    pub script_hash: u8,
    /// Base58Check version of WIF secrets.
    pub wif: u8,
}

impl Default for NetworkParams {
    /// Fairbrix mainnet.
    fn default() -> Self {
        NetworkParams {
            message_prefix: "\x18FairBrix Signed Message:\n".to_string(),
            bech32: "fbx".to_string(),
            bip32: Bip32Versions {
                public: 0x0488_b21e,
                private: 0x0488_ade4,
            },
            pub_key_hash: 0x5f,
            script_hash: 0x05,
            wif: 0xdf,
        }
    }
}

impl NetworkParams {
    /// Build parameters from the process environment, falling back to the
    /// Fairbrix defaults for anything unset or malformed.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build parameters from an arbitrary key lookup.
    ///
    /// Numeric values accept `0x`-prefixed hex or plain decimal. A value
    /// that does not parse, or does not fit the field, is ignored with a
    /// warning and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| match lookup(key) {
            Some(v) if !v.is_empty() => v,
            _ => default,
        };

        NetworkParams {
            message_prefix: text(ENV_MESSAGE_PREFIX, defaults.message_prefix),
            bech32: text(ENV_BECH32, defaults.bech32),
            bip32: Bip32Versions {
                public: parse_env_number(ENV_BIP32_PUBLIC, lookup(ENV_BIP32_PUBLIC), defaults.bip32.public),
                private: parse_env_number(ENV_BIP32_PRIVATE, lookup(ENV_BIP32_PRIVATE), defaults.bip32.private),
            },
            pub_key_hash: parse_env_number(ENV_PUB_KEY_HASH, lookup(ENV_PUB_KEY_HASH), defaults.pub_key_hash),
            script_hash: parse_env_number(ENV_SCRIPT_HASH, lookup(ENV_SCRIPT_HASH), defaults.script_hash),
            wif: parse_env_number(ENV_WIF, lookup(ENV_WIF), defaults.wif),
        }
    }
}

/// Parse an optional `0x`-hex or decimal override into `T`.
///
/// Unset or blank values return `default` silently; anything else that
/// fails to parse or overflows `T` returns `default` with a warning.
pub fn parse_env_number<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: TryFrom<u64> + Copy + std::fmt::Debug,
{
    let raw = match value {
        Some(v) => v,
        None => return default,
    };
    let s = raw.trim();
    if s.is_empty() {
        return default;
    }

    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse::<u64>().ok()
    } else {
        None
    };

    match parsed.and_then(|n| T::try_from(n).ok()) {
        Some(v) => v,
        None => {
            warn!(key, value = %s, default = ?default, "ignoring malformed network override");
            default
        }
    }
}
