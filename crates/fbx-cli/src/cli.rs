//! Command-line arguments.
//!
//! Flags override the `FAIRBRIX_*` environment configuration; anything not
//! given on the command line falls back to [`SendConfig::from_env`].

use clap::{Args, Parser, Subcommand, ValueEnum};

use fbx_script::Address;
use fbx_send::{FeePercent, SendConfig, SendMode};

/// Environment fallback for `--wif`. Kept apart from the network's WIF
/// version-byte override, whose malformed values are logged.
pub const ENV_SECRET_WIF: &str = "FAIRBRIX_SECRET_WIF";

/// Send Fairbrix from a single key.
#[derive(Parser, Debug)]
#[command(name = "fbx-send", version, propagate_version = true)]
pub struct FbxCli {
    #[command(flatten)]
    pub node: NodeArgs,

    /// Log output format.
    #[arg(long, global = true, env = "FAIRBRIX_LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build, sign and broadcast a payment.
    Send(SendArgs),
    /// Show the fee split for an amount without touching the node.
    Quote(QuoteArgs),
    /// Print the address a secret key controls.
    Address(AddressArgs),
}

#[derive(Args, Debug)]
pub struct NodeArgs {
    /// JSON-RPC endpoint of the node.
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// RPC basic-auth user.
    #[arg(long, global = true)]
    pub rpc_user: Option<String>,

    /// RPC basic-auth password.
    #[arg(long, global = true)]
    pub rpc_pass: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct FeeArgs {
    /// Platform fee as a decimal percentage, e.g. `1` or `0.25`.
    #[arg(long)]
    pub fee_percent: Option<String>,

    /// Platform fee recipient. Without one no platform fee is charged.
    #[arg(long)]
    pub fee_address: Option<String>,

    /// Flat miner fee in satoshis.
    #[arg(long)]
    pub miner_fee: Option<u64>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Recipient address.
    pub destination: String,

    /// Amount in coins, e.g. `1.5`.
    pub amount: String,

    /// WIF secret of the sending key.
    #[arg(long, env = ENV_SECRET_WIF, hide_env_values = true)]
    pub wif: Option<String>,

    /// Let the node pay from its own wallet instead of signing locally.
    #[arg(long)]
    pub node_wallet: bool,

    #[command(flatten)]
    pub fees: FeeArgs,
}

#[derive(Args, Debug)]
pub struct QuoteArgs {
    /// Amount in coins.
    pub amount: String,

    /// Value of the funding output in coins; prints the change as well.
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub fees: FeeArgs,
}

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// WIF secret.
    #[arg(long, env = ENV_SECRET_WIF, hide_env_values = true)]
    pub wif: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl NodeArgs {
    pub fn apply(&self, config: &mut SendConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc.url = url.clone();
        }
        if let Some(user) = &self.rpc_user {
            config.rpc.user = Some(user.clone());
        }
        if let Some(pass) = &self.rpc_pass {
            config.rpc.password = Some(pass.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.rpc.timeout = Some(std::time::Duration::from_secs(secs));
        }
    }
}

impl FeeArgs {
    pub fn apply(&self, config: &mut SendConfig) -> anyhow::Result<()> {
        if let Some(raw) = &self.fee_percent {
            config.fee_percent = FeePercent::parse(raw)
                .ok_or_else(|| anyhow::anyhow!("--fee-percent {:?} is not a number", raw))?;
        }
        if let Some(raw) = &self.fee_address {
            let address = Address::from_string(raw, &config.network)
                .map_err(|e| anyhow::anyhow!("--fee-address {:?}: {}", raw, e))?;
            config.fee_address = Some(address);
        }
        if let Some(sats) = self.miner_fee {
            config.miner_fee_sats = sats;
        }
        Ok(())
    }
}

impl SendArgs {
    pub fn apply(&self, config: &mut SendConfig) -> anyhow::Result<()> {
        if self.node_wallet {
            config.mode = SendMode::NodeWallet;
        }
        self.fees.apply(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::collections::HashMap;
    use std::ffi::OsStr;
    use std::io;
    use std::sync::{Arc, Mutex};

    const WIF: &str = "ZzJcVzMc3HJfJPxJKu29Xp6cVtoUAKU7JWv4nJG7Vi4ioKPGkf8n";

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_command_definition_is_valid() {
        FbxCli::command().debug_assert();
    }

    #[test]
    fn test_send_flags_override_config() {
        let cli = FbxCli::try_parse_from([
            "fbx-send",
            "--rpc-url",
            "http://127.0.0.1:8645",
            "send",
            "fQna6UCypCszqVSDYdkbtmGiv2vAYP9zmo",
            "1.5",
            "--wif",
            "secret",
            "--fee-percent",
            "0.5",
            "--fee-address",
            "fQna6UCypCszqVSDYdkbtmGiv2vAYP9zmo",
            "--miner-fee",
            "2000",
        ])
        .unwrap();

        let mut config = SendConfig::default();
        cli.node.apply(&mut config);
        let Commands::Send(args) = &cli.command else {
            panic!("expected send");
        };
        args.apply(&mut config).unwrap();

        assert_eq!(config.rpc.url, "http://127.0.0.1:8645");
        assert_eq!(config.fee_percent, FeePercent::parse("0.5").unwrap());
        assert!(config.platform_fee_enabled());
        assert_eq!(config.miner_fee_sats, 2000);
        assert_eq!(config.mode, SendMode::ClientSigned);
        assert_eq!(args.amount, "1.5");
    }

    #[test]
    fn test_foreign_fee_address_is_an_error() {
        let cli = FbxCli::try_parse_from([
            "fbx-send",
            "quote",
            "1",
            "--fee-address",
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH",
        ])
        .unwrap();
        let Commands::Quote(args) = &cli.command else {
            panic!("expected quote");
        };
        assert!(args.fees.apply(&mut SendConfig::default()).is_err());
    }

    #[test]
    fn test_node_wallet_flag() {
        let cli = FbxCli::try_parse_from(["fbx-send", "send", "addr", "1", "--node-wallet"]).unwrap();
        let Commands::Send(args) = &cli.command else {
            panic!("expected send");
        };
        let mut config = SendConfig::default();
        args.apply(&mut config).unwrap();
        assert_eq!(config.mode, SendMode::NodeWallet);
    }

    #[test]
    fn test_secret_env_is_not_a_network_override() {
        assert_ne!(ENV_SECRET_WIF, fbx_script::network::ENV_WIF);

        let command = FbxCli::command();
        for name in ["send", "address"] {
            let sub = command.find_subcommand(name).unwrap();
            let wif = sub.get_arguments().find(|a| a.get_id() == "wif").unwrap();
            assert_eq!(wif.get_env(), Some(OsStr::new(ENV_SECRET_WIF)));
        }
    }

    #[test]
    fn test_secret_in_environment_stays_out_of_logs() {
        let env: HashMap<&str, &str> = [
            (ENV_SECRET_WIF, WIF),
            (fbx_script::network::ENV_PUB_KEY_HASH, "not-a-byte"),
        ]
        .into_iter()
        .collect();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        let config = tracing::subscriber::with_default(subscriber, || {
            SendConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
        });

        let logged = logs.text();
        assert!(logged.contains("ignoring malformed network override"));
        assert!(!logged.contains(WIF));
        assert_eq!(config.network.wif, 0xdf);
    }
}
