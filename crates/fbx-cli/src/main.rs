//! `fbx-send` binary.
//!
//! Reads `FAIRBRIX_*` configuration from the environment, applies any
//! command-line overrides, and runs a single send, fee quote or address
//! lookup. The txid of a successful send is the only line written to
//! stdout.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;

use fbx_primitives::amount::{format_coins, parse_coins};
use fbx_rpc::RpcClient;
use fbx_send::amount::parse_amount;
use fbx_send::{fee, FeeBreakdown, KeyMaterial, SendConfig, SendFlow, SendMode, SendRequest};

use cli::{AddressArgs, Commands, FbxCli, QuoteArgs, SendArgs, ENV_SECRET_WIF};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = FbxCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.log_format);

    let mut config = SendConfig::from_env();
    cli.node.apply(&mut config);

    match cli.command {
        Commands::Send(args) => run_send(config, args).await,
        Commands::Quote(args) => run_quote(config, args),
        Commands::Address(args) => run_address(&config, args),
    }
}

async fn run_send(mut config: SendConfig, args: SendArgs) -> Result<()> {
    args.apply(&mut config)?;

    let mut request = SendRequest::new(args.destination, args.amount);
    match (config.mode, args.wif) {
        (SendMode::ClientSigned, None) => {
            bail!("a WIF secret is required; pass --wif or set {}", ENV_SECRET_WIF)
        }
        (SendMode::ClientSigned, Some(wif)) => request = request.with_secret(wif),
        (SendMode::NodeWallet, _) => {}
    }

    tracing::info!(
        rpc = %config.rpc.url,
        mode = ?config.mode,
        fee_percent = %config.fee_percent,
        platform_fee = config.platform_fee_enabled(),
        miner_fee = config.miner_fee_sats,
        "starting send"
    );

    let client = RpcClient::new(config.rpc.clone()).context("failed to set up the RPC client")?;
    let outcome = SendFlow::new(&config, &client).run(&request).await;
    tracing::debug!(history = ?outcome.history, "flow finished");

    let receipt = outcome.result.context("send failed")?;
    if let Some(breakdown) = &receipt.breakdown {
        log_breakdown(breakdown);
    }
    println!("{}", receipt.txid);
    Ok(())
}

fn run_quote(mut config: SendConfig, args: QuoteArgs) -> Result<()> {
    args.fees.apply(&mut config)?;
    let payment = parse_amount(&args.amount)?;
    let quote = fee::split(
        payment,
        config.fee_percent,
        config.fee_address.is_some(),
        config.miner_fee_sats,
    )?;

    println!("payment       {}", format_coins(quote.payment));
    println!("platform fee  {}", format_coins(quote.platform_fee));
    println!("miner fee     {}", format_coins(quote.miner_fee));
    println!("required      {}", format_coins(quote.required_total));

    if let Some(input) = &args.input {
        let input = parse_coins(input).with_context(|| format!("--input {:?}", input))?;
        let breakdown = quote.settle(input)?;
        println!("change        {}", format_coins(breakdown.change));
    }
    Ok(())
}

fn run_address(config: &SendConfig, args: AddressArgs) -> Result<()> {
    let key = KeyMaterial::decode(&args.wif, &config.network)?;
    println!("{}", key.address());
    tracing::info!(compressed = key.compressed(), "decoded secret");
    Ok(())
}

fn log_breakdown(breakdown: &FeeBreakdown) {
    tracing::info!(
        payment = %format_coins(breakdown.payment),
        platform_fee = %format_coins(breakdown.platform_fee),
        miner_fee = %format_coins(breakdown.miner_fee),
        change = %format_coins(breakdown.change),
        "fee breakdown"
    );
}
