use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};
use optimism_infinite_trading::{
    chain::{Chain, QueryContext},
    config::{ConfigOverrides, RunnerConfig},
    rpc::RpcChainReader,
    InfiniteTrading, METHODOLOGY,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Compute Infinite Trading TVL for one valuation cycle")]
struct Args {
    /// YAML file with `rpc_url`, `chain` and `block`
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the node to read from
    #[arg(long)]
    rpc_url: Option<String>,

    /// Network to value (only optimism produces non-zero figures)
    #[arg(long)]
    chain: Option<Chain>,

    /// Block number to read at, defaults to latest
    #[arg(long)]
    block: Option<u64>,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();

    let overrides = ConfigOverrides { rpc_url: args.rpc_url, chain: args.chain, block: args.block };
    let config = RunnerConfig::load(args.config.as_deref(), overrides)
        .wrap_err("Failed to load runner configuration")?;

    let adapter = InfiniteTrading::optimism().wrap_err("Invalid address book")?;
    let reader = RpcChainReader::new(&config.rpc_url, config.block)
        .wrap_err("Failed to create RPC client")?;
    let ctx = QueryContext::new(config.chain, &reader);

    info!("Valuing Infinite Trading on {} (block {:?})", config.chain, config.block);
    let report = adapter
        .run_cycle(&ctx)
        .await
        .wrap_err("Valuation cycle failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
        println!("{json}");
    } else {
        println!("{METHODOLOGY}\n");
        println!("chain:   {}", report.chain);
        println!("tvl:     ${:.2}", report.tvl);
        println!("staking: ${:.2}", report.staking);
    }

    Ok(())
}
