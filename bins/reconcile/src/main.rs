//! Paydesk scenario runner
//!
//! Replays a recorded payment dialog through the reconciliation engine and
//! prints the derived summary, the payloads and the save outcome as JSON.
//!
//! Usage: paydesk --scenario demos/overpaid_sale.json --auto-allocate --pretty

mod scenario;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use paydesk_shared::AppConfig;
use scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "paydesk")]
#[command(about = "Replay a payment scenario through the reconciliation engine")]
struct Cli {
    /// Scenario file (also read from `PAYDESK_SCENARIO`).
    #[arg(long, env = "PAYDESK_SCENARIO")]
    scenario: PathBuf,

    /// Spread any overpayment over open debts, oldest first.
    #[arg(long)]
    auto_allocate: bool,

    /// Pretty-print the report.
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let raw = std::fs::read_to_string(&cli.scenario)
        .with_context(|| format!("failed to read scenario {}", cli.scenario.display()))?;
    let scenario = Scenario::from_json(&raw)
        .with_context(|| format!("invalid scenario {}", cli.scenario.display()))?;

    let report = scenario::run(scenario, cli.auto_allocate, &config);

    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{output}");

    Ok(())
}
