use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use sma_signal::config::{Config, LoggingConfig, DEFAULT_CONFIG_PATH};
use sma_signal::model::signal::Mode;
use sma_signal::runner::{RunOutcome, SignalRunner};

#[derive(Debug, Parser)]
#[command(
    name = "sma-signal",
    version,
    about = "Check an SMA200 buy-dip or sell-stop rule and notify a webhook when it fires"
)]
struct Cli {
    /// Which rule to evaluate.
    #[arg(long, value_enum)]
    mode: Mode,
    /// Path to the TOML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Evaluate and log the payload without calling the webhook.
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!(
                "Make sure TRADIER_TOKEN and the webhook URLs are set in .env or the environment"
            );
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);

    let runner = match SignalRunner::from_config(&config, cli.mode, cli.dry_run) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Failed to start signal runner");
            std::process::exit(1);
        }
    };

    tracing::info!(
        mode = %cli.mode,
        symbol = %config.symbol(),
        dry_run = cli.dry_run,
        "Starting sma-signal"
    );

    // Fetch and webhook failures are reported in the log only; the scheduler
    // always sees a clean exit.
    let outcome = runner.run().await;
    match &outcome {
        RunOutcome::Notified { status, .. } => tracing::info!(status, "Run complete"),
        RunOutcome::MarketClosed(status) => {
            tracing::debug!(reason = status.reason(), "Run complete")
        }
        other => tracing::info!(outcome = ?other, "Run complete"),
    }
    Ok(())
}
