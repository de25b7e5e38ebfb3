//! perpliq keeper - entry point

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use perpliq_telemetry::Metrics;
use tracing::{info, warn};

/// Run liquidation and ADL jobs against a perpliq venue
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PERPLIQ_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Validate the configuration and list jobs without executing them
    #[arg(long)]
    dry_run: bool,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    perpliq_telemetry::init_logging()?;

    info!("Starting perpliq keeper v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > PERPLIQ_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("PERPLIQ_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = perpliq_keeper::KeeperConfig::from_file(&config_path)?;
    let keeper = perpliq_keeper::Keeper::new(&config)?;

    if args.dry_run {
        for job in keeper.jobs() {
            info!(
                job = %job.name,
                operation = job.operation.as_str(),
                position = %job.position,
                tokens = job.prices.len(),
                "Planned job"
            );
        }
        println!(
            "{}",
            serde_json::json!({ "dry_run": true, "jobs": keeper.jobs().len() })
        );
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
                shutdown.store(true, Ordering::SeqCst);
            }
        });
    }

    let summary = keeper.run(shutdown).await?;
    if summary.aborted() > 0 {
        warn!(aborted = summary.aborted(), "Some jobs were aborted");
    }
    info!(
        executed = summary.executed(),
        aborted = summary.aborted(),
        skipped = summary.skipped,
        "Run complete"
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);
    if args.metrics {
        print!("{}", Metrics::render()?);
    }

    Ok(())
}
