//! marsgate: telemetry aggregation gateway binary.
//!
//! Connects to every sensor stream given on the command line, buffers
//! readings per source, aggregates once per period, and forwards the
//! result to the controller. Runs until interrupted.

use clap::Parser;
use tokio_util::sync::CancellationToken;

use marsgate_runtime::{app, cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let filter = std::env::var("MARSGATE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    tracing::info!(
        controller = %args.controller_url,
        sensors = args.sensors.len(),
        "marsgate starting"
    );

    let cancel = CancellationToken::new();
    let gateway = tokio::spawn(app::run(args.into(), cancel.clone()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, shutting down");
    cancel.cancel();
    gateway.await??;

    Ok(())
}
