//! Gateway process wiring: registry, sensor tasks, aggregator,
//! forward dispatch, and the recorder, all tracked in one `JoinSet`
//! and stopped through one cancellation token.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use marsgate_forward::Forwarder;
use marsgate_gateway::{Aggregator, GatewayRegistry};
use marsgate_sensor::SensorConnection;

use crate::cli::Cli;
use crate::recorder::Recorder;

/// Everything the gateway process needs to run.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub controller_url: String,
    pub admin_pass: String,
    pub sensors: Vec<String>,
    pub interval: Duration,
    pub settle: Duration,
    pub log_file: PathBuf,
}

impl From<Cli> for GatewayConfig {
    fn from(cli: Cli) -> Self {
        Self {
            controller_url: cli.controller_url,
            admin_pass: cli.admin_pass,
            sensors: cli.sensors,
            interval: Duration::from_millis(cli.interval_ms),
            settle: Duration::from_millis(cli.settle_ms),
            log_file: cli.log_file,
        }
    }
}

/// Run the gateway until `cancel` fires, then join every spawned task.
///
/// Identity assignment happens here, once per sensor, in the order
/// the connections are established; the ids are stable labels for the
/// lifetime of the process.
pub async fn run(config: GatewayConfig, cancel: CancellationToken) -> anyhow::Result<()> {
    let registry = Arc::new(GatewayRegistry::new());
    let forwarder = Forwarder::new(config.controller_url.clone(), config.admin_pass.clone())?;

    let (log_tx, log_rx) = mpsc::unbounded_channel();
    let (agg_tx, mut agg_rx) = mpsc::unbounded_channel();

    let mut tasks = JoinSet::new();

    let recorder = Recorder::new(&config.log_file, log_rx, cancel.clone())?;
    tasks.spawn(recorder.run());

    // One connection task per sensor, registered in argument order.
    for url in &config.sensors {
        let slot = registry.register().await;
        tracing::info!(source = %slot.id(), url = %url, "sensor registered");
        let connection =
            SensorConnection::new(url.clone(), slot, log_tx.clone(), cancel.clone());
        tasks.spawn(connection.run());
    }

    // Aggregator: waits out the settle window, then cycles on the
    // configured period.
    {
        let aggregator = Aggregator::new(
            Arc::clone(&registry),
            config.interval,
            agg_tx,
            log_tx,
            cancel.clone(),
        );
        let cancel = cancel.clone();
        let settle = config.settle;
        tasks.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(settle) => aggregator.run().await,
                _ = cancel.cancelled() => {}
            }
        });
    }

    // Forward dispatch: one spawned task per aggregate so a slow
    // controller delays only that delivery, never the next cycle.
    {
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let mut inflight = JoinSet::new();
            loop {
                tokio::select! {
                    record = agg_rx.recv() => {
                        match record {
                            Some(record) => {
                                let forwarder = forwarder.clone();
                                inflight.spawn(async move {
                                    forwarder.forward_logged(record).await;
                                });
                            }
                            None => break,
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
                // Reap finished attempts without waiting on slow ones.
                while inflight.try_join_next().is_some() {}
            }
            // In-flight attempts complete or hit their own timeout.
            while inflight.join_next().await.is_some() {}
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "gateway task panicked");
        }
    }
    tracing::info!("all gateway tasks joined");
    Ok(())
}
