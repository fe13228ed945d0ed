//! Periodic aggregator: drains one reading per source each cycle and
//! emits the cross-source aggregate.
//!
//! The aggregator never calls the controller itself — aggregates go
//! out over a channel so that a slow forward attempt can only delay
//! that one delivery, never the next cycle's buffer pops.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use marsgate_core::{AggregateRecord, LogEvent, aggregate};

use crate::registry::GatewayRegistry;

/// Default aggregation period, matching the original one-second cadence.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Periodic fan-in over all registered source buffers.
pub struct Aggregator {
    registry: Arc<GatewayRegistry>,
    period: Duration,
    agg_tx: mpsc::UnboundedSender<AggregateRecord>,
    log_tx: mpsc::UnboundedSender<LogEvent>,
    cancel: CancellationToken,
}

impl Aggregator {
    pub fn new(
        registry: Arc<GatewayRegistry>,
        period: Duration,
        agg_tx: mpsc::UnboundedSender<AggregateRecord>,
        log_tx: mpsc::UnboundedSender<LogEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            period,
            agg_tx,
            log_tx,
            cancel,
        }
    }

    /// Run one aggregation cycle.
    ///
    /// Pops at most one reading from every registered slot (empty
    /// buffers are skipped, not errors), computes the aggregate over
    /// whatever subset had data, and emits it to the forward and log
    /// channels. Returns the record for test observation, or `None`
    /// when the cycle was skipped.
    pub async fn tick(&self) -> Option<AggregateRecord> {
        let slots = self.registry.slots().await;
        let registered = slots.len();

        let mut popped = Vec::with_capacity(registered);
        for slot in &slots {
            if let Some(reading) = slot.pop().await {
                popped.push(reading);
            }
        }

        let record = aggregate(&popped, registered)?;
        tracing::debug!(
            responders = popped.len(),
            registered,
            temperature = record.temperature,
            radiation = record.radiation,
            solar_flare = record.solar_flare,
            "aggregation cycle"
        );

        // Receivers living shorter than the aggregator only happens on
        // shutdown; a dropped aggregate at that point is not an error.
        if self.agg_tx.send(record.clone()).is_err() {
            tracing::warn!("forward channel closed, aggregate dropped");
        }
        if self.log_tx.send(LogEvent::Aggregate(record.clone())).is_err() {
            tracing::warn!("event log channel closed, aggregate not logged");
        }

        Some(record)
    }

    /// Run cycles on a fixed timer until cancelled.
    pub async fn run(self) {
        let mut ticker = interval(self.period);
        // The first tick of a tokio interval fires immediately;
        // consume it so the first real cycle happens one period in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = self.cancel.cancelled() => {
                    tracing::info!("aggregator: cancellation requested, shutting down");
                    break;
                }
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
