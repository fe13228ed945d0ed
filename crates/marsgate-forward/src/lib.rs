//! marsgate-forward: delivers aggregates to the downstream controller.
//!
//! One authenticated POST per aggregate, classified into accepted /
//! rejected / unknown failure. Every outcome is non-fatal to the
//! gateway; a failed attempt is simply logged and the next cycle's
//! aggregate gets its own attempt.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use marsgate_core::AggregateRecord;

/// Header carrying the administrative credential, as expected by the
/// controller's readings endpoint.
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Default per-request timeout. Bounds how long one forward attempt
/// can stay in flight; it never delays ingestion or the next cycle.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Errors ───────────────────────────────────────────────────────

/// Forward outcomes other than acceptance.
///
/// All recovered locally: the aggregate is dropped, the cycle
/// continues, the gateway does not crash. No retry of the same
/// aggregate is attempted.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Controller signalled a client-side problem (HTTP 400).
    #[error("controller rejected the aggregate")]
    Rejected,

    /// Controller answered with anything other than 200 or 400.
    #[error("unknown controller response: status {0}")]
    UnknownStatus(StatusCode),

    /// No usable response at all (connect failure, timeout, ...).
    #[error("forward transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

// ─── Forwarder ────────────────────────────────────────────────────

/// HTTP client for the controller's readings endpoint.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    controller_url: String,
    admin_token: String,
}

impl Forwarder {
    pub fn new(controller_url: String, admin_token: String) -> Result<Self, ForwardError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            controller_url,
            admin_token,
        })
    }

    /// Send one aggregate to the controller.
    ///
    /// Status mapping: 200 → accepted, 400 → [`ForwardError::Rejected`],
    /// anything else → [`ForwardError::UnknownStatus`]. Transport
    /// failures map to [`ForwardError::Transport`].
    pub async fn forward(&self, record: &AggregateRecord) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(&self.controller_url)
            .header(AUTH_HEADER, &self.admin_token)
            .json(record)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::BAD_REQUEST => Err(ForwardError::Rejected),
            other => Err(ForwardError::UnknownStatus(other)),
        }
    }

    /// Forward and log the outcome; never returns an error.
    ///
    /// This is the body of the per-aggregate task the runtime spawns.
    pub async fn forward_logged(&self, record: AggregateRecord) {
        match self.forward(&record).await {
            Ok(()) => {
                tracing::debug!(
                    temperature = record.temperature,
                    radiation = record.radiation,
                    solar_flare = record.solar_flare,
                    "aggregate accepted by controller"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "aggregate not delivered");
            }
        }
    }
}
