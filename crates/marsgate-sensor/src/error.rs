//! Error types for sensor stream handling.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failures a sensor connection can report.
///
/// All of these are recovered locally: a decode error discards one
/// frame, a connect/stream error retires one source. None of them are
/// allowed to take the gateway down.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("could not connect to sensor stream: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("sensor stream failed: {0}")]
    Stream(#[source] tungstenite::Error),

    #[error("malformed sensor frame: {0}")]
    Decode(#[from] serde_json::Error),
}
