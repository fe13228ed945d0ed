//! Sensor connection task: websocket client, frame decoding, buffer
//! appends, and lifecycle reporting.

use std::ops::ControlFlow;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use marsgate_core::{LogEvent, Reading};
use marsgate_gateway::SourceSlot;

use crate::error::SensorError;

/// Decode one inbound text frame into a [`Reading`].
///
/// The frame must be a JSON object carrying `stamp`, `temperature`,
/// `radiation`, and `solarFlare`; anything else is a decode error.
pub fn decode_reading(text: &str) -> Result<Reading, SensorError> {
    Ok(serde_json::from_str(text)?)
}

/// One long-lived connection to a single sensor stream.
///
/// The identity in `slot` was assigned at registration, before this
/// task started. The task owns the only write end of the slot's
/// buffer.
pub struct SensorConnection {
    url: String,
    slot: Arc<SourceSlot>,
    log_tx: mpsc::UnboundedSender<LogEvent>,
    cancel: CancellationToken,
}

impl SensorConnection {
    pub fn new(
        url: String,
        slot: Arc<SourceSlot>,
        log_tx: mpsc::UnboundedSender<LogEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            url,
            slot,
            log_tx,
            cancel,
        }
    }

    /// Run the connection until close, stream failure, or shutdown.
    ///
    /// Every failure is recovered locally: it is logged, the source is
    /// marked inactive for future aggregation cycles, and the task
    /// ends. Other sources and the aggregator keep running; the slot's
    /// remaining backlog is still drained normally.
    pub async fn run(self) {
        let id = self.slot.id();
        match self.drive().await {
            Ok(()) => {
                tracing::info!(source = %id, url = %self.url, "sensor connection closed");
            }
            Err(SensorError::Connect(e)) => {
                tracing::error!(source = %id, url = %self.url, error = %e, "could not connect to sensor");
            }
            Err(e) => {
                tracing::error!(source = %id, url = %self.url, error = %e, "sensor connection failed");
            }
        }
        self.slot.mark_inactive();
    }

    async fn drive(&self) -> Result<(), SensorError> {
        let (mut ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(SensorError::Connect)?;
        tracing::info!(source = %self.slot.id(), url = %self.url, "sensor connected");

        loop {
            tokio::select! {
                frame = ws.next() => {
                    match frame {
                        Some(Ok(message)) => {
                            if self.handle_frame(message).await.is_break() {
                                return Ok(());
                            }
                        }
                        Some(Err(e)) => return Err(SensorError::Stream(e)),
                        None => return Ok(()),
                    }
                }
                _ = self.cancel.cancelled() => {
                    // Best-effort close; the peer may already be gone.
                    let _ = ws.close(None).await;
                    return Ok(());
                }
            }
        }
    }

    /// Process one inbound frame. Break means the peer closed.
    async fn handle_frame(&self, message: Message) -> ControlFlow<()> {
        match message {
            Message::Text(text) => {
                match decode_reading(&text) {
                    Ok(reading) => self.ingest(reading).await,
                    Err(e) => {
                        // Log and discard; the connection stays open.
                        tracing::warn!(
                            source = %self.slot.id(),
                            error = %e,
                            "malformed sensor frame discarded"
                        );
                    }
                }
                ControlFlow::Continue(())
            }
            Message::Close(_) => ControlFlow::Break(()),
            // Pings are answered by the library; binary frames are not
            // part of the sensor protocol.
            _ => ControlFlow::Continue(()),
        }
    }

    async fn ingest(&self, reading: Reading) {
        self.slot.push(reading.clone()).await;
        let event = LogEvent::Raw {
            source: self.slot.id(),
            reading,
        };
        // Logging must never fail the producing operation.
        if self.log_tx.send(event).is_err() {
            tracing::warn!(source = %self.slot.id(), "event log channel closed, raw entry dropped");
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── 1. decode_valid_frame ───────────────────────────────────────

    #[test]
    fn decode_valid_frame() {
        let reading = decode_reading(
            r#"{"stamp":"2026-03-14T09:26:53Z","temperature":-12.5,"radiation":8.25,"solarFlare":true}"#,
        )
        .expect("valid frame");
        assert_eq!(reading.temperature, -12.5);
        assert_eq!(reading.radiation, 8.25);
        assert!(reading.solar_flare);
    }

    // ── 2. decode_reports_typed_error ───────────────────────────────

    #[test]
    fn decode_reports_typed_error() {
        let err = decode_reading("not json at all").unwrap_err();
        assert!(matches!(err, SensorError::Decode(_)));

        let err = decode_reading(r#"{"temperature": 1.0}"#).unwrap_err();
        assert!(matches!(err, SensorError::Decode(_)));
    }
}
