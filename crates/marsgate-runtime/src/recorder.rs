//! Event-log recorder: appends one JSON line per event to the log
//! file. Write failures are diagnostics only and never reach the
//! producers.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use marsgate_core::LogEvent;

pub struct Recorder {
    writer: std::fs::File,
    rx: mpsc::UnboundedReceiver<LogEvent>,
    cancel: CancellationToken,
}

impl Recorder {
    /// Open the log file for appending.
    pub fn new(
        path: &Path,
        rx: mpsc::UnboundedReceiver<LogEvent>,
        cancel: CancellationToken,
    ) -> std::io::Result<Self> {
        let writer = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { writer, rx, cancel })
    }

    /// Run the recorder. Writes one JSON line per event until cancelled
    /// or all producers are gone. On cancellation, whatever is already
    /// queued is flushed before exiting.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                event = self.rx.recv() => {
                    match event {
                        Some(event) => self.write_line(&event),
                        None => {
                            tracing::info!("recorder: all producers gone, stopping");
                            break;
                        }
                    }
                }
                _ = self.cancel.cancelled() => {
                    while let Ok(event) = self.rx.try_recv() {
                        self.write_line(&event);
                    }
                    tracing::info!("recorder: cancellation requested, shutting down");
                    break;
                }
            }
        }
    }

    fn write_line(&mut self, event: &LogEvent) {
        match serde_json::to_string(event) {
            Ok(line) => {
                if let Err(e) = writeln!(self.writer, "{line}") {
                    tracing::error!("recorder write failed: {e}");
                }
                if let Err(e) = self.writer.flush() {
                    tracing::error!("recorder flush failed: {e}");
                }
            }
            Err(e) => {
                tracing::error!("recorder serialization failed: {e}");
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
