//! CLI definition using clap derive.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "marsgate", about = "telemetry aggregation gateway")]
pub struct Cli {
    /// Controller readings URL, e.g. http://localhost:8080/api/readings
    pub controller_url: String,

    /// Administrative credential sent with every forwarded aggregate
    pub admin_pass: String,

    /// Sensor websocket endpoints, e.g. ws://localhost:8080/ws
    #[arg(required = true, num_args = 1..)]
    pub sensors: Vec<String>,

    /// Aggregation period in milliseconds
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,

    /// Delay before the first aggregation cycle, letting connections
    /// establish, in milliseconds
    #[arg(long, default_value = "5000")]
    pub settle_ms: u64,

    /// Append-only event log path (one JSON object per line)
    #[arg(long, default_value = "gateway.log")]
    pub log_file: PathBuf,
}
