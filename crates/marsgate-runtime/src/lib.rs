//! marsgate-runtime: wires sensors, aggregator, forwarder, and the
//! event-log recorder into one process with coordinated shutdown.

pub mod app;
pub mod cli;
pub mod recorder;
