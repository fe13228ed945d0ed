//! marsgate-gateway: per-source buffering and the periodic aggregator.
//!
//! The registry owns one slot per sensor connection; the aggregator
//! drains at most one reading per slot each cycle and emits the
//! cross-source aggregate downstream.

pub mod aggregator;
pub mod registry;

pub use aggregator::Aggregator;
pub use registry::{GatewayRegistry, SourceSlot};
