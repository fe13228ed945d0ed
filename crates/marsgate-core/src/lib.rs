//! marsgate-core: shared types for the telemetry aggregation gateway.
//!
//! Pure data definitions and the per-cycle aggregation function.
//! No IO and no async — everything here is deterministic and unit-testable.

pub mod aggregate;
pub mod types;

pub use aggregate::aggregate;
pub use types::{AggregateRecord, LogEvent, Reading, SourceId};
