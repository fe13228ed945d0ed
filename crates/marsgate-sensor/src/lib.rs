//! marsgate-sensor: one long-lived websocket connection per sensor.
//!
//! Each connection task decodes inbound frames into readings, appends
//! them to its source's buffer, and reports lifecycle events. No
//! failure on one sensor ever affects another.

pub mod connection;
pub mod error;

pub use connection::{SensorConnection, decode_reading};
pub use error::SensorError;
