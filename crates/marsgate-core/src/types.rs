use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Source Identity ──────────────────────────────────────────────

/// Stable ordinal label for one sensor source.
///
/// Assigned by the registry at registration time, in establishment
/// order: the first connection is 0, the second 1, and so on. Dense,
/// unique, and immutable for the lifetime of the process. Used purely
/// as a label, never for addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Reading ──────────────────────────────────────────────────────

/// One decoded telemetry sample from a sensor stream.
///
/// Wire form is a JSON object with `stamp`, `temperature`,
/// `radiation`, and `solarFlare` fields. Anything else is a decode
/// error. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub stamp: DateTime<Utc>,
    pub temperature: f64,
    pub radiation: f64,
    pub solar_flare: bool,
}

// ─── Aggregate Record ─────────────────────────────────────────────

/// Cross-source aggregate computed once per aggregation cycle.
///
/// Never mutated after construction; forwarded and logged as one
/// unit. `radiation` is the arithmetic mean truncated toward zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    pub temperature: f64,
    pub radiation: i64,
    pub solar_flare: bool,
}

// ─── Event Log ────────────────────────────────────────────────────

/// One entry in the append-only event log.
///
/// Serialized as one JSON object per line with a boolean `average`
/// discriminator:
///
/// ```text
/// {"average":false,"data":{"sensor":0,"data":{...reading...}}}
/// {"average":true,"data":{...aggregate...}}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    /// A raw per-source reading, tagged with the originating source.
    Raw { source: SourceId, reading: Reading },
    /// A per-cycle aggregate.
    Aggregate(AggregateRecord),
}

#[derive(Serialize, Deserialize)]
struct LogLine {
    average: bool,
    data: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
struct RawPayload {
    sensor: SourceId,
    data: Reading,
}

impl Serialize for LogEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let line = match self {
            LogEvent::Raw { source, reading } => LogLine {
                average: false,
                data: serde_json::to_value(RawPayload {
                    sensor: *source,
                    data: reading.clone(),
                })
                .map_err(serde::ser::Error::custom)?,
            },
            LogEvent::Aggregate(record) => LogLine {
                average: true,
                data: serde_json::to_value(record).map_err(serde::ser::Error::custom)?,
            },
        };
        line.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LogEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let line = LogLine::deserialize(deserializer)?;
        if line.average {
            let record: AggregateRecord =
                serde_json::from_value(line.data).map_err(D::Error::custom)?;
            Ok(LogEvent::Aggregate(record))
        } else {
            let payload: RawPayload =
                serde_json::from_value(line.data).map_err(D::Error::custom)?;
            Ok(LogEvent::Raw {
                source: payload.sensor,
                reading: payload.data,
            })
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
