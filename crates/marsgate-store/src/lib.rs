//! marsgate-store: the storage collaborator's interface.
//!
//! The gateway core only emits records; persistence is owned by a
//! collaborator exposing insert/find/find_all/drop_all over typed JSON
//! records. This crate defines that seam and ships an in-memory
//! implementation for tests and single-process deployments. The
//! deployed controller keeps three collections: game data, sensor
//! data, and log data.

use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Record Store ─────────────────────────────────────────────────

/// Identifier returned by an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

/// Storage collaborator seam.
///
/// `find` uses subset semantics: a record matches when every key of
/// the query object is present in the record with an equal value.
pub trait RecordStore {
    fn insert(&self, record: Value) -> RecordId;
    fn find(&self, query: &Value) -> Vec<Value>;
    fn find_all(&self) -> Vec<Value>;
    fn drop_all(&self);

    /// Records whose `readings.radiation` and `readings.temperature`
    /// strictly exceed the given values and whose
    /// `readings.solarFlare` equals `flare`.
    fn find_above_thresholds(&self, radiation: f64, temperature: f64, flare: bool) -> Vec<Value> {
        self.find_all()
            .into_iter()
            .filter(|record| {
                let readings = &record["readings"];
                readings["radiation"].as_f64().is_some_and(|r| r > radiation)
                    && readings["temperature"].as_f64().is_some_and(|t| t > temperature)
                    && readings["solarFlare"].as_bool() == Some(flare)
            })
            .collect()
    }
}

// ─── In-memory implementation ─────────────────────────────────────

/// In-memory record store, insertion-ordered.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: AtomicU64,
    records: Mutex<Vec<(RecordId, Value)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, Vec<(RecordId, Value)>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches(record: &Value, query: &Value) -> bool {
    match query.as_object() {
        Some(fields) => fields.iter().all(|(key, want)| &record[key] == want),
        // Non-object queries match nothing.
        None => false,
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, record: Value) -> RecordId {
        let id = RecordId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.records().push((id, record));
        id
    }

    fn find(&self, query: &Value) -> Vec<Value> {
        self.records()
            .iter()
            .filter(|(_, record)| matches(record, query))
            .map(|(_, record)| record.clone())
            .collect()
    }

    fn find_all(&self) -> Vec<Value> {
        self.records()
            .iter()
            .map(|(_, record)| record.clone())
            .collect()
    }

    fn drop_all(&self) {
        self.records().clear();
    }
}

// ─── Collections ──────────────────────────────────────────────────

/// The collaborator's three collections.
#[derive(Debug, Default)]
pub struct Collections {
    pub game: MemoryStore,
    pub sensor: MemoryStore,
    pub log: MemoryStore,
}

impl Collections {
    pub fn new() -> Self {
        Self::default()
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── 1. insert_assigns_increasing_ids ────────────────────────────

    #[test]
    fn insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.insert(json!({"n": 1}));
        let b = store.insert(json!({"n": 2}));
        assert_eq!(a, RecordId(0));
        assert_eq!(b, RecordId(1));
        assert_eq!(store.find_all().len(), 2);
    }

    // ── 2. find_uses_subset_matching ────────────────────────────────

    #[test]
    fn find_uses_subset_matching() {
        let store = MemoryStore::new();
        store.insert(json!({"kind": "sensor", "n": 1}));
        store.insert(json!({"kind": "game", "n": 2}));
        store.insert(json!({"kind": "sensor", "n": 3}));

        let hits = store.find(&json!({"kind": "sensor"}));
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r["kind"] == "sensor"));

        assert!(store.find(&json!({"kind": "nope"})).is_empty());
        assert!(store.find(&json!("not-an-object")).is_empty());
    }

    // ── 3. drop_all_empties_one_collection_only ─────────────────────

    #[test]
    fn drop_all_empties_one_collection_only() {
        let collections = Collections::new();
        collections.sensor.insert(json!({"n": 1}));
        collections.log.insert(json!({"n": 2}));

        collections.sensor.drop_all();

        assert!(collections.sensor.find_all().is_empty());
        assert_eq!(collections.log.find_all().len(), 1);
    }

    // ── 4. threshold_query_is_strictly_greater ──────────────────────

    #[test]
    fn threshold_query_is_strictly_greater() {
        let store = MemoryStore::new();
        store.insert(json!({"readings": {"radiation": 5.0, "temperature": 20.0, "solarFlare": true}}));
        store.insert(json!({"readings": {"radiation": 9.0, "temperature": 35.0, "solarFlare": true}}));
        store.insert(json!({"readings": {"radiation": 9.0, "temperature": 35.0, "solarFlare": false}}));

        let hits = store.find_above_thresholds(5.0, 20.0, true);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["readings"]["radiation"], 9.0);
    }
}
