//! Gateway registry: SourceId assignment and per-source buffers.
//!
//! The registry is an explicitly owned state object passed to each
//! task — never a module-level singleton — so tests can run several
//! independent gateway instances in one process.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock};

use marsgate_core::{Reading, SourceId};

// ─── Source Slot ──────────────────────────────────────────────────

/// One registered source: its identity, FIFO buffer, and liveness flag.
///
/// The buffer has exactly one writer (the owning connection task,
/// appending at the tail) and one reader (the aggregator, popping from
/// the head). Each slot carries its own mutex, so the aggregator never
/// holds a lock across sources.
#[derive(Debug)]
pub struct SourceSlot {
    id: SourceId,
    buffer: Mutex<VecDeque<Reading>>,
    active: AtomicBool,
}

impl SourceSlot {
    fn new(id: SourceId) -> Self {
        Self {
            id,
            buffer: Mutex::new(VecDeque::new()),
            active: AtomicBool::new(true),
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Append a reading at the tail. Called only by the owning
    /// connection task.
    pub async fn push(&self, reading: Reading) {
        self.buffer.lock().await.push_back(reading);
    }

    /// Pop the oldest buffered reading, if any. Called only by the
    /// aggregator.
    pub async fn pop(&self) -> Option<Reading> {
        self.buffer.lock().await.pop_front()
    }

    /// Number of readings currently buffered.
    pub async fn buffered_len(&self) -> usize {
        self.buffer.lock().await.len()
    }

    /// Whether the source connection is still live. An inactive
    /// source's buffer keeps draining until exhausted; it just stops
    /// receiving new appends.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Mark the source inactive (connection closed or failed).
    pub fn mark_inactive(&self) {
        self.active.store(false, Ordering::Release);
    }
}

// ─── Gateway Registry ─────────────────────────────────────────────

/// Mapping from SourceId to its slot. Entries are created once per
/// established connection and never removed for the lifetime of the
/// process.
#[derive(Debug, Default)]
pub struct GatewayRegistry {
    slots: RwLock<Vec<Arc<SourceSlot>>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new source and return its slot.
    ///
    /// Ids are dense ordinals in registration order. A hole in the
    /// sequence means the registry has become inconsistent, which is a
    /// programming-invariant violation and deliberately fatal.
    pub async fn register(&self) -> Arc<SourceSlot> {
        let mut slots = self.slots.write().await;
        let id = SourceId(slots.len() as u32);
        if let Some(last) = slots.last() {
            assert_eq!(
                last.id().0 + 1,
                id.0,
                "registry identity sequence is no longer dense"
            );
        }
        let slot = Arc::new(SourceSlot::new(id));
        slots.push(Arc::clone(&slot));
        slot
    }

    /// Snapshot of all registered slots, in identity order.
    pub async fn slots(&self) -> Vec<Arc<SourceSlot>> {
        self.slots.read().await.clone()
    }

    /// Number of sources registered so far.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

// ─── Tests ────────────────────────────────────────────────────────
