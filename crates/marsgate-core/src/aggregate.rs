//! Per-cycle aggregation math.
//!
//! Pure function over the readings popped in one cycle plus the count
//! of registered sources. The solar-flare vote deliberately compares
//! against the registered count rather than the responding count:
//! sources with an empty buffer this cycle still weigh the vote
//! toward `false`. That asymmetry matches the deployed controller's
//! expectations and must not be "fixed" here.

use crate::types::{AggregateRecord, Reading};

/// Compute the aggregate over the readings popped in one cycle.
///
/// Returns `None` when no source had data this cycle — the caller
/// skips the cycle entirely (no forward, no log entry). With zero
/// registered sources the popped set is necessarily empty, so the
/// division below can never see a zero count.
///
/// - `temperature`: arithmetic mean (f64).
/// - `radiation`: arithmetic mean truncated toward zero.
/// - `solar_flare`: true iff strictly more than half of the
///   *registered* sources reported `true` this cycle.
pub fn aggregate(popped: &[Reading], registered: usize) -> Option<AggregateRecord> {
    if popped.is_empty() {
        return None;
    }

    let n = popped.len() as f64;
    let temperature = popped.iter().map(|r| r.temperature).sum::<f64>() / n;
    let radiation = (popped.iter().map(|r| r.radiation).sum::<f64>() / n).trunc() as i64;

    let flares = popped.iter().filter(|r| r.solar_flare).count();
    let solar_flare = 2 * flares > registered;

    Some(AggregateRecord {
        temperature,
        radiation,
        solar_flare,
    })
}

// ─── Tests ────────────────────────────────────────────────────────
