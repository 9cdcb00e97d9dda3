//! Process-wide telemetry counters for the speechlink client
//!
//! The telemetry subsystem is shared by every live client connection in the
//! process, so its lifecycle is reference counted: the first
//! [`initialize`] activates the counter registry and the matching last
//! [`shutdown`] logs a final snapshot and clears it. Calls made while the
//! subsystem is inactive are cheap no-ops, never errors, so instrumented code
//! does not have to care whether a connection is currently alive.

use std::collections::BTreeMap;

use parking_lot::Mutex;

struct Registry {
    /// Reference count of active `initialize` calls.
    active: usize,
    counters: BTreeMap<String, u64>,
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry {
    active: 0,
    counters: BTreeMap::new(),
});

/// Activate the telemetry subsystem (reference counted)
///
/// Safe to call from multiple connections concurrently; only the first call
/// actually activates the registry.
pub fn initialize() {
    let mut registry = REGISTRY.lock();
    registry.active += 1;
    if registry.active == 1 {
        tracing::debug!("telemetry subsystem activated");
    }
}

/// Release one reference to the telemetry subsystem
///
/// When the last reference is released the accumulated counters are logged
/// and cleared. Calling with no active reference is a logged no-op.
pub fn shutdown() {
    let mut registry = REGISTRY.lock();
    if registry.active == 0 {
        tracing::warn!("telemetry shutdown called while inactive");
        return;
    }
    registry.active -= 1;
    if registry.active == 0 {
        for (metric, value) in &registry.counters {
            tracing::debug!(metric, value, "final telemetry counter");
        }
        tracing::debug!(
            counters = registry.counters.len(),
            "telemetry subsystem shut down"
        );
        registry.counters.clear();
    }
}

/// Whether at least one connection currently holds the subsystem active
pub fn is_active() -> bool {
    REGISTRY.lock().active > 0
}

/// Current reference count, mainly for diagnostics
pub fn active_count() -> usize {
    REGISTRY.lock().active
}

/// Add `value` to a named counter
///
/// No-op while the subsystem is inactive.
pub fn add(metric: &str, value: u64) {
    let mut registry = REGISTRY.lock();
    if registry.active == 0 {
        return;
    }
    *registry.counters.entry(metric.to_string()).or_insert(0) += value;
}

/// Increment a named counter by one
pub fn increment(metric: &str) {
    add(metric, 1);
}

/// Record one occurrence of a protocol or session event
///
/// Events are tracked as counters under an `event.` prefix.
pub fn record_event(kind: &str) {
    tracing::trace!(kind, "telemetry event");
    add(&format!("event.{kind}"), 1);
}

/// Current value of a named counter (0 if unknown or inactive)
pub fn counter(metric: &str) -> u64 {
    REGISTRY
        .lock()
        .counters
        .get(metric)
        .copied()
        .unwrap_or(0)
}

/// Snapshot of all counters, sorted by metric name
pub fn snapshot() -> BTreeMap<String, u64> {
    REGISTRY.lock().counters.clone()
}
