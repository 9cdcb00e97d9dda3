//! Reference-counted acquisition of the shared collaborator subsystems
//!
//! Telemetry and the property store are process-wide: multiple client
//! connections may be live at once, and the subsystems must come up with the
//! first connection and go down with the last. The count lives behind a single
//! mutex so concurrent connects and shutdowns never race the first-init or
//! last-shutdown edge.

use parking_lot::Mutex;

/// Number of live client connections in this process.
static LIVE_CONNECTIONS: Mutex<usize> = Mutex::new(0);

/// RAII handle for one connection's share of the subsystems
///
/// Dropping the guard releases the reference; the last release tears the
/// subsystems down.
pub(crate) struct SubsystemGuard {
    _priv: (),
}

impl SubsystemGuard {
    pub(crate) fn acquire() -> Self {
        let mut live = LIVE_CONNECTIONS.lock();
        if *live == 0 {
            tracing::debug!("first live connection, initializing shared subsystems");
            speechlink_telemetry::initialize();
            property_store::initialize();
        }
        *live += 1;
        Self { _priv: () }
    }
}

impl Drop for SubsystemGuard {
    fn drop(&mut self) {
        let mut live = LIVE_CONNECTIONS.lock();
        *live = live.saturating_sub(1);
        if *live == 0 {
            tracing::debug!("last live connection closed, shutting down shared subsystems");
            property_store::shutdown();
            speechlink_telemetry::shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::subsystem_serial;

    #[test]
    fn test_guard_activates_and_releases() {
        let _serial = subsystem_serial();

        assert!(!speechlink_telemetry::is_active());
        assert!(!property_store::is_active());

        let guard = SubsystemGuard::acquire();
        assert!(speechlink_telemetry::is_active());
        assert!(property_store::is_active());

        drop(guard);
        assert!(!speechlink_telemetry::is_active());
        assert!(!property_store::is_active());
    }

    #[test]
    fn test_nested_guards_release_on_last_drop() {
        let _serial = subsystem_serial();

        let first = SubsystemGuard::acquire();
        let second = SubsystemGuard::acquire();

        drop(first);
        assert!(speechlink_telemetry::is_active());
        assert!(property_store::is_active());

        drop(second);
        assert!(!speechlink_telemetry::is_active());
        assert!(!property_store::is_active());
    }
}
