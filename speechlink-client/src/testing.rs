//! Shared test doubles for the session contract
//!
//! `StubFactory`/`StubSession` instrument every collaborator entry point with
//! counters so tests can assert on drive cadence, forwarded audio, and
//! shutdown ordering. The drive path carries a re-entrancy detector: any
//! overlapping drive call is counted rather than just crashing, so the
//! serialization property is directly assertable.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

use crate::session::{Session, SessionError, SessionEvent, SessionFactory};

// Several tests assert on the process-wide subsystem state (telemetry and
// property store refcounts), so every test that creates a client or a
// subsystem guard serializes on this lock.
static SUBSYSTEM_SERIAL: Mutex<()> = Mutex::new(());

pub(crate) fn subsystem_serial() -> MutexGuard<'static, ()> {
    SUBSYSTEM_SERIAL.lock()
}

/// Failure injection switches for the stub session
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StubBehavior {
    pub fail_open: bool,
    pub fail_configure: bool,
    pub fail_drives: bool,
    pub fail_writes: bool,
    /// Make each drive step take a few milliseconds to widen race windows
    pub slow_drive: bool,
}

/// Counters shared between a stub session and the test that owns it
#[derive(Default)]
pub(crate) struct SessionProbe {
    opens: AtomicUsize,
    drives: AtomicUsize,
    flushes: AtomicUsize,
    closes: AtomicUsize,
    overlapped: AtomicUsize,
    driving: AtomicBool,
    written: Mutex<Vec<Vec<u8>>>,
    configured_endpoint: Mutex<Option<String>>,
}

impl SessionProbe {
    pub(crate) fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn drive_count(&self) -> usize {
        self.drives.load(Ordering::SeqCst)
    }

    pub(crate) fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Number of drive calls that entered while another was in flight
    pub(crate) fn overlapped_drives(&self) -> usize {
        self.overlapped.load(Ordering::SeqCst)
    }

    pub(crate) fn written(&self) -> Vec<Vec<u8>> {
        self.written.lock().clone()
    }

    pub(crate) fn configured_endpoint(&self) -> Option<String> {
        self.configured_endpoint.lock().clone()
    }

    /// Block until at least `count` drive steps have completed
    pub(crate) fn wait_for_drives(&self, count: usize, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while self.drive_count() < count {
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {count} drive steps (saw {})",
                self.drive_count()
            );
            std::thread::sleep(Duration::from_millis(2));
        }
    }
}

pub(crate) struct StubSession {
    probe: Arc<SessionProbe>,
    behavior: StubBehavior,
    pending_events: Mutex<Vec<SessionEvent>>,
}

impl Session for StubSession {
    fn configure(&self, endpoint: &str) -> Result<(), SessionError> {
        *self.probe.configured_endpoint.lock() = Some(endpoint.to_string());
        if self.behavior.fail_configure {
            return Err(SessionError::Configure {
                endpoint: endpoint.to_string(),
                reason: "stub refused configuration".to_string(),
            });
        }
        Ok(())
    }

    fn drive(&self) -> Result<Vec<SessionEvent>, SessionError> {
        if self.probe.driving.swap(true, Ordering::SeqCst) {
            self.probe.overlapped.fetch_add(1, Ordering::SeqCst);
        }
        if self.behavior.slow_drive {
            std::thread::sleep(Duration::from_millis(3));
        }
        let result = if self.behavior.fail_drives {
            Err(SessionError::Drive("stub transport failure".to_string()))
        } else {
            Ok(self.pending_events.lock().drain(..).collect())
        };
        self.probe.driving.store(false, Ordering::SeqCst);
        self.probe.drives.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn write_audio(&self, audio: &[u8]) -> Result<(), SessionError> {
        if self.behavior.fail_writes {
            return Err(SessionError::SinkWrite("stub sink is full".to_string()));
        }
        self.probe.written.lock().push(audio.to_vec());
        Ok(())
    }

    fn flush_audio(&self) -> Result<(), SessionError> {
        if self.behavior.fail_writes {
            return Err(SessionError::SinkFlush("stub sink is full".to_string()));
        }
        self.probe.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct StubFactory {
    probe: Arc<SessionProbe>,
    behavior: StubBehavior,
    queued_events: Mutex<Vec<SessionEvent>>,
}

impl StubFactory {
    pub(crate) fn new(behavior: StubBehavior) -> Self {
        Self {
            probe: Arc::new(SessionProbe::default()),
            behavior,
            queued_events: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn probe(&self) -> Arc<SessionProbe> {
        Arc::clone(&self.probe)
    }

    /// Events the next opened session will hand back from its first drive
    pub(crate) fn queue_events(&self, events: Vec<SessionEvent>) {
        self.queued_events.lock().extend(events);
    }
}

impl SessionFactory for StubFactory {
    fn open(&self) -> Result<Box<dyn Session>, SessionError> {
        if self.behavior.fail_open {
            return Err(SessionError::Open("stub refused to open".to_string()));
        }
        self.probe.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSession {
            probe: Arc::clone(&self.probe),
            behavior: self.behavior,
            pending_events: Mutex::new(self.queued_events.lock().drain(..).collect()),
        }))
    }
}

/// Build a bare connection around a stub session, bypassing connect
///
/// Used by worker tests that need a connection in a chosen lifecycle state.
pub(crate) fn make_connection(
    behavior: StubBehavior,
) -> (Arc<crate::client::Connection>, Arc<SessionProbe>) {
    use crate::callback::CallbackSet;
    use crate::client::Connection;
    use crate::config::ClientConfig;

    let factory = StubFactory::new(behavior);
    let probe = factory.probe();
    let session = factory.open().expect("stub open should succeed");
    let config = ClientConfig::default()
        .with_endpoint("wss://example.invalid/speech/v1")
        .with_drive_interval(Duration::from_millis(10));
    let conn = Arc::new(Connection::new(
        session,
        CallbackSet::new(),
        Arc::new(()),
        config,
    ));
    (conn, probe)
}
