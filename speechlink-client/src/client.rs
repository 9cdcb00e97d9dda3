//! Sync-first client handle for one connection to the recognition service
//!
//! `SpeechClient` owns a single logical connection: it opens and configures a
//! session at connect time, starts the background drive worker, accepts audio
//! on the caller's thread, and tears everything down in a fixed order at
//! shutdown. All methods are blocking; the only other thread touching the
//! connection is the drive worker.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};

use crate::callback::{CallbackContext, CallbackSet};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{Session, SessionError, SessionFactory};
use crate::subsystems::SubsystemGuard;
use crate::worker::{spawn_drive_worker, Command};

/// Lifecycle of a connection
///
/// Moves forward only, through `Uninitialized → Initialized → ShuttingDown →
/// Closed`; a closed connection is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    /// Connect is still in progress; the worker may already be running but
    /// performs no drive steps yet
    Uninitialized = 0,
    /// The session is open and the worker is driving it
    Initialized = 1,
    /// Shutdown has been requested; the worker is winding down
    ShuttingDown = 2,
    /// The worker has exited and the session is closed
    Closed = 3,
}

/// Forward-only atomic lifecycle cell
struct LifecycleCell(AtomicU8);

impl LifecycleCell {
    fn new() -> Self {
        Self(AtomicU8::new(Lifecycle::Uninitialized as u8))
    }

    fn get(&self) -> Lifecycle {
        match self.0.load(Ordering::SeqCst) {
            0 => Lifecycle::Uninitialized,
            1 => Lifecycle::Initialized,
            2 => Lifecycle::ShuttingDown,
            _ => Lifecycle::Closed,
        }
    }

    /// Advance `from → to`; returns false if another transition won the race
    fn advance(&self, from: Lifecycle, to: Lifecycle) -> bool {
        debug_assert!((from as u8) < (to as u8));
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// State shared between the client handle and the drive worker
pub(crate) struct Connection {
    lifecycle: LifecycleCell,

    /// Live session; `Some` exactly while the lifecycle is Initialized or
    /// ShuttingDown
    session: RwLock<Option<Arc<dyn Session>>>,

    /// Registered callbacks, immutable after connect
    callbacks: CallbackSet,

    /// Opaque caller context passed back on every callback invocation
    context: CallbackContext,

    /// Serializes drive steps; at most one drive call is in flight at a time
    drive_lock: Mutex<()>,

    /// Most recent drive failure, observable from the caller's thread
    last_drive_error: Mutex<Option<SessionError>>,

    config: ClientConfig,
}

impl Connection {
    pub(crate) fn new(
        session: Box<dyn Session>,
        callbacks: CallbackSet,
        context: CallbackContext,
        config: ClientConfig,
    ) -> Self {
        Self {
            lifecycle: LifecycleCell::new(),
            session: RwLock::new(Some(Arc::from(session))),
            callbacks,
            context,
            drive_lock: Mutex::new(()),
            last_drive_error: Mutex::new(None),
            config,
        }
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.get()
    }

    pub(crate) fn advance_lifecycle(&self, from: Lifecycle, to: Lifecycle) -> bool {
        self.lifecycle.advance(from, to)
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn session(&self) -> Option<Arc<dyn Session>> {
        self.session.read().clone()
    }

    /// Perform one bounded drive step under the drive lock
    ///
    /// Events and errors are dispatched to the callbacks after the lock is
    /// released, so a slow handler cannot extend the critical section. A
    /// failed step is surfaced through the error callback and retained for
    /// [`SpeechClient::last_drive_error`]; the worker keeps going.
    pub(crate) fn drive_once(&self) {
        let Some(session) = self.session() else {
            return;
        };

        let outcome = {
            let _guard = self.drive_lock.lock();
            session.drive()
        };

        match outcome {
            Ok(events) => {
                for event in events {
                    speechlink_telemetry::record_event("session_event");
                    self.callbacks.dispatch_event(&event, &self.context);
                }
            }
            Err(err) => {
                tracing::warn!("drive step failed: {err}");
                speechlink_telemetry::increment("drive.errors");
                *self.last_drive_error.lock() = Some(err.clone());
                self.callbacks.dispatch_error(&err, &self.context);
            }
        }
    }
}

/// Sync-first handle to one connection to the recognition service
///
/// # Example
///
/// ```rust,ignore
/// use speechlink_client::prelude::*;
/// use std::sync::Arc;
///
/// let callbacks = CallbackSet::new()
///     .with_event_handler(|event, _context| println!("event: {event:?}"))
///     .with_error_handler(|error, _context| eprintln!("drive failed: {error}"));
///
/// let client = SpeechClient::connect(&factory, callbacks, Arc::new(()))?;
///
/// client.write(&pcm_chunk)?;   // forward audio bytes
/// client.write(&[])?;          // empty write = flush
///
/// client.shutdown()?;          // joins the worker, closes the session
/// ```
pub struct SpeechClient {
    conn: Arc<Connection>,

    /// Wakes the drive worker for shutdown
    command_tx: mpsc::Sender<Command>,

    /// Worker join handle; taken exactly once, by shutdown
    worker: Mutex<Option<JoinHandle<()>>>,

    /// This connection's share of the process-wide subsystems; released at
    /// shutdown
    subsystems: Mutex<Option<SubsystemGuard>>,
}

impl SpeechClient {
    /// Connect with the default configuration
    ///
    /// See [`connect_with_config`](Self::connect_with_config).
    pub fn connect(
        factory: &dyn SessionFactory,
        callbacks: CallbackSet,
        context: CallbackContext,
    ) -> Result<Self> {
        Self::connect_with_config(factory, callbacks, context, ClientConfig::default())
    }

    /// Open a session, start the drive worker, and return a live handle
    ///
    /// The handle is only returned once everything has succeeded: callback
    /// validation, subsystem acquisition, session open and configure, and the
    /// worker spawn. Any failure releases whatever was acquired before it —
    /// a failed connect leaves no worker thread and no open session behind.
    pub fn connect_with_config(
        factory: &dyn SessionFactory,
        callbacks: CallbackSet,
        context: CallbackContext,
        config: ClientConfig,
    ) -> Result<Self> {
        callbacks.validate()?;
        config.validate()?;

        // Dropped on any early return below, releasing the subsystems.
        let subsystems = SubsystemGuard::acquire();

        let session = factory.open().map_err(|err| {
            tracing::error!("session open failed: {err}");
            ClientError::Initialization(err)
        })?;

        let service_url = config.service_url();
        if let Err(err) = session.configure(&service_url) {
            tracing::error!("session configure failed: {err}");
            session.close();
            return Err(ClientError::Initialization(err));
        }

        let conn = Arc::new(Connection::new(session, callbacks, context, config));

        let (command_tx, command_rx) = mpsc::channel();
        let worker = match spawn_drive_worker(Arc::clone(&conn), command_rx) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!("failed to spawn drive worker: {err}");
                if let Some(session) = conn.session.write().take() {
                    session.close();
                }
                return Err(ClientError::WorkerSpawn(err));
            }
        };

        // Setup is complete; from here the worker starts driving.
        conn.advance_lifecycle(Lifecycle::Uninitialized, Lifecycle::Initialized);
        tracing::debug!(endpoint = %service_url, "connection initialized");

        Ok(Self {
            conn,
            command_tx,
            worker: Mutex::new(Some(worker)),
            subsystems: Mutex::new(Some(subsystems)),
        })
    }

    /// Current lifecycle of the connection
    pub fn lifecycle(&self) -> Lifecycle {
        self.conn.lifecycle()
    }

    /// Forward audio bytes to the session's sink
    ///
    /// An empty buffer is a flush request, not an error: it marks the end of
    /// the current audio segment without forwarding any bytes. Runs on the
    /// caller's thread and may execute concurrently with a drive step; the
    /// [`Session`] contract requires the sink to tolerate that.
    pub fn write(&self, audio: &[u8]) -> Result<()> {
        match self.conn.lifecycle() {
            Lifecycle::Initialized => {}
            Lifecycle::ShuttingDown | Lifecycle::Closed => return Err(ClientError::InvalidHandle),
            Lifecycle::Uninitialized => return Err(ClientError::Uninitialized),
        }
        let session = self.conn.session().ok_or(ClientError::Uninitialized)?;

        if audio.is_empty() {
            speechlink_telemetry::increment("audio.flushes");
            session.flush_audio().map_err(ClientError::Write)
        } else {
            speechlink_telemetry::add("audio.bytes", audio.len() as u64);
            session.write_audio(audio).map_err(ClientError::Write)
        }
    }

    /// Flush buffered audio; equivalent to `write(&[])`
    pub fn flush(&self) -> Result<()> {
        self.write(&[])
    }

    /// Most recent drive failure, if any
    ///
    /// Lets a caller without an error callback observe asynchronous failures
    /// from a synchronous call. The value is retained until overwritten by a
    /// later failure.
    pub fn last_drive_error(&self) -> Option<SessionError> {
        self.conn.last_drive_error.lock().clone()
    }

    /// Shut the connection down
    ///
    /// Signals the worker, blocks until it has exited (bounded by at most one
    /// in-flight drive step), closes the session, and releases this
    /// connection's share of the process-wide subsystems. Calling again on an
    /// already-closed handle returns [`ClientError::InvalidHandle`].
    pub fn shutdown(&self) -> Result<()> {
        if !self
            .conn
            .advance_lifecycle(Lifecycle::Initialized, Lifecycle::ShuttingDown)
        {
            return Err(ClientError::InvalidHandle);
        }

        // If the worker already exited the send fails, which is fine.
        let _ = self.command_tx.send(Command::Shutdown);

        if let Some(worker) = self.worker.lock().take() {
            tracing::info!("waiting for drive worker to exit");
            if worker.join().is_err() {
                tracing::error!("drive worker panicked before exiting");
            }
        }

        if let Some(session) = self.conn.session.write().take() {
            session.close();
        }

        self.conn
            .advance_lifecycle(Lifecycle::ShuttingDown, Lifecycle::Closed);
        drop(self.subsystems.lock().take());
        tracing::debug!("connection closed");

        Ok(())
    }
}

impl Drop for SpeechClient {
    fn drop(&mut self) {
        // An InvalidHandle error here just means shutdown already ran.
        let _ = self.shutdown();
    }
}

impl std::fmt::Debug for SpeechClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechClient")
            .field("lifecycle", &self.conn.lifecycle())
            .field("endpoint", &self.conn.config.endpoint)
            .finish()
    }
}
