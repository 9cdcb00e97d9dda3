//! Caller-supplied callback set
//!
//! Callbacks are registered exactly once at connect time and are immutable for
//! the life of the connection. They are invoked from the drive worker's
//! thread, together with an opaque context value that is passed back
//! unmodified on every invocation.
//!
//! The `version` and `declared_size` fields carry the contract the caller
//! compiled against; [`SpeechClient::connect`](crate::SpeechClient::connect)
//! rejects a set whose declared contract does not match this library with
//! [`ClientError::InvalidParameter`], protecting against skew between a
//! caller and a dynamically loaded copy of the library.

use std::any::Any;
use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::error::{ClientError, Result};
use crate::session::{SessionError, SessionEvent};

/// Version of the callback set contract this library implements
pub const CALLBACK_SET_VERSION: u16 = 1;

/// Opaque caller context passed back on every callback invocation
pub type CallbackContext = Arc<dyn Any + Send + Sync>;

/// Handler for protocol events produced while driving the session
pub type EventHandler = Arc<dyn Fn(&SessionEvent, &CallbackContext) + Send + Sync>;

/// Handler for failures discovered asynchronously by the drive worker
pub type ErrorHandler = Arc<dyn Fn(&SessionError, &CallbackContext) + Send + Sync>;

/// The set of callbacks a caller registers at connect time
pub struct CallbackSet {
    /// Contract version the caller compiled against; must equal
    /// [`CALLBACK_SET_VERSION`]
    pub version: u16,

    /// Size of the callback set type the caller compiled against; must equal
    /// `mem::size_of::<CallbackSet>()`
    pub declared_size: usize,

    /// Invoked for every protocol event, in order, from the worker thread
    pub on_event: Option<EventHandler>,

    /// Invoked when a drive step fails; the worker keeps running afterwards
    pub on_error: Option<ErrorHandler>,
}

impl CallbackSet {
    /// Create an empty callback set with the correct version and size
    pub fn new() -> Self {
        Self {
            version: CALLBACK_SET_VERSION,
            declared_size: mem::size_of::<Self>(),
            on_event: None,
            on_error: None,
        }
    }

    /// Register an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SessionEvent, &CallbackContext) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(handler));
        self
    }

    /// Register an error handler
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SessionError, &CallbackContext) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Check the declared contract against this library
    pub(crate) fn validate(&self) -> Result<()> {
        if self.version != CALLBACK_SET_VERSION {
            return Err(ClientError::InvalidParameter(format!(
                "callback set version {} does not match expected version {}",
                self.version, CALLBACK_SET_VERSION
            )));
        }
        if self.declared_size != mem::size_of::<Self>() {
            return Err(ClientError::InvalidParameter(format!(
                "callback set declared size {} does not match expected size {}",
                self.declared_size,
                mem::size_of::<Self>()
            )));
        }
        Ok(())
    }

    pub(crate) fn dispatch_event(&self, event: &SessionEvent, context: &CallbackContext) {
        match &self.on_event {
            Some(handler) => handler(event, context),
            None => tracing::trace!(?event, "no event handler registered, dropping event"),
        }
    }

    pub(crate) fn dispatch_error(&self, error: &SessionError, context: &CallbackContext) {
        if let Some(handler) = &self.on_error {
            handler(error, context);
        }
    }
}

impl Default for CallbackSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSet")
            .field("version", &self.version)
            .field("declared_size", &self.declared_size)
            .field("on_event", &self.on_event.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
