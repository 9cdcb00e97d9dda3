//! # speechlink-client
//!
//! Sync-first connection core for a streaming speech-recognition protocol
//! client. One [`SpeechClient`] owns one logical connection to the remote
//! recognition service: it accepts a continuous stream of audio bytes from
//! the caller's thread and runs a dedicated background worker that drives the
//! underlying session until shutdown.
//!
//! ## Key pieces
//!
//! - **Lifecycle state machine**: `Uninitialized → Initialized → ShuttingDown
//!   → Closed`, forward-only; a handle is never returned half-initialized and
//!   is never reused after close.
//! - **Drive worker**: a single background thread performing one bounded
//!   "drive" step per tick, serialized so no two drive calls overlap.
//! - **Write path**: audio bytes are forwarded synchronously on the caller's
//!   thread; an empty write is a flush request.
//! - **Callbacks**: protocol events and drive failures are delivered from the
//!   worker's thread with an opaque caller context.
//! - **Shared subsystems**: telemetry and the property store are acquired
//!   reference-counted per connection, so concurrent connections never race
//!   first-init or last-shutdown.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use speechlink_client::prelude::*;
//! use std::sync::Arc;
//!
//! let callbacks = CallbackSet::new()
//!     .with_event_handler(|event, _context| println!("event: {event:?}"))
//!     .with_error_handler(|error, _context| eprintln!("drive failed: {error}"));
//!
//! let client = SpeechClient::connect(&factory, callbacks, Arc::new(()))?;
//!
//! for chunk in pcm_chunks {
//!     client.write(&chunk)?;
//! }
//! client.flush()?;
//!
//! client.shutdown()?;
//! ```
//!
//! The transport itself is a collaborator: callers supply a
//! [`SessionFactory`] whose sessions speak the wire protocol and buffer
//! audio. This crate only guarantees the lifecycle, execution, and
//! synchronization contract around them.

pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod session;

mod subsystems;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use callback::{CallbackContext, CallbackSet, CALLBACK_SET_VERSION};
pub use client::{Lifecycle, SpeechClient};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use session::{Session, SessionError, SessionEvent, SessionFactory};

/// Prelude module for convenient imports
///
/// ```rust
/// use speechlink_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CallbackContext, CallbackSet, ClientConfig, ClientError, Lifecycle, Result, Session,
        SessionError, SessionEvent, SessionFactory, SpeechClient,
    };
}
