//! Collaborator contracts for the recognition session
//!
//! The client core never speaks the wire protocol itself. It drives an opaque
//! [`Session`] supplied by a [`SessionFactory`]: the transport performs one
//! bounded unit of protocol work per [`Session::drive`] call and hands back
//! any protocol events it produced, while audio bytes flow in through the
//! session's sink entry points.

use thiserror::Error;

/// Errors reported by a session implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Opening the session against the service failed
    #[error("failed to open session: {0}")]
    Open(String),

    /// The session could not be configured for the requested endpoint
    #[error("failed to configure session for endpoint {endpoint}: {reason}")]
    Configure { endpoint: String, reason: String },

    /// A drive step hit a transport failure; the connection may recover on a
    /// later step
    #[error("transport error while driving session: {0}")]
    Drive(String),

    /// The audio sink rejected a buffer
    #[error("audio sink rejected write: {0}")]
    SinkWrite(String),

    /// The audio sink rejected a flush request
    #[error("audio sink rejected flush: {0}")]
    SinkFlush(String),
}

/// Protocol events surfaced by the session while being driven
///
/// Delivered to the registered event callback on the drive worker's thread;
/// callers must not assume any particular calling thread beyond "not
/// necessarily their own".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The service opened a new recognition turn
    TurnStart,
    /// Start of speech detected in the audio stream
    SpeechStartDetected { offset_ms: u64 },
    /// Intermediate recognition hypothesis, may be revised
    SpeechHypothesis { text: String },
    /// Final recognized phrase for the current utterance
    SpeechPhrase { text: String },
    /// End of speech detected in the audio stream
    SpeechEndDetected { offset_ms: u64 },
    /// The service closed the current recognition turn
    TurnEnd,
}

/// One active connection to the remote recognition service
///
/// Exactly one background worker drives a session at a time; the client core
/// serializes [`drive`](Session::drive) calls. The audio entry points are
/// deliberately *not* covered by that serialization: an implementation must
/// tolerate one concurrent writer (the caller's thread calling
/// [`write_audio`](Session::write_audio) / [`flush_audio`](Session::flush_audio))
/// alongside one driver. The `Send + Sync` bounds make that contract explicit.
pub trait Session: Send + Sync {
    /// Configure the session against a service endpoint
    ///
    /// Called exactly once, before the first drive step.
    fn configure(&self, endpoint: &str) -> Result<(), SessionError>;

    /// Perform one bounded unit of pending protocol work
    ///
    /// May block on network I/O. Returns any protocol events produced during
    /// this step, in order.
    fn drive(&self) -> Result<Vec<SessionEvent>, SessionError>;

    /// Forward audio bytes to the session's buffering/encoding sink
    fn write_audio(&self, audio: &[u8]) -> Result<(), SessionError>;

    /// Flush buffered audio, marking the end of the current audio segment
    fn flush_audio(&self) -> Result<(), SessionError>;

    /// Close the session and release its transport resources
    ///
    /// Called at most once, after the drive worker has exited.
    fn close(&self);
}

/// Opens sessions against the recognition service
pub trait SessionFactory: Send + Sync {
    fn open(&self) -> Result<Box<dyn Session>, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::Configure {
            endpoint: "wss://example.invalid/v1".to_string(),
            reason: "handshake refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to configure session for endpoint wss://example.invalid/v1: handshake refused"
        );

        let err = SessionError::Drive("socket reset".to_string());
        assert!(err.to_string().contains("socket reset"));
    }

    #[test]
    fn test_event_equality() {
        let a = SessionEvent::SpeechPhrase {
            text: "hello world".to_string(),
        };
        let b = SessionEvent::SpeechPhrase {
            text: "hello world".to_string(),
        };
        assert_eq!(a, b);
        assert_ne!(a, SessionEvent::TurnEnd);
    }
}
