//! Streams a synthetic PCM buffer through the client against a loopback
//! session, printing the recognition events as they arrive.
//!
//! Run with: `cargo run --example stream_pcm`

use std::result::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use speechlink_client::prelude::*;

/// In-process session that "recognizes" whatever audio it receives: after a
/// few drive steps it emits a scripted hypothesis followed by a final phrase.
struct LoopbackSession {
    drives: AtomicUsize,
    buffered: Mutex<Vec<u8>>,
}

impl Session for LoopbackSession {
    fn configure(&self, endpoint: &str) -> Result<(), SessionError> {
        println!("loopback session configured for {endpoint}");
        Ok(())
    }

    fn drive(&self) -> Result<Vec<SessionEvent>, SessionError> {
        let step = self.drives.fetch_add(1, Ordering::SeqCst);
        Ok(match step {
            1 => vec![
                SessionEvent::TurnStart,
                SessionEvent::SpeechStartDetected { offset_ms: 120 },
            ],
            3 => vec![SessionEvent::SpeechHypothesis {
                text: "hello".to_string(),
            }],
            5 => {
                let bytes = self.buffered.lock().len();
                vec![
                    SessionEvent::SpeechPhrase {
                        text: format!("hello world ({bytes} bytes heard)"),
                    },
                    SessionEvent::SpeechEndDetected { offset_ms: 2048 },
                    SessionEvent::TurnEnd,
                ]
            }
            _ => Vec::new(),
        })
    }

    fn write_audio(&self, audio: &[u8]) -> Result<(), SessionError> {
        self.buffered.lock().extend_from_slice(audio);
        Ok(())
    }

    fn flush_audio(&self) -> Result<(), SessionError> {
        println!("audio segment flushed");
        Ok(())
    }

    fn close(&self) {
        println!("loopback session closed");
    }
}

struct LoopbackFactory;

impl SessionFactory for LoopbackFactory {
    fn open(&self) -> Result<Box<dyn Session>, SessionError> {
        Ok(Box::new(LoopbackSession {
            drives: AtomicUsize::new(0),
            buffered: Mutex::new(Vec::new()),
        }))
    }
}

fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let callbacks = CallbackSet::new()
        .with_event_handler(|event, _context| println!("event: {event:?}"))
        .with_error_handler(|error, _context| eprintln!("drive failed: {error}"));

    let config = ClientConfig::default().with_drive_interval(Duration::from_millis(50));
    let client =
        SpeechClient::connect_with_config(&LoopbackFactory, callbacks, Arc::new(()), config)?;

    // Stream 10 chunks of silence, then flush the segment.
    for _ in 0..10 {
        client.write(&[0u8; 320])?;
        std::thread::sleep(Duration::from_millis(20));
    }
    client.flush()?;

    // Give the worker time to deliver the scripted recognition events.
    std::thread::sleep(Duration::from_millis(500));

    client.shutdown()?;
    Ok(())
}
