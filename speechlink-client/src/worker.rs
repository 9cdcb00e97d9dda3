//! Background drive worker
//!
//! One dedicated thread per connection pumps the session: each tick performs
//! one bounded drive step while the connection is initialized, and the loop
//! terminates when the client sends [`Command::Shutdown`] or drops the channel.
//!
//! Instead of a bare fixed-interval sleep the worker waits on the command
//! channel with a timeout, which keeps the fixed drive cadence but lets
//! shutdown interrupt the wait immediately: shutdown latency is bounded by at
//! most one in-flight drive step, not by the full interval. The channel is
//! always drained before a drive step, so no new drive starts once shutdown
//! has been requested.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::client::{Connection, Lifecycle};

/// Commands sent from the client handle to the drive worker
#[derive(Debug)]
pub(crate) enum Command {
    /// Stop the loop; no further drive steps are performed
    Shutdown,
}

/// Spawns the drive worker thread for a connection
pub(crate) fn spawn_drive_worker(
    conn: Arc<Connection>,
    command_rx: Receiver<Command>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("speechlink-drive".to_string())
        .spawn(move || {
            let interval = conn.config().drive_interval;
            tracing::debug!(?interval, "drive worker started");

            loop {
                // Shutdown has priority over pending work.
                match command_rx.recv_timeout(interval) {
                    Ok(Command::Shutdown) => {
                        tracing::debug!("drive worker received shutdown command");
                        break;
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        tracing::debug!("client handle gone, stopping drive worker");
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                }

                if conn.lifecycle() != Lifecycle::Initialized {
                    continue;
                }

                conn.drive_once();
            }

            tracing::debug!("drive worker stopped");
        })
}
