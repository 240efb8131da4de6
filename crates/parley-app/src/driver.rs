//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from sockets and
//! terminal input. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, io};

use crate::{AppEvent, Role};

/// Abstracts connection and input I/O for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the production TUI and in
/// simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, tokio TCP for the peer
/// - **Simulation**: scripted events with captured effects
///
/// # Event ordering
///
/// Connection events (`Connected`, `Data`, `Closed`, `Errored`) must be
/// yielded in the order the transport produced them. Terminal events may
/// interleave with them arbitrarily.
pub trait Driver {
    /// Platform-specific error type. Terminal write failures convert into
    /// it.
    type Error: std::error::Error + From<io::Error> + 'static;

    /// Start listening or dialing for `role`.
    ///
    /// Returns the first lifecycle event: `Listening`, `Connecting`, or
    /// `Errored` when the role could not be started at all.
    fn start(&mut self, role: &Role) -> impl Future<Output = AppEvent>;

    /// Wait for the next event.
    ///
    /// Returns `None` when every event source is exhausted.
    fn next_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>>;

    /// Queue raw bytes for the peer. No framing is added.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no established connection.
    fn send(&mut self, bytes: Vec<u8>) -> Result<(), Self::Error>;

    /// Close the connection. Idempotent.
    ///
    /// When a connection existed, a [`AppEvent::Closed`] is queued so the
    /// session observes the close like any other.
    fn close(&mut self, graceful: bool);

    /// Stop accepting connections. Idempotent.
    fn stop_listening(&mut self);

    /// Flush pending writes and release resources before exit.
    fn shutdown(&mut self) -> impl Future<Output = ()>;
}
