//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute,
//! in order.

use crate::{ExitStatus, Message};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Append a message to the log and print it.
    Print(Message),

    /// Redraw the whole screen from the log.
    Redraw,

    /// Step the cursor back over the newline echoed by a submitted line.
    OffsetEcho,

    /// Write raw bytes to the peer.
    Send(Vec<u8>),

    /// Close the connection.
    Close {
        /// Let pending writes drain before closing.
        graceful: bool,
    },

    /// Stop accepting connections.
    StopListening,

    /// End the session.
    Exit(ExitStatus),
}
