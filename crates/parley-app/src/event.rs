//! Application input events.
//!
//! This module defines [`AppEvent`], the closed set of inputs that drive the
//! [`crate::App`] state machine and the [`crate::Runtime`].
//!
//! Events originate from two independent sources with no ordering guarantee
//! between them:
//! - The local terminal (keys, resize, interrupt).
//! - The connection (lifecycle notifications and received bytes), which
//!   arrive in transport order.

use crate::KeyInput;

/// Events processed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input, consumed by the line editor.
    Key(KeyInput),

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Listener bound; waiting for the peer.
    Listening {
        /// Local listening address.
        addr: String,
    },

    /// Dial in progress.
    Connecting {
        /// Address being dialed.
        addr: String,
    },

    /// The single peer connection is up.
    Connected {
        /// Remote address.
        peer: String,
    },

    /// Bytes received from the peer, exactly as delivered.
    Data(Vec<u8>),

    /// Connection closed without an error.
    Closed,

    /// Bind, dial or transport failure.
    Errored {
        /// Error description.
        message: String,
    },

    /// A line was submitted from the input.
    Line(String),

    /// The user asked to quit.
    Interrupt,
}
