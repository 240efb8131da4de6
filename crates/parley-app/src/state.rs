//! Observable session state types.
//!
//! This module defines the data structures that describe where a session is
//! in its lifecycle: the peer [`Role`], the [`ConnectionState`] machine and
//! the final [`ExitStatus`].

use std::fmt;

/// Default TCP port for both roles.
pub const DEFAULT_PORT: u16 = 2023;

/// Which side of the conversation this process plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Listen on `port` and accept exactly one peer.
    Host {
        /// Port to listen on.
        port: u16,
    },
    /// Dial `host:port`.
    Peer {
        /// Host name or IP address.
        host: String,
        /// Port to dial.
        port: u16,
    },
}

impl Default for Role {
    fn default() -> Self {
        Self::Peer { host: "localhost".to_string(), port: DEFAULT_PORT }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host { port } => write!(f, "host on port {port}"),
            Self::Peer { host, port } => write!(f, "peer of {host}:{port}"),
        }
    }
}

/// Why a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Remote side closed without error.
    PeerClosed,
    /// Local user quit.
    LocalQuit,
    /// Bind, dial or transport failure.
    Error,
}

/// Connection lifecycle.
///
/// `Idle -> {Listening | Connecting} -> Established -> Closed`. Any
/// non-closed state may also go straight to `Closed`. Nothing leaves
/// `Closed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Nothing started yet.
    #[default]
    Idle,
    /// Waiting for the single peer to connect.
    Listening {
        /// Local listening address.
        addr: String,
    },
    /// Dialing the peer.
    Connecting {
        /// Address being dialed.
        addr: String,
    },
    /// The one duplex channel is up.
    Established {
        /// Remote address.
        peer: String,
    },
    /// Session over.
    Closed {
        /// Why it ended.
        reason: CloseReason,
    },
}

impl ConnectionState {
    /// Whether a peer is connected.
    pub fn is_established(&self) -> bool {
        matches!(self, Self::Established { .. })
    }

    /// Whether the session has ended.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    /// Whether the state machine permits moving to `next`.
    pub fn can_transition_to(&self, next: &Self) -> bool {
        match (self, next) {
            (Self::Closed { .. }, _) => false,
            (Self::Idle, Self::Listening { .. } | Self::Connecting { .. })
            | (Self::Listening { .. } | Self::Connecting { .. }, Self::Established { .. })
            | (_, Self::Closed { .. }) => true,
            _ => false,
        }
    }
}

/// Process outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Graceful close or user quit.
    Success,
    /// Connection error, or quit while still listening.
    Failure,
}

impl ExitStatus {
    /// Process exit code.
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}
