//! TCP transport for a single peer.
//!
//! [`ConnectionManager`] owns the listener or the dialer and, once a peer is
//! up, one reader task and one writer task. The tasks only move bytes. Every
//! lifecycle notification travels through one unbounded channel as a
//! [`NetEvent`], so data, close and error reach the runtime in the order the
//! socket produced them.
//!
//! The host accepts exactly one connection: the accept task drops the
//! listener before it reports the stream, so later attempts are refused by
//! the operating system.

use std::{io, net::SocketAddr, time::Duration};

use parley_app::{AppEvent, Role};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
    task::{AbortHandle, JoinHandle},
};

/// Largest chunk read from the socket at once.
pub const READ_CHUNK: usize = 4096;

/// How long [`ConnectionManager::shutdown`] waits for queued writes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Listener could not be bound.
    #[error("failed to bind port {port}: {source}")]
    Bind {
        /// Requested port.
        port: u16,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Dial failed.
    #[error("failed to connect to {addr}: {source}")]
    Dial {
        /// Address that was dialed.
        addr: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// No established connection to send on.
    #[error("not connected")]
    NotConnected,

    /// Socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Connection notifications, in transport order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    /// The peer connection is up.
    Connected {
        /// Remote address.
        peer: SocketAddr,
    },
    /// One chunk received from the peer.
    Data(Vec<u8>),
    /// The connection closed.
    Closed,
    /// Accept, dial or socket failure.
    Errored(String),
}

impl From<NetEvent> for AppEvent {
    fn from(event: NetEvent) -> Self {
        match event {
            NetEvent::Connected { peer } => Self::Connected { peer: peer.to_string() },
            NetEvent::Data(bytes) => Self::Data(bytes),
            NetEvent::Closed => Self::Closed,
            NetEvent::Errored(message) => Self::Errored { message },
        }
    }
}

/// What the background tasks report.
#[derive(Debug)]
enum Signal {
    /// Accepted or dialed stream, not yet established.
    Stream { stream: TcpStream, peer: SocketAddr },
    Event(NetEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Listening,
    Connecting,
    Established,
    Closed,
}

#[derive(Debug)]
struct Writer {
    outgoing: mpsc::UnboundedSender<Vec<u8>>,
    handle: JoinHandle<()>,
}

/// Owns the one connection of a session.
#[derive(Debug)]
pub struct ConnectionManager {
    phase: Phase,
    signals_tx: mpsc::UnboundedSender<Signal>,
    signals_rx: mpsc::UnboundedReceiver<Signal>,
    local_addr: Option<SocketAddr>,

    accept: Option<AbortHandle>,
    dial: Option<AbortHandle>,
    reader: Option<AbortHandle>,
    writer: Option<Writer>,
    /// Writer left to flush after a graceful close.
    draining: Option<JoinHandle<()>>,

    closed_reported: bool,
}

impl ConnectionManager {
    /// Create an idle manager.
    pub fn new() -> Self {
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        Self {
            phase: Phase::Idle,
            signals_tx,
            signals_rx,
            local_addr: None,
            accept: None,
            dial: None,
            reader: None,
            writer: None,
            draining: None,
            closed_reported: false,
        }
    }

    /// Start `role` and describe the first lifecycle step.
    ///
    /// A bind failure is reported as [`AppEvent::Errored`], like any other
    /// connection failure.
    pub async fn start(&mut self, role: &Role) -> AppEvent {
        match role {
            Role::Host { port } => match self.start_as_host(*port).await {
                Ok(addr) => AppEvent::Listening { addr: addr.to_string() },
                Err(e) => {
                    tracing::warn!("listen failed: {e}");
                    AppEvent::Errored { message: e.to_string() }
                },
            },
            Role::Peer { host, port } => {
                self.start_as_peer(host, *port);
                AppEvent::Connecting { addr: format!("{host}:{port}") }
            },
        }
    }

    /// Bind `0.0.0.0:port` and accept one peer in the background.
    ///
    /// Returns the bound address. Port 0 picks a free port.
    pub async fn start_as_host(&mut self, port: u16) -> Result<SocketAddr, TransportError> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|source| TransportError::Bind { port, source })?;
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "listening");

        let signals = self.signals_tx.clone();
        let handle = tokio::spawn(async move {
            let signal = match listener.accept().await {
                Ok((stream, peer)) => Signal::Stream { stream, peer },
                Err(e) => Signal::Event(NetEvent::Errored(TransportError::Io(e).to_string())),
            };
            // Refuse everyone else from here on.
            drop(listener);
            let _ = signals.send(signal);
        });

        self.accept = Some(handle.abort_handle());
        self.local_addr = Some(addr);
        self.phase = Phase::Listening;
        Ok(addr)
    }

    /// Dial `host:port` in the background.
    pub fn start_as_peer(&mut self, host: &str, port: u16) {
        let addr = format!("{host}:{port}");
        tracing::info!(%addr, "dialing");

        let signals = self.signals_tx.clone();
        let handle = tokio::spawn(async move {
            let signal = match dial(&addr).await {
                Ok((stream, peer)) => Signal::Stream { stream, peer },
                Err(e) => Signal::Event(NetEvent::Errored(e.to_string())),
            };
            let _ = signals.send(signal);
        });

        self.dial = Some(handle.abort_handle());
        self.phase = Phase::Connecting;
    }

    /// Adopt `stream` as the session's connection.
    ///
    /// Only valid while listening or connecting. In any other phase the
    /// stream is dropped and `None` is returned.
    pub fn establish(&mut self, stream: TcpStream, peer: SocketAddr) -> Option<NetEvent> {
        if !matches!(self.phase, Phase::Listening | Phase::Connecting) {
            tracing::warn!(%peer, phase = ?self.phase, "dropping unexpected connection");
            return None;
        }

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed: {e}");
        }
        let (read, write) = stream.into_split();

        let reader = tokio::spawn(read_loop(read, self.signals_tx.clone()));
        let (outgoing, queued) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_loop(write, queued, self.signals_tx.clone()));

        self.reader = Some(reader.abort_handle());
        self.writer = Some(Writer { outgoing, handle });
        self.accept = None;
        self.dial = None;
        self.phase = Phase::Established;

        tracing::info!(%peer, "connection established");
        Some(NetEvent::Connected { peer })
    }

    /// Queue raw bytes for the peer.
    pub fn send(&mut self, bytes: Vec<u8>) -> Result<(), TransportError> {
        if self.phase != Phase::Established {
            return Err(TransportError::NotConnected);
        }
        let writer = self.writer.as_ref().ok_or(TransportError::NotConnected)?;
        writer.outgoing.send(bytes).map_err(|_| TransportError::NotConnected)
    }

    /// Tear the connection down.
    ///
    /// Graceful closes let queued writes drain and then shut down the write
    /// half; otherwise the writer is aborted. Queues one
    /// [`NetEvent::Closed`] if a connection was up. Safe to call repeatedly.
    pub fn close(&mut self, graceful: bool) {
        tracing::debug!(graceful, phase = ?self.phase, "close");
        self.abort_tasks();

        if let Some(writer) = self.writer.take() {
            if graceful {
                drop(writer.outgoing);
                self.draining = Some(writer.handle);
            } else {
                writer.handle.abort();
            }
        }

        if self.phase == Phase::Established && !self.closed_reported {
            let _ = self.signals_tx.send(Signal::Event(NetEvent::Closed));
        }
        self.phase = Phase::Closed;
    }

    /// Stop accepting connections.
    pub fn stop_listening(&mut self) {
        if let Some(accept) = self.accept.take() {
            tracing::debug!("stop listening");
            accept.abort();
        }
    }

    /// Next notification.
    ///
    /// Pending forever when nothing is in flight. Cancel safe.
    pub async fn next_event(&mut self) -> Option<NetEvent> {
        loop {
            match self.signals_rx.recv().await? {
                Signal::Stream { stream, peer } => {
                    if let Some(event) = self.establish(stream, peer) {
                        return Some(event);
                    }
                },
                Signal::Event(NetEvent::Closed) => {
                    if self.closed_reported {
                        continue;
                    }
                    self.closed_reported = true;
                    self.phase = Phase::Closed;
                    return Some(NetEvent::Closed);
                },
                Signal::Event(event) => return Some(event),
            }
        }
    }

    /// Close gracefully and wait briefly for queued writes to reach the
    /// socket.
    pub async fn shutdown(&mut self) {
        self.close(true);
        let Some(draining) = self.draining.take() else {
            return;
        };
        match tokio::time::timeout(DRAIN_TIMEOUT, draining).await {
            Ok(_) => tracing::debug!("writer drained"),
            Err(_) => tracing::warn!("timed out draining writes"),
        }
    }

    /// Address the listener is bound to, when hosting.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Whether the peer connection is up.
    pub fn is_established(&self) -> bool {
        self.phase == Phase::Established
    }

    fn abort_tasks(&mut self) {
        for handle in [self.accept.take(), self.dial.take(), self.reader.take()].into_iter().flatten()
        {
            handle.abort();
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.abort_tasks();
        if let Some(writer) = self.writer.take() {
            writer.handle.abort();
        }
    }
}

async fn dial(addr: &str) -> Result<(TcpStream, SocketAddr), TransportError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| TransportError::Dial { addr: addr.to_string(), source })?;
    let peer = stream.peer_addr()?;
    Ok((stream, peer))
}

/// Forward received chunks until EOF or error.
async fn read_loop(mut read: OwnedReadHalf, signals: mpsc::UnboundedSender<Signal>) {
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match read.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!("peer closed");
                let _ = signals.send(Signal::Event(NetEvent::Closed));
                return;
            },
            Ok(n) => {
                if signals.send(Signal::Event(NetEvent::Data(buf[..n].to_vec()))).is_err() {
                    return;
                }
            },
            Err(e) => {
                tracing::warn!("read failed: {e}");
                let _ = signals.send(Signal::Event(NetEvent::Errored(e.to_string())));
                let _ = signals.send(Signal::Event(NetEvent::Closed));
                return;
            },
        }
    }
}

/// Write queued bytes in order, then shut down the write half once the
/// queue is closed.
async fn write_loop(
    mut write: OwnedWriteHalf,
    mut queued: mpsc::UnboundedReceiver<Vec<u8>>,
    signals: mpsc::UnboundedSender<Signal>,
) {
    while let Some(bytes) = queued.recv().await {
        if let Err(e) = write.write_all(&bytes).await {
            tracing::warn!("write failed: {e}");
            let _ = signals.send(Signal::Event(NetEvent::Errored(e.to_string())));
            return;
        }
    }
    if let Err(e) = write.shutdown().await {
        tracing::debug!("write shutdown failed: {e}");
    }
}
