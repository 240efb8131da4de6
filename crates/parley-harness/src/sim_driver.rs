//! Scripted [`Driver`] for simulation.
//!
//! [`SimDriver`] replays a fixed list of [`AppEvent`]s and records every
//! effect the runtime asks for instead of touching a socket, so a session
//! plays out the same way on every run.

use std::{collections::VecDeque, io};

use parley_app::{AppEvent, Driver, KeyInput, Role};

/// Failure reported by the simulated transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SimDriverError {}

impl From<io::Error> for SimDriverError {
    fn from(err: io::Error) -> Self {
        Self(err.to_string())
    }
}

/// Scripted driver with captured effects.
///
/// Closing an established connection raises [`AppEvent::Closed`] ahead of
/// the rest of the script, as the TCP transport does.
#[derive(Debug, Default)]
pub struct SimDriver {
    /// Events the driver raised itself; delivered before the script.
    raised: VecDeque<AppEvent>,
    script: VecDeque<AppEvent>,
    start_error: Option<String>,
    fail_sends: bool,

    started: Option<Role>,
    listening: bool,
    connected: bool,
    sent: Vec<Vec<u8>>,
    closes: Vec<bool>,
    stop_listening_calls: usize,
    shut_down: bool,
}

impl SimDriver {
    /// Create a driver with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver that replays `events` in order.
    pub fn scripted(events: impl IntoIterator<Item = AppEvent>) -> Self {
        Self { script: events.into_iter().collect(), ..Self::default() }
    }

    /// Make `start` report `message` as an error instead of starting.
    #[must_use]
    pub fn with_start_error(mut self, message: impl Into<String>) -> Self {
        self.start_error = Some(message.into());
        self
    }

    /// Make every send fail, as if the socket broke.
    #[must_use]
    pub fn with_failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Append an event to the script.
    pub fn inject_event(&mut self, event: AppEvent) {
        self.script.push_back(event);
    }

    /// Append the keys for typing `text` and pressing Enter.
    pub fn inject_line(&mut self, text: &str) {
        self.script.extend(text.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
        self.script.push_back(AppEvent::Key(KeyInput::Enter));
    }

    /// Append bytes arriving from the peer.
    pub fn inject_data(&mut self, data: &[u8]) {
        self.script.push_back(AppEvent::Data(data.to_vec()));
    }

    /// Check if there are events left to deliver.
    pub fn has_pending(&self) -> bool {
        !self.raised.is_empty() || !self.script.is_empty()
    }

    /// Role passed to `start`, if it was called.
    pub fn started(&self) -> Option<&Role> {
        self.started.as_ref()
    }

    /// Bytes sent to the peer, one entry per send.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Take all captured sends.
    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.sent)
    }

    /// `graceful` flag of every close request, in order.
    pub fn closes(&self) -> &[bool] {
        &self.closes
    }

    /// How many times the listener was asked to stop.
    pub fn stop_listening_calls(&self) -> usize {
        self.stop_listening_calls
    }

    /// Whether the listener is still accepting.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Whether a peer is connected.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether `shutdown` ran.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Track connection lifecycle as events are delivered.
    fn observe(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Connected { .. } => self.connected = true,
            AppEvent::Closed | AppEvent::Errored { .. } => {
                self.connected = false;
                self.listening = false;
            },
            _ => {},
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn start(&mut self, role: &Role) -> AppEvent {
        self.started = Some(role.clone());

        if let Some(message) = self.start_error.take() {
            return AppEvent::Errored { message };
        }

        match role {
            Role::Host { port } => {
                self.listening = true;
                AppEvent::Listening { addr: format!("0.0.0.0:{port}") }
            },
            Role::Peer { host, port } => AppEvent::Connecting { addr: format!("{host}:{port}") },
        }
    }

    async fn next_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let event = self.raised.pop_front().or_else(|| self.script.pop_front());
        if let Some(ref event) = event {
            self.observe(event);
        }
        Ok(event)
    }

    fn send(&mut self, bytes: Vec<u8>) -> Result<(), Self::Error> {
        if self.fail_sends {
            return Err(SimDriverError("broken pipe".into()));
        }
        if !self.connected {
            tracing::debug!(len = bytes.len(), "send while disconnected");
            return Err(SimDriverError("not connected".into()));
        }
        self.sent.push(bytes);
        Ok(())
    }

    fn close(&mut self, graceful: bool) {
        self.closes.push(graceful);
        if self.connected {
            self.connected = false;
            self.raised.push_back(AppEvent::Closed);
        }
    }

    fn stop_listening(&mut self) {
        self.stop_listening_calls += 1;
        self.listening = false;
    }

    async fn shutdown(&mut self) {
        self.shut_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_line_types_then_submits() {
        let mut driver = SimDriver::new();
        driver.inject_line("hi");

        assert!(driver.has_pending());
        assert_eq!(driver.script.len(), 3);
        assert_eq!(driver.script.back(), Some(&AppEvent::Key(KeyInput::Enter)));
    }

    #[tokio::test]
    async fn host_start_reports_listening() {
        let mut driver = SimDriver::new();
        let event = driver.start(&Role::Host { port: 2023 }).await;

        assert_eq!(event, AppEvent::Listening { addr: "0.0.0.0:2023".into() });
        assert!(driver.is_listening());
    }

    #[tokio::test]
    async fn start_error_replaces_first_event() {
        let mut driver = SimDriver::new().with_start_error("address in use");
        let event = driver.start(&Role::Host { port: 2023 }).await;

        assert_eq!(event, AppEvent::Errored { message: "address in use".into() });
    }

    #[tokio::test]
    async fn send_requires_connection() {
        let mut driver = SimDriver::scripted([AppEvent::Connected { peer: "p".into() }]);
        assert!(driver.send(b"early".to_vec()).is_err());

        let _ = driver.next_event().await.unwrap();
        driver.send(b"hello".to_vec()).unwrap();
        assert_eq!(driver.sent(), [b"hello".to_vec()]);
    }

    #[tokio::test]
    async fn close_raises_closed_once() {
        let mut driver = SimDriver::scripted([
            AppEvent::Connected { peer: "p".into() },
            AppEvent::Data(b"after".to_vec()),
        ]);
        let _ = driver.next_event().await.unwrap();

        driver.close(true);
        driver.close(true);

        assert_eq!(driver.next_event().await.unwrap(), Some(AppEvent::Closed));
        assert_eq!(driver.next_event().await.unwrap(), Some(AppEvent::Data(b"after".to_vec())));
        assert_eq!(driver.next_event().await.unwrap(), None);
        assert_eq!(driver.closes(), [true, true]);
    }
}
