//! Application state machine.
//!
//! This module defines the [`App`] state machine, which decides what every
//! event means for the session, completely decoupled from sockets and the
//! terminal.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Drives the connection lifecycle (`Idle -> Listening | Connecting ->
//!   Established -> Closed`) and refuses any second peer.
//! - Turns submitted lines into sends or manual refreshes.
//! - Maps interrupts and connection endings to an exit status, at most once.

use crate::{AppAction, AppEvent, CloseReason, ConnectionState, ExitStatus, Level, Message};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone, Default)]
pub struct App {
    /// Connection lifecycle state.
    state: ConnectionState,
    /// One-shot interrupt guard.
    interrupted: bool,
    /// Set once an `Exit` action has been produced.
    exit: Option<ExitStatus>,
}

impl App {
    /// Create an idle App.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            // Keys belong to the line editor; only finished lines reach here.
            AppEvent::Key(_) => vec![],
            // The renderer already adopted the new size.
            AppEvent::Resize(..) => vec![AppAction::Redraw],
            AppEvent::Listening { addr } => {
                let text = format!("Waiting for a connection on {addr}...");
                if !self.transition(ConnectionState::Listening { addr }) {
                    return vec![];
                }
                vec![AppAction::Print(Message::system(Level::Info, text))]
            },
            AppEvent::Connecting { addr } => {
                let text = format!("Joining server {addr}...");
                if !self.transition(ConnectionState::Connecting { addr }) {
                    return vec![];
                }
                vec![AppAction::Print(Message::system(Level::Info, text))]
            },
            AppEvent::Connected { peer } => self.on_connected(peer),
            AppEvent::Data(bytes) => {
                if !self.state.is_established() {
                    tracing::warn!(len = bytes.len(), "data outside an established connection");
                    return vec![];
                }
                let text = String::from_utf8_lossy(&bytes).into_owned();
                vec![AppAction::Print(Message::incoming(text))]
            },
            AppEvent::Closed => self.on_closed(),
            AppEvent::Errored { message } => self.on_errored(&message),
            AppEvent::Line(text) => self.on_line(text),
            AppEvent::Interrupt => self.on_interrupt(),
        }
    }

    fn on_connected(&mut self, peer: String) -> Vec<AppAction> {
        let was_listening = matches!(self.state, ConnectionState::Listening { .. });
        let text = format!("Now connected to {peer}");
        if !self.transition(ConnectionState::Established { peer }) {
            tracing::warn!(state = ?self.state, "ignoring second connection");
            return vec![];
        }

        let mut actions = Vec::with_capacity(2);
        if was_listening {
            actions.push(AppAction::StopListening);
        }
        actions.push(AppAction::Print(Message::system(Level::Success, text)));
        actions
    }

    fn on_closed(&mut self) -> Vec<AppAction> {
        // The error path already reported and shut down.
        if self.state.is_closed() {
            return vec![];
        }

        let reason = if self.interrupted { CloseReason::LocalQuit } else { CloseReason::PeerClosed };
        self.state = ConnectionState::Closed { reason };
        self.finish(vec![
            AppAction::Print(Message::system(Level::Info, "Connection closed.")),
            AppAction::Close { graceful: true },
        ], ExitStatus::Success)
    }

    fn on_errored(&mut self, message: &str) -> Vec<AppAction> {
        if self.state.is_closed() {
            tracing::debug!(message, "error after close");
            return vec![];
        }

        let was_listening = matches!(self.state, ConnectionState::Listening { .. });
        self.state = ConnectionState::Closed { reason: CloseReason::Error };

        let mut actions = vec![AppAction::Print(Message::system(
            Level::Error,
            format!("Error: {message}"),
        ))];
        if was_listening {
            actions.push(AppAction::StopListening);
        }
        actions.push(AppAction::Close { graceful: false });
        self.finish(actions, ExitStatus::Failure)
    }

    fn on_line(&mut self, text: String) -> Vec<AppAction> {
        let mut actions = vec![AppAction::OffsetEcho];

        if self.state.is_established() && !text.trim().is_empty() {
            actions.push(AppAction::Send(text.clone().into_bytes()));
            actions.push(AppAction::Print(Message::outgoing(text)));
        } else {
            // Blank input doubles as a manual refresh.
            actions.push(AppAction::Redraw);
        }
        actions
    }

    fn on_interrupt(&mut self) -> Vec<AppAction> {
        if self.interrupted {
            return vec![];
        }
        self.interrupted = true;

        match self.state {
            ConnectionState::Established { .. } => vec![
                AppAction::Print(Message::system(Level::Info, "Issued close.")),
                AppAction::Close { graceful: true },
            ],
            ConnectionState::Listening { .. } => {
                self.state = ConnectionState::Closed { reason: CloseReason::LocalQuit };
                // Quitting before anyone connected counts as a failure.
                self.finish(vec![
                    AppAction::StopListening,
                    AppAction::Print(Message::system(
                        Level::Info,
                        "Stopped listening for connections.",
                    )),
                ], ExitStatus::Failure)
            },
            ConnectionState::Connecting { .. } => {
                self.state = ConnectionState::Closed { reason: CloseReason::LocalQuit };
                self.finish(vec![
                    AppAction::Print(Message::system(Level::Warning, "Aborting connection!")),
                    AppAction::Close { graceful: false },
                ], ExitStatus::Success)
            },
            ConnectionState::Idle => {
                self.state = ConnectionState::Closed { reason: CloseReason::LocalQuit };
                self.finish(vec![], ExitStatus::Success)
            },
            ConnectionState::Closed { .. } => vec![],
        }
    }

    /// Append the exit action, once.
    fn finish(&mut self, mut actions: Vec<AppAction>, status: ExitStatus) -> Vec<AppAction> {
        if self.exit.is_none() {
            self.exit = Some(status);
            actions.push(AppAction::Exit(status));
        }
        actions
    }

    fn transition(&mut self, next: ConnectionState) -> bool {
        if !self.state.can_transition_to(&next) {
            return false;
        }
        tracing::debug!(from = ?self.state, to = ?next, "connection state");
        self.state = next;
        true
    }

    /// Current connection state.
    pub fn connection_state(&self) -> &ConnectionState {
        &self.state
    }

    /// Exit status, once the session has ended.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit
    }

    /// Whether an interrupt has already been handled.
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Origin;

    fn listening_app() -> App {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Listening { addr: "0.0.0.0:2023".into() });
        app
    }

    fn connected_app() -> App {
        let mut app = listening_app();
        let _ = app.handle(AppEvent::Connected { peer: "127.0.0.1:50000".into() });
        app
    }

    fn printed(actions: &[AppAction]) -> Vec<&Message> {
        actions
            .iter()
            .filter_map(|a| match a {
                AppAction::Print(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn listening_prints_waiting_message() {
        let mut app = App::new();
        let actions = app.handle(AppEvent::Listening { addr: "0.0.0.0:2023".into() });

        assert!(matches!(app.connection_state(), ConnectionState::Listening { .. }));
        assert_eq!(printed(&actions)[0].content, "Waiting for a connection on 0.0.0.0:2023...");
    }

    #[test]
    fn first_connection_stops_listener() {
        let mut app = listening_app();
        let actions = app.handle(AppEvent::Connected { peer: "10.0.0.2:40000".into() });

        assert!(matches!(actions.as_slice(), [AppAction::StopListening, AppAction::Print(m)]
            if m.content == "Now connected to 10.0.0.2:40000"
                && m.origin == Origin::System(Level::Success)));
        assert!(app.connection_state().is_established());
    }

    #[test]
    fn second_connection_is_ignored() {
        let mut app = connected_app();
        let actions = app.handle(AppEvent::Connected { peer: "10.0.0.3:40001".into() });

        assert!(actions.is_empty());
        assert_eq!(app.connection_state(), &ConnectionState::Established {
            peer: "127.0.0.1:50000".into()
        });
    }

    #[test]
    fn dialed_connection_does_not_stop_listener() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Connecting { addr: "localhost:2023".into() });
        let actions = app.handle(AppEvent::Connected { peer: "127.0.0.1:2023".into() });

        assert!(matches!(actions.as_slice(), [AppAction::Print(_)]));
    }

    #[test]
    fn data_becomes_incoming_message() {
        let mut app = connected_app();
        let actions = app.handle(AppEvent::Data(b"hello".to_vec()));

        assert_eq!(actions, vec![AppAction::Print(Message::incoming("hello"))]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut app = connected_app();
        let actions = app.handle(AppEvent::Data(vec![b'h', 0xff, b'i']));

        assert_eq!(printed(&actions)[0].content, "h\u{fffd}i");
    }

    #[test]
    fn data_before_connection_is_dropped() {
        let mut app = listening_app();
        assert!(app.handle(AppEvent::Data(b"early".to_vec())).is_empty());
    }

    #[test]
    fn line_sends_and_prints_outgoing() {
        let mut app = connected_app();
        let actions = app.handle(AppEvent::Line("hello".into()));

        assert_eq!(actions, vec![
            AppAction::OffsetEcho,
            AppAction::Send(b"hello".to_vec()),
            AppAction::Print(Message::outgoing("hello")),
        ]);
    }

    #[test]
    fn blank_line_redraws_instead_of_sending() {
        let mut app = connected_app();
        let actions = app.handle(AppEvent::Line("   \t".into()));

        assert_eq!(actions, vec![AppAction::OffsetEcho, AppAction::Redraw]);
    }

    #[test]
    fn line_without_connection_redraws() {
        let mut app = listening_app();
        let actions = app.handle(AppEvent::Line("hello".into()));

        assert_eq!(actions, vec![AppAction::OffsetEcho, AppAction::Redraw]);
    }

    #[test]
    fn peer_close_exits_successfully() {
        let mut app = connected_app();
        let actions = app.handle(AppEvent::Closed);

        assert_eq!(printed(&actions)[0].content, "Connection closed.");
        assert_eq!(actions.last(), Some(&AppAction::Exit(ExitStatus::Success)));
        assert_eq!(app.exit_status(), Some(ExitStatus::Success));
    }

    #[test]
    fn error_then_close_exits_once_with_failure() {
        let mut app = connected_app();
        let actions = app.handle(AppEvent::Errored { message: "connection reset".into() });

        assert_eq!(printed(&actions)[0].content, "Error: connection reset");
        assert_eq!(printed(&actions)[0].origin, Origin::System(Level::Error));
        assert_eq!(actions.last(), Some(&AppAction::Exit(ExitStatus::Failure)));

        assert!(app.handle(AppEvent::Closed).is_empty());
        assert_eq!(app.exit_status(), Some(ExitStatus::Failure));
    }

    #[test]
    fn bind_failure_exits_with_failure() {
        let mut app = App::new();
        let actions = app.handle(AppEvent::Errored { message: "address in use".into() });

        assert_eq!(actions.last(), Some(&AppAction::Exit(ExitStatus::Failure)));
    }

    #[test]
    fn interrupt_while_connected_closes_gracefully() {
        let mut app = connected_app();
        let actions = app.handle(AppEvent::Interrupt);

        assert_eq!(actions, vec![
            AppAction::Print(Message::system(Level::Info, "Issued close.")),
            AppAction::Close { graceful: true },
        ]);
        // The close event that follows drives the exit.
        let actions = app.handle(AppEvent::Closed);
        assert_eq!(actions.last(), Some(&AppAction::Exit(ExitStatus::Success)));
    }

    #[test]
    fn interrupt_while_listening_exits_with_failure() {
        let mut app = listening_app();
        let actions = app.handle(AppEvent::Interrupt);

        assert_eq!(actions, vec![
            AppAction::StopListening,
            AppAction::Print(Message::system(Level::Info, "Stopped listening for connections.")),
            AppAction::Exit(ExitStatus::Failure),
        ]);
    }

    #[test]
    fn interrupt_while_dialing_aborts() {
        let mut app = App::new();
        let _ = app.handle(AppEvent::Connecting { addr: "localhost:2023".into() });
        let actions = app.handle(AppEvent::Interrupt);

        assert_eq!(printed(&actions)[0].content, "Aborting connection!");
        assert_eq!(actions.last(), Some(&AppAction::Exit(ExitStatus::Success)));
    }

    #[test]
    fn second_interrupt_is_ignored() {
        let mut app = connected_app();
        let _ = app.handle(AppEvent::Interrupt);

        assert!(app.handle(AppEvent::Interrupt).is_empty());
        assert!(app.interrupted());
    }

    #[test]
    fn nothing_restarts_after_close() {
        let mut app = connected_app();
        let _ = app.handle(AppEvent::Closed);

        assert!(app.handle(AppEvent::Listening { addr: "0.0.0.0:2023".into() }).is_empty());
        assert!(app.handle(AppEvent::Connected { peer: "x".into() }).is_empty());
        assert!(app.connection_state().is_closed());
    }

    #[test]
    fn resize_requests_redraw() {
        let mut app = App::new();
        assert_eq!(app.handle(AppEvent::Resize(100, 40)), vec![AppAction::Redraw]);
        assert_eq!(app.connection_state(), &ConnectionState::Idle);
    }
}
