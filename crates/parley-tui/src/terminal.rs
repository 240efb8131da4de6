//! Terminal driver for the chat.
//!
//! Implements the [`Driver`] trait over the TCP [`ConnectionManager`],
//! crossterm keyboard and resize events, and SIGINT.

use std::io;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use parley_app::{AppEvent, Driver, KeyInput, Role};
use thiserror::Error;
use tokio::signal::unix::{Signal, SignalKind, signal};

use crate::transport::{ConnectionManager, TransportError};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Network events win ties, so bytes already received are shown before a
/// key that arrived at the same time.
pub struct TerminalDriver {
    net: ConnectionManager,
    events: EventStream,
    /// SIGINT, installed once for the life of the driver.
    interrupts: Signal,
}

impl TerminalDriver {
    /// Create a driver with no connection yet and install the SIGINT
    /// handler.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            net: ConnectionManager::new(),
            events: EventStream::new(),
            interrupts: interrupt_signal()?,
        })
    }

    /// Connection manager.
    pub fn connection(&self) -> &ConnectionManager {
        &self.net
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn start(&mut self, role: &Role) -> AppEvent {
        self.net.start(role).await
    }

    async fn next_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        loop {
            tokio::select! {
                biased;

                Some(event) = self.net.next_event() => return Ok(Some(event.into())),

                Some(()) = self.interrupts.recv() => {
                    tracing::debug!("SIGINT");
                    return Ok(Some(AppEvent::Interrupt));
                }

                maybe_event = self.events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if let Some(event) = convert_event(&event) {
                            return Ok(Some(event));
                        }
                    },
                    Some(Err(e)) => return Err(TerminalError::Io(e)),
                    None => return Ok(None),
                },
            }
        }
    }

    fn send(&mut self, bytes: Vec<u8>) -> Result<(), Self::Error> {
        Ok(self.net.send(bytes)?)
    }

    fn close(&mut self, graceful: bool) {
        self.net.close(graceful);
    }

    fn stop_listening(&mut self) {
        self.net.stop_listening();
    }

    async fn shutdown(&mut self) {
        self.net.shutdown().await;
    }
}

/// SIGINT stream. Once installed, SIGINT no longer terminates the process.
fn interrupt_signal() -> io::Result<Signal> {
    signal(SignalKind::interrupt())
}

/// Convert a crossterm event into an app event. Key releases, repeats of
/// unbound keys and other events are dropped.
fn convert_event(event: &Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => convert_key(key).map(AppEvent::Key),
        Event::Resize(columns, rows) => Some(AppEvent::Resize(*columns, *rows)),
        _ => None,
    }
}

fn convert_key(key: &KeyEvent) -> Option<KeyInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'C') => Some(KeyInput::Interrupt),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Backspace => Some(KeyInput::Backspace),
        KeyCode::Delete => Some(KeyInput::Delete),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Home => Some(KeyInput::Home),
        KeyCode::End => Some(KeyInput::End),
        _ => None,
    }
}
