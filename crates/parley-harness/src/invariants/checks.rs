//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold
//! between events. They verify WHAT must be true, not specific scenarios.

use parley_app::{BAR_BLOCK, BAR_TIP, Level, Origin};

use super::{Invariant, InvariantResult, SessionSnapshot, Violation};

/// Text the session prints when a connection comes up.
const CONNECTED_PREFIX: &str = "Now connected to ";

/// The cursor rests on the input line at the editor's column, and the
/// renderer's cursor model agrees with the screen.
///
/// Every print starts by stepping up from the input line, so a cursor left
/// anywhere else corrupts the next message.
pub struct CursorOnInputLine;

impl Invariant for CursorOnInputLine {
    fn name(&self) -> &'static str {
        "CursorOnInputLine"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.model_cursor != state.screen_cursor {
            return Err(Violation::new(
                self.name(),
                format!(
                    "model cursor {:?} disagrees with screen cursor {:?}",
                    state.model_cursor, state.screen_cursor
                ),
            ));
        }
        if state.screen_cursor != state.input_position {
            return Err(Violation::new(
                self.name(),
                format!(
                    "cursor at {:?}, input line expects {:?}",
                    state.screen_cursor, state.input_position
                ),
            ));
        }
        Ok(())
    }
}

/// The prompt bar sits directly above the input line with a blank spacer
/// row above it.
pub struct PromptLayout;

impl Invariant for PromptLayout {
    fn name(&self) -> &'static str {
        "PromptLayout"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.rows < 2 {
            return Ok(());
        }

        let expected: String = std::iter::once(BAR_TIP)
            .chain(std::iter::repeat_n(BAR_BLOCK, usize::from(state.columns.saturating_sub(1))))
            .collect();
        let bar = state.line(state.rows - 2);
        if bar != expected {
            return Err(Violation::new(
                self.name(),
                format!("row {} is {bar:?}, not the prompt bar", state.rows - 2),
            ));
        }

        if state.rows >= 3 {
            let spacer = state.line(state.rows - 3);
            if !spacer.is_empty() {
                return Err(Violation::new(
                    self.name(),
                    format!("spacer row {} holds {spacer:?}", state.rows - 3),
                ));
            }
        }
        Ok(())
    }
}

/// At most one peer is ever connected.
pub struct SinglePeer;

impl Invariant for SinglePeer {
    fn name(&self) -> &'static str {
        "SinglePeer"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let peers: Vec<_> = state
            .log
            .iter()
            .filter(|m| {
                m.origin == Origin::System(Level::Success)
                    && m.content.starts_with(CONNECTED_PREFIX)
            })
            .map(|m| m.content.as_str())
            .collect();

        if peers.len() > 1 {
            return Err(Violation::new(
                self.name(),
                format!("{} connections established: {peers:?}", peers.len()),
            ));
        }
        Ok(())
    }
}

/// No chat traffic appears after the connection has ended.
pub struct ClosedIsTerminal;

impl Invariant for ClosedIsTerminal {
    fn name(&self) -> &'static str {
        "ClosedIsTerminal"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let Some(end) = state.log.iter().position(|m| {
            (m.origin == Origin::System(Level::Info) && m.content == "Connection closed.")
                || (m.origin == Origin::System(Level::Error) && m.content.starts_with("Error: "))
        }) else {
            return Ok(());
        };

        if let Some(late) = state.log[end + 1..].iter().find(|m| !m.is_system()) {
            return Err(Violation::new(
                self.name(),
                format!("{:?} message {:?} after close", late.origin, late.content),
            ));
        }
        Ok(())
    }
}

/// An exit is only decided once the connection state is closed.
pub struct ExitImpliesClosed;

impl Invariant for ExitImpliesClosed {
    fn name(&self) -> &'static str {
        "ExitImpliesClosed"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        match state.exit {
            Some(status) if !state.state.is_closed() => Err(Violation::new(
                self.name(),
                format!("exit {status:?} decided in state {:?}", state.state),
            )),
            _ => Ok(()),
        }
    }
}
