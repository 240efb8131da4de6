//! Property-based tests for whole sessions.
//!
//! Tests verify that invariants hold under arbitrary interleavings of
//! network and terminal events, driving the production runtime step by step.

use parley_app::{AppEvent, KeyInput, Renderer, Role, Runtime, Screen};
use parley_harness::{InvariantRegistry, SessionSnapshot, SimDriver, SimRuntime, VirtualScreen};
use proptest::prelude::*;

/// Generate random printable characters for input.
fn printable_char() -> impl Strategy<Value = char> {
    prop::char::range(' ', '~')
}

/// Generate random key inputs.
fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => printable_char().prop_map(KeyInput::Char),
        2 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Right),
        1 => Just(KeyInput::Home),
        1 => Just(KeyInput::End),
        1 => Just(KeyInput::Interrupt),
    ]
}

/// Generate random app events from both sources.
fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        8 => key_strategy().prop_map(AppEvent::Key),
        4 => "[a-z \n\r\t]{0,80}".prop_map(|s| AppEvent::Data(s.into_bytes())),
        1 => Just(AppEvent::Connected { peer: "127.0.0.1:50000".into() }),
        1 => Just(AppEvent::Closed),
        1 => Just(AppEvent::Errored { message: "connection reset".into() }),
        1 => (10u16..100, 6u16..40).prop_map(|(c, r)| AppEvent::Resize(c, r)),
    ]
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Host { port: 2023 }),
        Just(Role::Peer { host: "localhost".into(), port: 2023 }),
    ]
}

/// Visible rows above the input line after a full redraw of the same log.
fn redrawn_rows(runtime: &SimRuntime) -> Vec<String> {
    let (columns, rows) = runtime.renderer().screen().size();
    let mut renderer = Renderer::new(VirtualScreen::new(columns, rows));
    for message in runtime.renderer().log() {
        renderer.print_message(message.clone(), false).unwrap();
    }
    renderer.full_redraw().unwrap();
    above_input(renderer.screen())
}

fn above_input(screen: &VirtualScreen) -> Vec<String> {
    let mut lines = screen.lines();
    lines.pop();
    lines
}

/// Drive a session step by step, calling `check` after each step.
fn drive(
    role: Role,
    events: Vec<AppEvent>,
    mut check: impl FnMut(&SimRuntime, usize) -> Result<(), TestCaseError>,
) -> Result<(), TestCaseError> {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    rt.block_on(async {
        let mut runtime = Runtime::new(SimDriver::scripted(events), VirtualScreen::new(60, 16), role);
        runtime.start().await.unwrap();
        check(&runtime, 0)?;

        for step in 1.. {
            let exit = runtime.step().await.unwrap();
            check(&runtime, step)?;
            if exit.is_some() {
                break;
            }
        }
        runtime.finish().await.unwrap();
        Ok(())
    })
}

proptest! {
    /// Session invariants hold under arbitrary event sequences.
    #[test]
    fn prop_session_invariants_hold(
        role in role_strategy(),
        events in prop::collection::vec(event_strategy(), 0..60),
    ) {
        let invariants = InvariantRegistry::standard();

        drive(role, events, |runtime, step| {
            let snapshot = SessionSnapshot::capture(runtime);
            let result = invariants.check_all(&snapshot);
            prop_assert!(result.is_ok(), "step {}: {:?}", step, result);
            Ok(())
        })?;
    }

    /// Incremental printing leaves the screen exactly as a full redraw of
    /// the same log would.
    #[test]
    fn prop_incremental_matches_full_redraw(
        role in role_strategy(),
        events in prop::collection::vec(event_strategy(), 0..60),
    ) {
        drive(role, events, |runtime, step| {
            let shown = above_input(runtime.renderer().screen());
            let expected = redrawn_rows(runtime);
            prop_assert_eq!(shown, expected, "step {}", step);
            Ok(())
        })?;
    }

    /// The exit status is decided once and never changes.
    #[test]
    fn prop_exit_decided_once(
        role in role_strategy(),
        events in prop::collection::vec(event_strategy(), 0..60),
    ) {
        let mut decided = None;
        drive(role, events, |runtime, step| {
            let exit = runtime.app().exit_status();
            if let Some(previous) = decided {
                prop_assert_eq!(exit, Some(previous), "step {}", step);
            }
            decided = exit;
            Ok(())
        })?;
    }
}
