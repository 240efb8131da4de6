//! Deterministic simulation harness for Parley session testing.
//!
//! In-memory implementations of the [`parley_app::Screen`] and
//! [`parley_app::Driver`] traits so the production [`parley_app::Runtime`]
//! can be exercised without a terminal or a socket.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true after every handled event, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! screen and session invariants, and [`run_checked`] to check them after
//! every step of a simulated session.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod screen;
pub mod sim_driver;

pub use invariants::{
    ClosedIsTerminal, CursorOnInputLine, ExitImpliesClosed, Invariant, InvariantRegistry,
    InvariantResult, PromptLayout, SessionSnapshot, SinglePeer, Violation,
};
pub use screen::{Cell, VirtualScreen};
pub use sim_driver::{SimDriver, SimDriverError};

use parley_app::{ExitStatus, Runtime};

/// Runtime over the simulation driver and the virtual screen.
pub type SimRuntime = Runtime<SimDriver, VirtualScreen>;

/// Run a simulated session to completion, checking every invariant in
/// `registry` after each handled event.
///
/// # Panics
///
/// Panics on the first invariant violation, with the step number as context.
pub async fn run_checked(
    runtime: &mut SimRuntime,
    registry: &InvariantRegistry,
) -> Result<ExitStatus, SimDriverError> {
    runtime.start().await?;
    registry.assert_all(&SessionSnapshot::capture(runtime), "after start");

    let mut step = 0usize;
    let status = loop {
        step += 1;
        let exit = runtime.step().await?;
        registry.assert_all(&SessionSnapshot::capture(runtime), &format!("after step {step}"));
        if let Some(status) = exit {
            break status;
        }
    };

    tracing::debug!(steps = step, ?status, "simulated session finished");
    runtime.finish().await?;
    Ok(status)
}
