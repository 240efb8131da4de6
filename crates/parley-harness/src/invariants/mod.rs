//! Session invariants.
//!
//! An invariant is a property of the visible screen and the session state
//! that holds between any two handled events, whatever order keys, resizes
//! and network events arrive in. Checks run against a [`SessionSnapshot`]
//! so they see exactly what a user would see, plus the model behind it.
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! registry.assert_all(&SessionSnapshot::capture(&runtime), "after connect");
//! ```

mod checks;
mod snapshot;

pub use checks::{ClosedIsTerminal, CursorOnInputLine, ExitImpliesClosed, PromptLayout, SinglePeer};
pub use snapshot::SessionSnapshot;

/// Outcome of one check.
pub type InvariantResult = Result<(), Violation>;

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which invariant failed.
    pub invariant: &'static str,
    /// What was observed.
    pub message: String,
}

impl Violation {
    /// Violation of `invariant` described by `message`.
    pub fn new(invariant: &'static str, message: impl Into<String>) -> Self {
        Self { invariant, message: message.into() }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property checked against a [`SessionSnapshot`].
pub trait Invariant: Send + Sync {
    /// Name used in violation reports.
    fn name(&self) -> &'static str;

    /// Check the snapshot.
    fn check(&self, state: &SessionSnapshot) -> InvariantResult;
}

/// Set of invariants checked together.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Registry with no checks.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Every session invariant:
    ///
    /// - [`CursorOnInputLine`]: cursor rests at the editor's column
    /// - [`PromptLayout`]: spacer, bar and input line at the bottom
    /// - [`SinglePeer`]: at most one connection is ever established
    /// - [`ClosedIsTerminal`]: no chat traffic after the connection ended
    /// - [`ExitImpliesClosed`]: exit is only decided in the closed state
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(CursorOnInputLine);
        registry.add(PromptLayout);
        registry.add(SinglePeer);
        registry.add(ClosedIsTerminal);
        registry.add(ExitImpliesClosed);
        registry
    }

    /// Register another check.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Run every check and collect all violations.
    pub fn check_all(&self, state: &SessionSnapshot) -> Result<(), Vec<Violation>> {
        let mut violations = Vec::new();
        for invariant in &self.invariants {
            if let Err(violation) = invariant.check(state) {
                violations.push(violation);
            }
        }

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Names of the registered checks, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.invariants.iter().map(|i| i.name()).collect()
    }

    /// Run every check and panic with all violations and `context`.
    #[allow(clippy::panic, reason = "assertion helper for tests")]
    pub fn assert_all(&self, state: &SessionSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of checks.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_runs_every_check() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.names(), [
            "CursorOnInputLine",
            "PromptLayout",
            "SinglePeer",
            "ClosedIsTerminal",
            "ExitImpliesClosed",
        ]);
    }

    #[test]
    fn empty_snapshot_passes_invariants() {
        let registry = InvariantRegistry::standard();
        let snapshot = SessionSnapshot::default();
        assert!(registry.check_all(&snapshot).is_ok());
    }

    #[test]
    fn violations_are_collected() {
        let mut registry = InvariantRegistry::new();
        registry.add(CursorOnInputLine);
        let mut snapshot = SessionSnapshot::default();
        snapshot.model_cursor.row = 3;

        let violations = registry.check_all(&snapshot).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().starts_with("CursorOnInputLine: "));
    }
}
