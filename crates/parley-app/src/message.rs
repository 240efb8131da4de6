//! Chat messages and the append-only message log.
//!
//! The [`MessageLog`] is the single source of truth for what the screen
//! shows: a full redraw replays it from the first entry, so rendering is a
//! function of the log and the terminal size alone.

/// Severity of a system message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Neutral status (waiting, joining, closed).
    Info,
    /// A lifecycle step succeeded.
    Success,
    /// Recoverable oddity (unknown CLI token, aborted dial).
    Warning,
    /// Connection failure; the session ends.
    Error,
}

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Generated by the application itself.
    System(Level),
    /// Received from the peer.
    Incoming,
    /// Typed locally and sent to the peer.
    Outgoing,
}

/// A single log entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Verbatim message text.
    pub content: String,
    /// Message origin.
    pub origin: Origin,
}

impl Message {
    /// Create a message.
    pub fn new(content: impl Into<String>, origin: Origin) -> Self {
        Self { content: content.into(), origin }
    }

    /// System message with the given severity.
    pub fn system(level: Level, content: impl Into<String>) -> Self {
        Self::new(content, Origin::System(level))
    }

    /// Message received from the peer.
    pub fn incoming(content: impl Into<String>) -> Self {
        Self::new(content, Origin::Incoming)
    }

    /// Message sent to the peer.
    pub fn outgoing(content: impl Into<String>) -> Self {
        Self::new(content, Origin::Outgoing)
    }

    /// Whether the application generated this message.
    pub fn is_system(&self) -> bool {
        matches!(self.origin, Origin::System(_))
    }
}

/// Ordered, append-only record of every message shown this run.
///
/// Insertion order is chronological order is display order. There is no
/// removal API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    entries: Vec<Message>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.entries.push(message);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.entries.get(index)
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    /// Entries in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.entries.iter()
    }

    /// Entries with the given origin, in display order.
    pub fn with_origin(&self, origin: Origin) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter(move |m| m.origin == origin)
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_order() {
        let mut log = MessageLog::new();
        log.push(Message::incoming("a"));
        log.push(Message::outgoing("b"));
        log.push(Message::system(Level::Info, "c"));

        let contents: Vec<_> = log.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["a", "b", "c"]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.last().map(|m| m.origin), Some(Origin::System(Level::Info)));
    }

    #[test]
    fn with_origin_filters() {
        let mut log = MessageLog::new();
        log.push(Message::incoming("a"));
        log.push(Message::outgoing("b"));
        log.push(Message::incoming("c"));

        let incoming: Vec<_> = log.with_origin(Origin::Incoming).map(|m| &m.content).collect();
        assert_eq!(incoming, ["a", "c"]);
    }

    #[test]
    fn system_messages_are_flagged() {
        assert!(Message::system(Level::Error, "boom").is_system());
        assert!(!Message::incoming("hi").is_system());
    }
}
