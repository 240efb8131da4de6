//! Terminal-agnostic keyboard input and the line editor.

/// Keyboard input abstraction.
///
/// Decouples the editor from terminal libraries (crossterm, termion, etc.)
/// enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key (submit the line).
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
    /// Ctrl+C.
    Interrupt,
}

/// Result of feeding one key to the [`LineEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Buffer or cursor changed; the input line needs redrawing.
    Edited,
    /// Enter was pressed. Carries the submitted line; the buffer is now empty.
    Submitted(String),
    /// Interrupt requested.
    Interrupt,
    /// Nothing changed.
    Ignored,
}

/// Editable input line.
///
/// The cursor is a char index into the buffer, not a byte offset.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    buffer: String,
    cursor: usize,
}

impl LineEditor {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.buffer.char_indices().nth(char_idx).map_or(self.buffer.len(), |(i, _)| i)
    }

    /// Handle a key.
    pub fn handle_key(&mut self, key: KeyInput) -> EditOutcome {
        match key {
            KeyInput::Char(c) => {
                let idx = self.byte_index(self.cursor);
                self.buffer.insert(idx, c);
                self.cursor += 1;
                EditOutcome::Edited
            },
            KeyInput::Backspace => {
                if self.cursor == 0 {
                    return EditOutcome::Ignored;
                }
                self.cursor -= 1;
                let idx = self.byte_index(self.cursor);
                self.buffer.remove(idx);
                EditOutcome::Edited
            },
            KeyInput::Delete => {
                if self.cursor >= self.len() {
                    return EditOutcome::Ignored;
                }
                let idx = self.byte_index(self.cursor);
                self.buffer.remove(idx);
                EditOutcome::Edited
            },
            KeyInput::Left => self.move_cursor(self.cursor.saturating_sub(1)),
            KeyInput::Right => self.move_cursor((self.cursor + 1).min(self.len())),
            KeyInput::Home => self.move_cursor(0),
            KeyInput::End => self.move_cursor(self.len()),
            KeyInput::Enter => {
                self.cursor = 0;
                EditOutcome::Submitted(std::mem::take(&mut self.buffer))
            },
            KeyInput::Interrupt => EditOutcome::Interrupt,
        }
    }

    fn move_cursor(&mut self, to: usize) -> EditOutcome {
        if to == self.cursor {
            return EditOutcome::Ignored;
        }
        self.cursor = to;
        EditOutcome::Edited
    }

    /// Visible part of the buffer for a line `width` columns wide, and the
    /// cursor column within it.
    ///
    /// Scrolls horizontally so the cursor stays on screen; one column is
    /// kept free for the cursor at the end of the line.
    pub fn view(&self, width: u16) -> (&str, u16) {
        let width = usize::from(width.max(1));
        let start = (self.cursor + 1).saturating_sub(width);
        let begin = self.byte_index(start);
        let end = self.byte_index(start + width);
        (&self.buffer[begin..end], (self.cursor - start) as u16)
    }
}
