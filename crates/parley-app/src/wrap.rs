//! Direction-aware line wrapping.
//!
//! Messages occupy at most half of the terminal width so the two sides of
//! the conversation read as separate columns. [`wrap`] only computes text
//! chunks and their starting column; it never touches the terminal.
//!
//! Widths are `char` counts. Wide glyphs are not measured.

/// Horizontal side a message is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Anchored to column 0 (peer and system messages).
    Left,
    /// Anchored to the right edge (own messages).
    Right,
}

/// One display row of a wrapped message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a> {
    /// Column the row starts at.
    pub column: u16,
    /// Indicator drawn before the text. Only the first row has one.
    pub prefix: Option<&'a str>,
    /// Slice of the original text.
    pub text: &'a str,
}

impl Row<'_> {
    /// Width of the row in columns, prefix included.
    pub fn width(&self) -> usize {
        self.prefix.map_or(0, |p| p.chars().count()) + self.text.chars().count()
    }
}

/// Maximum number of text characters per row for a terminal `columns` wide.
pub fn max_width(columns: u16) -> usize {
    usize::from(columns / 2).max(1)
}

/// Split `text` into rows for a terminal `columns` wide.
///
/// Always returns at least one row; empty text yields a single empty row.
/// Concatenating the `text` of every row gives back `text` exactly.
///
/// Right-anchored rows start at `columns - (row width + indicator)`. The
/// indicator is counted so a wrapped message's `"> "` prefix is never pushed
/// off the right edge.
pub fn wrap<'a>(text: &'a str, columns: u16, side: Side, indicator: &'a str) -> Vec<Row<'a>> {
    let max = max_width(columns);
    let chunks = split_chunks(text, max);
    let indicator_len = indicator.chars().count();

    let line_offset = if chunks.len() > 1 {
        max + indicator_len
    } else {
        text.chars().count() + indicator_len
    };

    let column = match side {
        Side::Left => 0,
        Side::Right => usize::from(columns).saturating_sub(line_offset) as u16,
    };

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| Row {
            column,
            prefix: (i == 0 && !indicator.is_empty()).then_some(indicator),
            text: chunk,
        })
        .collect()
}

/// Split into consecutive slices of at most `max` chars.
fn split_chunks(text: &str, max: usize) -> Vec<&str> {
    if text.is_empty() {
        return vec![""];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == max {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&text[start..]);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_one_row() {
        let rows = wrap("", 80, Side::Left, "");
        assert_eq!(rows, vec![Row { column: 0, prefix: None, text: "" }]);
    }

    #[test]
    fn short_text_is_one_row() {
        let rows = wrap("hello", 80, Side::Left, "> ");
        assert_eq!(rows, vec![Row { column: 0, prefix: Some("> "), text: "hello" }]);
    }

    #[test]
    fn long_text_splits_at_half_width() {
        let rows = wrap("abcdefghij", 8, Side::Left, "");
        let texts: Vec<_> = rows.iter().map(|r| r.text).collect();
        assert_eq!(texts, ["abcd", "efgh", "ij"]);
    }

    #[test]
    fn only_first_row_has_prefix() {
        let rows = wrap("abcdefghij", 8, Side::Left, "> ");
        let prefixes: Vec<_> = rows.iter().map(|r| r.prefix).collect();
        assert_eq!(prefixes, [Some("> "), None, None]);
    }

    #[test]
    fn right_side_single_row_hugs_edge() {
        let rows = wrap("hi", 20, Side::Right, "> ");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].column, 16);
        assert_eq!(usize::from(rows[0].column) + rows[0].width(), 20);
    }

    #[test]
    fn right_side_multi_row_uses_full_half() {
        let rows = wrap("abcdefghijklmno", 20, Side::Right, "> ");
        assert_eq!(rows.len(), 2);
        // max width 10 plus the 2-char indicator
        assert!(rows.iter().all(|r| r.column == 8));
        assert!(rows.iter().all(|r| usize::from(r.column) + r.width() <= 20));
    }

    #[test]
    fn chunks_count_chars_not_bytes() {
        let rows = wrap("ééééé", 4, Side::Left, "");
        let texts: Vec<_> = rows.iter().map(|r| r.text).collect();
        assert_eq!(texts, ["éé", "éé", "é"]);
    }

    #[test]
    fn tiny_terminal_still_makes_progress() {
        let rows = wrap("abc", 1, Side::Right, "");
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.column == 0));
    }
}
