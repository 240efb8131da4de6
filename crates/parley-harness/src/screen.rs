//! In-memory terminal.
//!
//! [`VirtualScreen`] implements [`Screen`] over a grid of cells with the same
//! cursor rules a real terminal follows for the operations the renderer
//! uses: clamped moves, clipped writes and scrolling newlines. Rows pushed
//! off the top are kept as scrollback.

use std::io;

use parley_app::{Cursor, Screen, Style};

/// One character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Character shown.
    pub ch: char,
    /// Style it was written with. `None` for cleared cells.
    pub style: Option<Style>,
}

impl Cell {
    const BLANK: Self = Self { ch: ' ', style: None };
}

/// In-memory screen buffer with scrollback.
#[derive(Debug, Clone)]
pub struct VirtualScreen {
    columns: u16,
    rows: u16,
    grid: Vec<Vec<Cell>>,
    scrollback: Vec<String>,
    cursor: Cursor,
    flushes: usize,
    full_clears: usize,
}

impl VirtualScreen {
    /// Create a blank screen. Dimensions below one are raised to one.
    pub fn new(columns: u16, rows: u16) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            grid: vec![blank_row(columns); usize::from(rows)],
            scrollback: Vec::new(),
            cursor: Cursor::default(),
            flushes: 0,
            full_clears: 0,
        }
    }

    /// Actual cursor position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Visible rows as text, trailing spaces trimmed.
    pub fn lines(&self) -> Vec<String> {
        self.grid.iter().map(|row| row_text(row)).collect()
    }

    /// Visible rows joined with `\n`, with leading and trailing blank rows
    /// removed.
    pub fn contents(&self) -> String {
        let lines = self.lines();
        let first = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
        let last = lines.iter().rposition(|l| !l.is_empty()).map_or(first, |i| i + 1);
        lines[first..last].join("\n")
    }

    /// Text of one visible row, or `None` past the bottom.
    pub fn line(&self, row: u16) -> Option<String> {
        self.grid.get(usize::from(row)).map(|r| row_text(r))
    }

    /// Cell at `(column, row)`.
    pub fn cell(&self, column: u16, row: u16) -> Option<Cell> {
        self.grid.get(usize::from(row))?.get(usize::from(column)).copied()
    }

    /// Every visible cell, row by row.
    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    /// Rows that scrolled off the top, oldest first.
    pub fn scrollback(&self) -> &[String] {
        &self.scrollback
    }

    /// Number of flushes so far.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Number of times screen and scrollback were cleared together.
    pub fn full_clears(&self) -> usize {
        self.full_clears
    }

    fn scroll_up(&mut self) {
        let top = self.grid.remove(0);
        self.scrollback.push(row_text(&top));
        self.grid.push(blank_row(self.columns));
    }

    fn row_mut(&mut self) -> &mut Vec<Cell> {
        let row = usize::from(self.cursor.row);
        &mut self.grid[row]
    }
}

impl Screen for VirtualScreen {
    fn size(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    fn resize(&mut self, columns: u16, rows: u16) {
        let columns = columns.max(1);
        let rows = rows.max(1);

        // Keep the bottom rows, like a terminal shrinking from the top.
        while self.grid.len() > usize::from(rows) {
            let top = self.grid.remove(0);
            self.scrollback.push(row_text(&top));
            self.cursor = self.cursor.up(1);
        }
        while self.grid.len() < usize::from(rows) {
            self.grid.insert(0, blank_row(columns));
            self.cursor.row += 1;
        }
        for row in &mut self.grid {
            row.resize(usize::from(columns), Cell::BLANK);
        }

        self.columns = columns;
        self.rows = rows;
        self.cursor = self.cursor.clamped(columns, rows);
    }

    fn move_up(&mut self, n: u16) -> io::Result<()> {
        self.cursor = self.cursor.up(n);
        Ok(())
    }

    fn move_to_column(&mut self, column: u16) -> io::Result<()> {
        self.cursor = Cursor { column, ..self.cursor }.clamped(self.columns, self.rows);
        Ok(())
    }

    fn move_to(&mut self, column: u16, row: u16) -> io::Result<()> {
        self.cursor = Cursor::new(column, row).clamped(self.columns, self.rows);
        Ok(())
    }

    fn clear_down(&mut self) -> io::Result<()> {
        let column = usize::from(self.cursor.column);
        for cell in &mut self.row_mut()[column..] {
            *cell = Cell::BLANK;
        }
        let below = usize::from(self.cursor.row) + 1;
        for row in &mut self.grid[below..] {
            row.fill(Cell::BLANK);
        }
        Ok(())
    }

    fn clear_line(&mut self) -> io::Result<()> {
        self.row_mut().fill(Cell::BLANK);
        Ok(())
    }

    fn clear_all(&mut self) -> io::Result<()> {
        for row in &mut self.grid {
            row.fill(Cell::BLANK);
        }
        self.scrollback.clear();
        self.full_clears += 1;
        Ok(())
    }

    fn write(&mut self, text: &str, style: Style) -> io::Result<()> {
        let columns = usize::from(self.columns);
        let start = usize::from(self.cursor.column);
        let mut written = 0;
        for (offset, ch) in text.chars().enumerate() {
            let column = start + offset;
            if column >= columns {
                break;
            }
            self.row_mut()[column] = Cell { ch, style: Some(style) };
            written += 1;
        }
        self.cursor = self.cursor.advanced(written, self.columns);
        Ok(())
    }

    fn newline(&mut self) -> io::Result<()> {
        if self.cursor.row + 1 >= self.rows {
            self.scroll_up();
            self.cursor.column = 0;
        } else {
            self.cursor = self.cursor.next_line(self.rows);
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

fn blank_row(columns: u16) -> Vec<Cell> {
    vec![Cell::BLANK; usize::from(columns)]
}

fn row_text(row: &[Cell]) -> String {
    let text: String = row.iter().map(|c| c.ch).collect();
    text.trim_end().to_string()
}
