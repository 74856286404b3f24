use serde_json::Value;
use tracing::warn;

use guestbook_types::Document;
use guestbook_types::models::{GRID_COLUMNS, GRID_ROWS};

/// Inner padding of the canvas element, in pixels.
pub const PADDING: f64 = 10.0;
/// Width of one monospace cell, in pixels.
pub const CHAR_WIDTH: f64 = 8.4;
/// Height of one text line, in pixels.
pub const LINE_HEIGHT: f64 = 16.8;

const BLANK: char = ' ';

/// Fixed-size character grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<char>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::blank()
    }
}

impl Grid {
    pub fn blank() -> Self {
        Self {
            cells: vec![vec![BLANK; GRID_COLUMNS]; GRID_ROWS],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    fn set(&mut self, x: usize, y: usize, c: char) {
        self.cells[y][x] = c;
    }

    pub fn row(&self, y: usize) -> Option<String> {
        self.cells.get(y).map(|row| row.iter().collect())
    }

    /// All rows joined by newlines, as the canvas displays them.
    pub fn render(&self) -> String {
        self.cells
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Copy persisted cells over this grid.
    ///
    /// Only the overlapping region is copied: a smaller persisted grid leaves
    /// the rest blank, a larger one is cut off (with a warning). Rows may be
    /// arrays of one-character strings or plain strings; anything else in a
    /// cell reads as a blank, and a row of any other type is skipped.
    pub fn overlay(&mut self, rows: &[Value]) {
        let mut oversized = rows.len() > GRID_ROWS;

        for (y, row) in rows.iter().take(GRID_ROWS).enumerate() {
            let cells: Vec<char> = match row {
                Value::Array(cells) => cells.iter().map(cell_char).collect(),
                Value::String(s) => s.chars().collect(),
                other => {
                    warn!("Skipping guestbook grid row {} of unexpected type: {}", y, other);
                    continue;
                }
            };
            oversized |= cells.len() > GRID_COLUMNS;

            for (x, c) in cells.into_iter().take(GRID_COLUMNS).enumerate() {
                self.set(x, y, c);
            }
        }

        if oversized {
            warn!(
                "Persisted guestbook grid is larger than {}x{}; extra cells ignored",
                GRID_COLUMNS, GRID_ROWS
            );
        }
    }

    /// Wire form: one array of one-character strings per row.
    pub fn to_document(&self) -> Document {
        let grid = self
            .cells
            .iter()
            .map(|row| Value::Array(row.iter().map(|c| Value::String(c.to_string())).collect()))
            .collect();
        Document::Grid { grid }
    }
}

/// A falsy cell (`""`, `0`, `false`, `null`) is blank; other scalars show
/// their first printed character.
fn cell_char(cell: &Value) -> char {
    match cell {
        Value::String(s) => s.chars().next().unwrap_or(BLANK),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string().chars().next().unwrap_or(BLANK),
        Value::Bool(true) => 't',
        _ => BLANK,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value. Keys the canvas ignores
    /// (Shift, Tab, F1, ...) map to `None`.
    pub fn from_dom(name: &str) -> Option<Self> {
        let key = match name {
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Enter" => Key::Enter,
            "ArrowLeft" => Key::Left,
            "ArrowRight" => Key::Right,
            "ArrowUp" => Key::Up,
            "ArrowDown" => Key::Down,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
        }
    }
}

impl From<Key> for KeyPress {
    fn from(key: Key) -> Self {
        Self::plain(key)
    }
}

/// Grid content plus cursor, driven by key presses and clicks.
#[derive(Debug, Clone, Default)]
pub struct GridEditor {
    grid: Grid,
    cursor: Cursor,
}

impl GridEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid,
            cursor: Cursor::default(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Apply one key press. Returns `true` when grid content changed.
    pub fn press(&mut self, press: KeyPress) -> bool {
        let Cursor { x, y } = &mut self.cursor;
        let last_col = GRID_COLUMNS - 1;
        let last_row = GRID_ROWS - 1;

        match press.key {
            Key::Backspace => {
                if *x > 0 {
                    *x -= 1;
                } else if *y > 0 {
                    *y -= 1;
                    *x = last_col;
                }
                let (cx, cy) = (*x, *y);
                self.grid.set(cx, cy, BLANK);
                true
            }
            Key::Delete => {
                let (cx, cy) = (*x, *y);
                self.grid.set(cx, cy, BLANK);
                true
            }
            Key::Left => {
                *x = x.saturating_sub(1);
                false
            }
            Key::Right => {
                *x = (*x + 1).min(last_col);
                false
            }
            Key::Up => {
                *y = y.saturating_sub(1);
                false
            }
            Key::Down => {
                *y = (*y + 1).min(last_row);
                false
            }
            Key::Enter => {
                if *y < last_row {
                    *y += 1;
                    *x = 0;
                }
                false
            }
            Key::Char(_) if press.ctrl || press.meta => false,
            Key::Char(c) => {
                let (cx, cy) = (*x, *y);
                self.grid.set(cx, cy, c);
                *x += 1;
                if *x > last_col {
                    *x = 0;
                    if *y < last_row {
                        *y += 1;
                    }
                }
                true
            }
        }
    }

    /// Move the cursor to the cell under a click at (`px`, `py`), measured
    /// from the canvas element's top-left corner.
    pub fn click(&mut self, px: f64, py: f64) -> Cursor {
        self.cursor = Cursor {
            x: cell_index(px, CHAR_WIDTH, GRID_COLUMNS),
            y: cell_index(py, LINE_HEIGHT, GRID_ROWS),
        };
        self.cursor
    }

    /// Pixel position where the cursor block is drawn.
    pub fn cursor_offset(&self) -> (f64, f64) {
        (
            PADDING + self.cursor.x as f64 * CHAR_WIDTH,
            PADDING + self.cursor.y as f64 * LINE_HEIGHT,
        )
    }
}

fn cell_index(pixels: f64, cell_size: f64, cells: usize) -> usize {
    let index = ((pixels - PADDING) / cell_size).floor();
    if index.is_nan() || index < 0.0 {
        0
    } else {
        (index as usize).min(cells - 1)
    }
}
