use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of messages kept in a message list; older entries are dropped.
pub const MAX_MESSAGES: usize = 50;
/// Longest stored name, counted in characters before escaping.
pub const MAX_NAME_CHARS: usize = 50;
/// Longest stored text, counted in characters before escaping.
pub const MAX_TEXT_CHARS: usize = 500;
pub const DEFAULT_NAME: &str = "Anonymous";

pub const GRID_COLUMNS: usize = 60;
pub const GRID_ROWS: usize = 18;

/// Which guestbook flavor a deployment runs. A deployment never mixes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Messages,
    Grid,
}

impl Variant {
    /// Top-level key of the persisted document.
    pub fn key(self) -> &'static str {
        match self {
            Variant::Messages => "messages",
            Variant::Grid => "grid",
        }
    }

    pub fn empty_document(self) -> Document {
        match self {
            Variant::Messages => Document::Messages { messages: Vec::new() },
            Variant::Grid => Document::Grid { grid: Vec::new() },
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "messages" => Ok(Variant::Messages),
            "grid" => Ok(Variant::Grid),
            other => Err(format!("unknown guestbook variant '{}'", other)),
        }
    }
}

/// A single guestbook signature.
///
/// Stored `name` and `text` are already HTML-escaped by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub name: String,
    pub text: String,
    pub date: String,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            text: String::new(),
            date: String::new(),
        }
    }
}

/// The single persisted guestbook document.
///
/// Untagged so the wire form is exactly `{"messages": [...]}` or `{"grid": [...]}`.
/// Grid cells stay opaque JSON: the store keeps whatever shape the client sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Document {
    Messages { messages: Vec<Message> },
    Grid { grid: Vec<serde_json::Value> },
}

impl Document {
    pub fn variant(&self) -> Variant {
        match self {
            Document::Messages { .. } => Variant::Messages,
            Document::Grid { .. } => Variant::Grid,
        }
    }

    /// Number of top-level entries (messages or grid rows).
    pub fn len(&self) -> usize {
        match self {
            Document::Messages { messages } => messages.len(),
            Document::Grid { grid } => grid.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
