use serde::Deserialize;

use guestbook_types::Message;
use guestbook_types::models::{DEFAULT_NAME, MAX_NAME_CHARS, MAX_TEXT_CHARS};

/// Timestamp format used when a message arrives without a date.
pub const SERVER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A message exactly as a client sent it. Absent and `null` fields are `None`.
#[derive(Debug, Default, Deserialize)]
pub struct RawMessage {
    pub name: Option<String>,
    pub text: Option<String>,
    pub date: Option<String>,
}

/// Apply defaults, truncate, then escape. Runs on every write.
///
/// Escaping is not undone on read, so a client that re-submits text it got
/// from the store will have it escaped a second time.
pub fn sanitize_message(raw: RawMessage, now: &str) -> Message {
    let name = raw.name.unwrap_or_else(|| DEFAULT_NAME.to_string());
    let text = raw.text.unwrap_or_default();

    Message {
        name: escape_html(truncate_chars(&name, MAX_NAME_CHARS)),
        text: escape_html(truncate_chars(&text, MAX_TEXT_CHARS)),
        date: raw.date.unwrap_or_else(|| now.to_string()),
    }
}

/// First `max` characters of `s` (Unicode scalar values, not bytes).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Entity-escape `& < > " '`.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
