use serde_json::Value;
use thiserror::Error;

use guestbook_types::models::MAX_MESSAGES;
use guestbook_types::{Document, Variant};

use crate::sanitize::{RawMessage, sanitize_message};

/// Why a submitted body was refused. The stored document is untouched in
/// every case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("body is not valid JSON")]
    Malformed,
    #[error("body is not a JSON object")]
    NotAnObject,
    #[error("missing '{0}' key")]
    MissingKey(&'static str),
    #[error("'{0}' is not an array")]
    NotAnArray(&'static str),
    #[error("entry {0} is not a valid message")]
    BadEntry(usize),
}

/// Turn a raw request body into the document to persist.
///
/// Messages are sanitized and cut down to the most recent [`MAX_MESSAGES`];
/// grids pass through as sent.
pub fn accept(variant: Variant, payload: &[u8], now: &str) -> Result<Document, Rejection> {
    let value: Value = serde_json::from_slice(payload).map_err(|_| Rejection::Malformed)?;
    let Value::Object(mut body) = value else {
        return Err(Rejection::NotAnObject);
    };

    let key = variant.key();
    let entries = match body.remove(key) {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(Rejection::NotAnArray(key)),
        None => return Err(Rejection::MissingKey(key)),
    };

    match variant {
        Variant::Grid => Ok(Document::Grid { grid: entries }),
        Variant::Messages => {
            let skip = entries.len().saturating_sub(MAX_MESSAGES);
            let mut messages = Vec::with_capacity(entries.len() - skip);
            for (index, entry) in entries.into_iter().enumerate().skip(skip) {
                let raw: RawMessage =
                    serde_json::from_value(entry).map_err(|_| Rejection::BadEntry(index))?;
                messages.push(sanitize_message(raw, now));
            }
            Ok(Document::Messages { messages })
        }
    }
}
