use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("message text is empty")]
    EmptyText,
    #[error("no guestbook entry at position {0}")]
    NoSuchEntry(usize),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected guestbook document: {0}")]
    Malformed(String),
}

impl ClientError {
    /// Text shown to the visitor in an alert.
    pub fn alert_text(&self) -> &'static str {
        match self {
            ClientError::EmptyText => "Please write a message first!",
            ClientError::NoSuchEntry(_) => "That entry no longer exists.",
            ClientError::Http(_) | ClientError::Status { .. } | ClientError::Malformed(_) => {
                "Could not save the guestbook. Please try again."
            }
        }
    }
}
