use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use guestbook_types::Document;

use crate::error::ClientError;
use crate::transport::Transport;

/// In-memory stand-in for the store. Clones share one document, so several
/// controllers built on clones behave like visitors of the same guestbook.
#[derive(Clone)]
pub struct MemoryTransport {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    document: Value,
    saves: Vec<Document>,
    attempts: usize,
    fail_fetch: bool,
    fail_save: bool,
    save_delay: Option<Duration>,
}

impl MemoryTransport {
    pub fn with_document(document: Value) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                document,
                saves: Vec::new(),
                attempts: 0,
                fail_fetch: false,
                fail_save: false,
                save_delay: None,
            })),
        }
    }

    pub fn messages() -> Self {
        Self::with_document(json!({ "messages": [] }))
    }

    pub fn grid() -> Self {
        Self::with_document(json!({ "grid": [] }))
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.inner.lock().unwrap().fail_fetch = fail;
    }

    pub fn fail_saves(&self, fail: bool) {
        self.inner.lock().unwrap().fail_save = fail;
    }

    pub fn slow_saves(&self, delay: Duration) {
        self.inner.lock().unwrap().save_delay = Some(delay);
    }

    pub fn stored(&self) -> Value {
        self.inner.lock().unwrap().document.clone()
    }

    /// Successful saves, oldest first.
    pub fn saves(&self) -> Vec<Document> {
        self.inner.lock().unwrap().saves.clone()
    }

    pub fn attempts(&self) -> usize {
        self.inner.lock().unwrap().attempts
    }
}

impl Transport for MemoryTransport {
    async fn fetch(&self) -> Result<Value, ClientError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_fetch {
            return Err(ClientError::Status {
                status: 500,
                body: String::new(),
            });
        }
        Ok(inner.document.clone())
    }

    async fn save(&self, document: &Document) -> Result<(), ClientError> {
        let (delay, fail) = {
            let mut inner = self.inner.lock().unwrap();
            inner.attempts += 1;
            (inner.save_delay, inner.fail_save)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(ClientError::Status {
                status: 400,
                body: r#"{"error":"Invalid data"}"#.into(),
            });
        }

        let value = serde_json::to_value(document).map_err(|e| ClientError::Malformed(e.to_string()))?;
        let mut inner = self.inner.lock().unwrap();
        inner.document = value;
        inner.saves.push(document.clone());
        Ok(())
    }
}
