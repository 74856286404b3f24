use std::future::Future;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use guestbook_types::Document;

use crate::error::ClientError;

/// How a controller reaches the guestbook store.
///
/// Every save sends the entire document; there are no partial updates.
pub trait Transport: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Value, ClientError>> + Send;

    fn save(&self, document: &Document) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// [`Transport`] over the store's HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self) -> Result<Value, ClientError> {
        let resp = self.client.get(&self.url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(resp.json().await?)
    }

    async fn save(&self, document: &Document) -> Result<(), ClientError> {
        let resp = self.client.post(&self.url).json(document).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        debug!("Saved {} {} entries to {}", document.len(), document.variant(), self.url);
        Ok(())
    }
}
