use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, extract::rejection::BytesRejection};
use serde_json::Value;
use tracing::info;

use guestbook_store::DocumentStore;
use guestbook_store::sanitize::SERVER_DATE_FORMAT;
use guestbook_types::api::{HealthResponse, SaveResponse};

use crate::error::ApiError;

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
}

impl AppState {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// GET — current document, verbatim.
pub async fn read_document(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.store.read().await?))
}

/// POST — validate and overwrite the whole document.
///
/// The body is taken as raw bytes so malformed JSON, an over-limit body
/// and a wrong shape all get the same `Invalid data` answer.
pub async fn write_document(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let body = body.map_err(|e| ApiError::UnreadableBody(e.body_text()))?;
    let now = chrono::Utc::now().format(SERVER_DATE_FORMAT).to_string();
    let document = state.store.accept(&body, &now)?;
    state.store.replace(&document).await?;
    info!("Saved guestbook ({} {} entries)", document.len(), document.variant());
    Ok(Json(SaveResponse::ok()))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}
