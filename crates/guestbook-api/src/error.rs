use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use guestbook_store::Rejection;
use guestbook_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid data: {0}")]
    InvalidData(#[from] Rejection),
    #[error("unreadable request body: {0}")]
    UnreadableBody(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidData(rejection) => {
                warn!("Rejected guestbook write: {}", rejection);
                (StatusCode::BAD_REQUEST, "Invalid data")
            }
            ApiError::UnreadableBody(reason) => {
                warn!("Rejected guestbook write: {}", reason);
                (StatusCode::BAD_REQUEST, "Invalid data")
            }
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            ApiError::Storage(e) => {
                error!("Guestbook storage error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage failure")
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
