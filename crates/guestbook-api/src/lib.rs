pub mod error;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use routes::AppState;

/// Largest request body accepted for a write.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024; // 32 MB

/// Build the guestbook router with [`DEFAULT_MAX_BODY_BYTES`].
pub fn router(state: AppState, route: &str) -> Router {
    router_with_body_limit(state, route, DEFAULT_MAX_BODY_BYTES)
}

/// Build the guestbook router: one path, dispatched on method.
///
/// Every response is declared JSON and carries permissive CORS headers, the
/// way the browser page expects when it talks to the endpoint cross-origin.
/// `CorsLayer` answers every OPTIONS request itself with an empty 200, so no
/// handler is routed for it.
pub fn router_with_body_limit(state: AppState, route: &str, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(false);

    Router::new()
        .route(
            route,
            get(routes::read_document)
                .post(routes::write_document)
                .fallback(routes::method_not_allowed),
        )
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(always(CONTENT_TYPE, "application/json"))
        .layer(always(ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .layer(always(ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .layer(always(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Add `name: value` to responses that don't already carry `name`.
fn always(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}
