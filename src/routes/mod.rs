//! HTTP route handlers.
//!
//! The endpoint table is fixed: the themed home page, the color and failure-flag
//! reports, the message form and listing, and the two probes. Responses default to
//! `Cache-Control: no-store`; handlers that serve cacheable markup set their own value.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod db;
pub mod health;
pub mod home;
pub mod issue;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_DYNAMIC;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Insert the values every page template expects.
pub fn insert_page_context(context: &mut tera::Context) {
    context.insert("site_name", env!("CARGO_PKG_NAME"));
    context.insert("version", env!("CARGO_PKG_VERSION"));
}

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(home::index))
        .route("/test_db", get(db::form).post(db::submit));

    let api_routes = Router::new()
        .route("/color", get(home::color))
        .route("/db_message", get(db::list))
        .route("/issue", get(issue::issue));

    // Probes - always fresh
    let health_routes = Router::new()
        .route("/healthz", get(health::liveness))
        .route("/healthx", get(health::readiness));

    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .merge(health_routes)
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_DYNAMIC),
        ))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
