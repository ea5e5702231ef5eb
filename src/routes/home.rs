//! Handlers for the color-themed home page and the color report.

use axum::{
    extract::{Query, State},
    response::Html,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::insert_page_context;
use crate::error::{AppErrorResponse, ResultExt};
use crate::middleware::RequestId;
use crate::state::AppState;

/// Optional per-request color override
#[derive(Debug, Default, Deserialize)]
pub struct ColorQuery {
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ColorResponse {
    pub color: String,
}

/// Home page rendered in the configured color, or `?color=` if allowed.
#[instrument(name = "home::index", skip(state, request_id))]
pub async fn index(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<ColorQuery>,
) -> Result<Html<String>, AppErrorResponse> {
    let color = state
        .colors
        .resolve(query.color.as_deref())
        .with_request_id(&request_id)?;

    let mut context = tera::Context::new();
    insert_page_context(&mut context);
    context.insert("color", &color);
    context.insert("default_color", state.colors.current_color());
    context.insert("allowed_colors", &state.colors.allowed_colors());

    let html = state
        .tera
        .render("home.html", &context)
        .with_request_id(&request_id)?;
    Ok(Html(html))
}

#[instrument(name = "home::color", skip(state, request_id))]
pub async fn color(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<ColorQuery>,
) -> Result<Json<ColorResponse>, AppErrorResponse> {
    let color = state
        .colors
        .resolve(query.color.as_deref())
        .with_request_id_json(&request_id)?;
    Ok(Json(ColorResponse { color }))
}
