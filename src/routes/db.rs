//! Handlers for the message form, message submission and the message listing.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    Extension, Form, Json,
};
use http::header::CACHE_CONTROL;
use serde::Deserialize;
use tracing::instrument;

use super::insert_page_context;
use crate::config::{CACHE_CONTROL_FORM, MAX_MESSAGE_LENGTH};
use crate::error::{AppErrorResponse, ResultExt};
use crate::middleware::RequestId;
use crate::state::AppState;
use crate::store::Message;

/// Form data for a new message
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    /// A missing field is treated like an empty one
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    /// Id of the message saved by the previous submission
    pub saved: Option<String>,
}

/// Submission form. Does not touch the store.
#[instrument(name = "db::form", skip(state, request_id))]
pub async fn form(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<FormQuery>,
) -> Result<impl IntoResponse, AppErrorResponse> {
    let mut context = tera::Context::new();
    insert_page_context(&mut context);
    context.insert("saved", &query.saved);
    context.insert("max_length", &MAX_MESSAGE_LENGTH);

    let html = state
        .tera
        .render("test_db.html", &context)
        .with_request_id(&request_id)?;
    Ok(([(CACHE_CONTROL, CACHE_CONTROL_FORM)], Html(html)))
}

/// Store a message, then redirect back to the form.
#[instrument(name = "db::submit", skip(state, request_id, form))]
pub async fn submit(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Form(form): Form<SubmitForm>,
) -> Result<Redirect, AppErrorResponse> {
    let message = state
        .messages
        .submit(&form.text)
        .await
        .with_request_id(&request_id)?;

    Ok(Redirect::to(&format!("/test_db?saved={}", message.id)))
}

/// All stored messages, oldest first.
#[instrument(name = "db::list", skip(state, request_id))]
pub async fn list(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Json<Vec<Message>>, AppErrorResponse> {
    let messages = state
        .messages
        .list()
        .await
        .with_request_id_json(&request_id)?;
    Ok(Json(messages))
}
