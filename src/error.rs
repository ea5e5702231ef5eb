//! Application error type and its HTTP rendering.
//!
//! Handlers return `AppErrorResponse`, which pairs an `AppError` with the request id
//! and the response format of the endpoint (HTML page or JSON body).

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::json;

use crate::middleware::RequestId;
use crate::services::{InvalidColor, MessageError};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    InvalidColor(#[from] InvalidColor),

    #[error("{0}")]
    Validation(String),

    #[error("Template rendering error: {0}")]
    Template(#[from] tera::Error),
}

impl From<MessageError> for AppError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Validation(msg) => AppError::Validation(msg),
            MessageError::Store(e) => AppError::Store(e),
        }
    }
}

impl AppError {
    /// Status code and the message that is safe to show to the client.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(_) | AppError::InvalidColor(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Store(StoreError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Document store unavailable".to_string(),
            ),
            AppError::Store(StoreError::Write(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Message could not be saved".to_string(),
            ),
            AppError::Template(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    Html,
    Json,
}

/// An error bound to the request that produced it
#[derive(Debug)]
pub struct AppErrorResponse {
    pub error: AppError,
    pub request_id: RequestId,
    pub format: ErrorFormat,
}

impl IntoResponse for AppErrorResponse {
    fn into_response(self) -> Response {
        let (status, message) = self.error.status_and_message();
        let request_id = self.request_id.0;

        if status.is_server_error() {
            tracing::error!(%request_id, error = %self.error, "Request failed");
        } else {
            tracing::debug!(%request_id, error = %self.error, "Request rejected");
        }

        match self.format {
            ErrorFormat::Json => (
                status,
                Json(json!({
                    "error": message,
                    "request_id": request_id.to_string(),
                })),
            )
                .into_response(),
            ErrorFormat::Html => {
                let body = format!(
                    r#"<!DOCTYPE html>
<html>
<head>
    <title>Error {status}</title>
</head>
<body>
    <div class="container">
        <div class="error-page">
            <h1>Error {status}</h1>
            <p>{message}</p>
            <p class="request-id">Request {request_id}</p>
            <a href="/">Return to homepage</a>
        </div>
    </div>
</body>
</html>"#,
                    status = status.as_u16(),
                    message = escape_html(&message),
                    request_id = request_id,
                );
                (status, Html(body)).into_response()
            }
        }
    }
}

/// Attach the request id (and response format) to a handler error
pub trait ResultExt<T> {
    /// For HTML pages
    fn with_request_id(self, request_id: &RequestId) -> Result<T, AppErrorResponse>;

    /// For JSON endpoints
    fn with_request_id_json(self, request_id: &RequestId) -> Result<T, AppErrorResponse>;
}

impl<T, E: Into<AppError>> ResultExt<T> for Result<T, E> {
    fn with_request_id(self, request_id: &RequestId) -> Result<T, AppErrorResponse> {
        self.map_err(|e| AppErrorResponse {
            error: e.into(),
            request_id: request_id.clone(),
            format: ErrorFormat::Html,
        })
    }

    fn with_request_id_json(self, request_id: &RequestId) -> Result<T, AppErrorResponse> {
        self.map_err(|e| AppErrorResponse {
            error: e.into(),
            request_id: request_id.clone(),
            format: ErrorFormat::Json,
        })
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn respond(error: AppError, format: ErrorFormat) -> Response {
        AppErrorResponse {
            error,
            request_id: RequestId(Uuid::new_v4()),
            format,
        }
        .into_response()
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Validation("empty".into()), StatusCode::BAD_REQUEST),
            (
                AppError::InvalidColor(InvalidColor("pink".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Store(StoreError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Store(StoreError::Write("rejected".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Template(tera::Error::msg("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(respond(error, ErrorFormat::Json).status(), status);
        }
    }

    #[test]
    fn test_store_details_are_not_exposed() {
        let (_, message) =
            AppError::Store(StoreError::Unavailable("mongo:27017 auth admin".into()))
                .status_and_message();
        assert!(!message.contains("admin"));
    }

    #[test]
    fn test_message_error_conversion() {
        let err: AppError = MessageError::Validation("required".into()).into();
        assert!(matches!(err, AppError::Validation(_)));
        let err: AppError = MessageError::Store(StoreError::Write("x".into())).into();
        assert!(matches!(err, AppError::Store(StoreError::Write(_))));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"x\" & y</b>"), "&lt;b&gt;&quot;x&quot; &amp; y&lt;/b&gt;");
    }
}
