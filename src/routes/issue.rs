//! Simulated failure report.
//!
//! The flag comes from configuration; the service never detects or sets it itself.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub fail: bool,
}

pub async fn issue(State(state): State<AppState>) -> Json<IssueResponse> {
    let fail = state.config.fail_flag;
    if fail {
        tracing::warn!("Reporting simulated failure");
    }
    Json(IssueResponse { fail })
}
