//! Dashboard metrics and the demo reset hook.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use loadbridge_core::metrics::CallMetrics;
use serde::Serialize;
use tracing::{error, info};

use crate::envelope::plain_error;
use crate::state::{correlation_id, AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/metrics/reset", post(reset))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub calls_cleared: u64,
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.call_log.list().await {
        Ok(records) => Json(CallMetrics::from_records(&records)).into_response(),
        Err(error) => {
            error!(
                event_name = "metrics.read.failed",
                correlation_id = %correlation_id(),
                error = %error,
                "could not read call log"
            );
            plain_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not read call log")
        }
    }
}

/// Call log and booking state are cleared together so the dashboard and the
/// load board never disagree after a reset.
async fn reset(State(state): State<AppState>) -> Response {
    let calls_cleared = match state.call_log.clear().await {
        Ok(count) => count,
        Err(error) => {
            error!(
                event_name = "metrics.reset.failed",
                correlation_id = %correlation_id(),
                error = %error,
                "could not clear call log"
            );
            return plain_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not clear call log");
        }
    };
    state.board.reset();

    info!(event_name = "metrics.reset.completed", calls_cleared, "metrics and booking data reset");
    Json(ResetResponse {
        status: "success",
        message: "All metrics and booking data have been reset",
        calls_cleared,
    })
    .into_response()
}
