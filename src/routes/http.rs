// GET /version and POST /rpc

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::dispatch::{self, Request};
use crate::version::{NAME, VERSION};

/// GET /version: service name, version and the node this agent serves.
pub(super) async fn version_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
        "node": state.runtime.node_name(),
    }))
}

/// POST /rpc: run one inspector request against this node. Malformed arguments
/// answer 400 with the reason as plain text.
pub(super) async fn rpc_handler(
    State(state): State<AppState>,
    Json(request): Json<Request>,
) -> Response {
    let runtime = state.runtime.clone();
    let op = request.operation();
    match tokio::task::spawn_blocking(move || dispatch::execute(runtime.as_ref(), request)).await {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(e)) => {
            tracing::debug!(operation = op, error = %e, "rpc rejected");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::warn!(operation = op, error = %e, "rpc task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "rpc task failed").into_response()
        }
    }
}
