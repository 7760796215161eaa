// Agent HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::runtime::NodeRuntime;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) runtime: Arc<dyn NodeRuntime>,
    pub(crate) config: AppConfig,
}

pub fn app(runtime: Arc<dyn NodeRuntime>, config: AppConfig) -> Router {
    let state = AppState { runtime, config };
    Router::new()
        .route("/", get(|| async { "nodescope agent" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/rpc", post(http::rpc_handler)) // POST /rpc
        .route("/ws/usage", get(ws::ws_usage)) // WS /ws/usage
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
