// WebSocket usage stream

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use tokio::time::{Duration, Instant, timeout};

use super::AppState;
use crate::pipeline;
use crate::runtime::NodeRuntime;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_usage(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let runtime = state.runtime.clone();
    let interval_ms = state.config.publishing.usage_frequency_ms;
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_usage(socket, runtime, interval_ms).await {
            tracing::info!("Usage stream error: {}", e);
        }
    })
}

async fn stream_usage(
    mut socket: WebSocket,
    runtime: Arc<dyn NodeRuntime>,
    interval_ms: u64,
) -> anyhow::Result<()> {
    tracing::info!("Client connected to usage stream");
    let mut tick = tokio::time::interval(Duration::from_millis(interval_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First ping only after a full interval so the first frame is always data.
    let mut ping_interval =
        tokio::time::interval_at(Instant::now() + WS_PING_INTERVAL, WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                let rt = runtime.clone();
                let usage = tokio::task::spawn_blocking(move || pipeline::fetch_system_usage(rt.as_ref())).await?;
                let json = serde_json::to_string(&usage)?;
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
