//! Local web preview of the overlay.
//!
//! Serves a single page that draws each published frame, plus JSON
//! snapshots of the current frame and pipeline counters.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

use crate::controller::OverlayFrame;
use crate::error::{OverlayError, Result};
use crate::live_status::LiveStatus;
use crate::pipeline::PipelineHandle;

pub fn router(handle: PipelineHandle) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/frame", get(frame_handler))
        .route("/status", get(status_handler))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(handle)
}

/// Bind `0.0.0.0:port` and serve in the background.
pub async fn start_preview(handle: PipelineHandle, port: u16) -> Result<JoinHandle<()>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| OverlayError::Internal(format!("binding preview on {}: {}", addr, e)))?;
    log::info!("[preview] serving overlay preview at http://{}", addr);

    let app = router(handle);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("[preview] server stopped: {}", e);
        }
    }))
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("overlay_preview.html"))
}

async fn frame_handler(State(handle): State<PipelineHandle>) -> Json<OverlayFrame> {
    Json(handle.frame())
}

async fn status_handler(
    State(handle): State<PipelineHandle>,
) -> std::result::Result<Json<LiveStatus>, (StatusCode, String)> {
    handle
        .status()
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn ws_handler(ws: WebSocketUpgrade, State(handle): State<PipelineHandle>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, handle))
}

async fn handle_socket(socket: WebSocket, handle: PipelineHandle) {
    let (mut sender, mut receiver) = socket.split();
    let mut frames = handle.subscribe();

    let mut push = tokio::spawn(async move {
        loop {
            let frame = frames.borrow_and_update().clone();
            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(e) => {
                    log::error!("[preview] could not encode frame: {}", e);
                    break;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
            // Sender side dropped means the pipeline is gone.
            if frames.changed().await.is_err() {
                break;
            }
        }
    });

    let mut drain = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut push => drain.abort(),
        _ = &mut drain => push.abort(),
    }
    log::debug!("[preview] websocket client disconnected");
}
