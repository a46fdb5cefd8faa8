use std::convert::Infallible;
use std::sync::Arc;

use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::services::ViewerHub;

#[derive(Clone)]
pub struct StreamState {
    pub viewer_hub: Arc<ViewerHub>,
}

pub fn stream_router(stream_state: StreamState) -> Router {
    Router::new()
        .route("/ws/patients", get(ws_handler))
        .route("/api/events", get(sse_handler))
        .with_state(stream_state)
}

#[utoipa::path(
    get,
    path = "/ws/patients",
    tag = "stream",
    responses(
        (status = 101, description = "Upgraded; the latest snapshot followed by one snapshot per tick"),
        (status = 400, description = "Not a WebSocket handshake")
    )
)]
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<StreamState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

async fn handle_websocket(socket: WebSocket, state: StreamState) {
    let (mut sender, mut receiver) = socket.split();
    let (viewer_id, mut frames) = state.viewer_hub.subscribe().await;

    tracing::info!("WebSocket viewer {} connected", viewer_id);

    let send_task = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if sender.send(WsMessage::Text(frame.to_string())).await.is_err() {
                break;
            }
        }
        tracing::debug!("WebSocket viewer {} send task ended", viewer_id);
    });

    // Viewers are passive, anything but a close frame is ignored
    while let Some(result) = receiver.next().await {
        match result {
            Ok(WsMessage::Close(_)) => {
                tracing::info!("WebSocket viewer {} closed", viewer_id);
                break;
            }
            Err(e) => {
                tracing::warn!("WebSocket error for viewer {}: {}", viewer_id, e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    state.viewer_hub.unsubscribe(&viewer_id).await;

    tracing::info!("WebSocket viewer {} disconnected", viewer_id);
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "stream",
    responses(
        (status = 200, description = "Event stream, one snapshot per event")
    )
)]
pub async fn sse_handler(
    State(state): State<StreamState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (viewer_id, frames) = state.viewer_hub.subscribe().await;

    tracing::info!("SSE viewer {} connected", viewer_id);

    // A closed stream drops the receiver, the hub forgets the viewer on its next publish
    let stream = UnboundedReceiverStream::new(frames)
        .map(|frame| Ok(Event::default().data(&*frame)));

    Sse::new(stream).keep_alive(KeepAlive::default())
}
