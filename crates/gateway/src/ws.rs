//! WebSocket fan-out of session lifecycle events.
//!
//! Every subscriber receives the full event stream as JSON frames; each
//! frame carries the session id it belongs to. A subscriber that cannot
//! keep up is skipped past the events it missed, never blocking the
//! session machines.

use {
    axum::{
        extract::{
            State, WebSocketUpgrade,
            ws::{Message, WebSocket},
        },
        response::IntoResponse,
    },
    futures::{SinkExt, StreamExt},
    tokio::sync::broadcast::error::RecvError,
    tracing::{debug, warn},
};

use crate::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut events = state.registry.subscribe();
    let (mut sink, mut stream) = socket.split();
    debug!("event subscriber connected");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let frame = match serde_json::to_string(&event) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "failed to serialize lifecycle event");
                            continue;
                        },
                    };
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscriber lagging, events dropped");
                },
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {},
                Some(Err(_)) => break,
            },
        }
    }
    debug!("event subscriber disconnected");
}
