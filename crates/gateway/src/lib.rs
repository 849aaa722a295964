//! HTTP and WebSocket surface: session administration, message dispatch,
//! and lifecycle event fan-out.

pub mod error;
pub mod routes;
pub mod ws;

use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        routing::{delete, get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use {waygate_outbound::Dispatcher, waygate_session::SessionRegistry};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub registry: SessionRegistry,
    pub dispatcher: Arc<Dispatcher>,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
pub fn build_app(registry: SessionRegistry, dispatcher: Arc<Dispatcher>) -> Router {
    let state = AppState {
        registry,
        dispatcher,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/session/create", post(routes::create_session))
        .route("/session/qr/{session_id}", get(routes::pairing_status))
        .route("/session/status/{session_id}", get(routes::session_status))
        .route("/session/delete/{session_id}", delete(routes::delete_session))
        .route("/session/logout/{session_id}", post(routes::logout_session))
        .route("/sessions/list", get(routes::list_sessions))
        .route("/message/send", post(routes::send_message))
        .route("/message/text", post(routes::send_text))
        .route("/message/image", post(routes::send_image))
        .route("/message/video", post(routes::send_video))
        .route("/message/audio", post(routes::send_audio))
        .route("/message/document", post(routes::send_document))
        .route("/message/contact", post(routes::send_contact))
        .route("/ws", get(ws::ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn start(
    bind: &str,
    port: u16,
    registry: SessionRegistry,
    dispatcher: Arc<Dispatcher>,
) -> anyhow::Result<()> {
    let app = build_app(registry, dispatcher);

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let lines = [
        format!("waygate v{}", env!("CARGO_PKG_VERSION")),
        format!("listening on http://{addr}"),
        format!("events on ws://{addr}/ws"),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    axum::serve(listener, app).await?;
    Ok(())
}
