//! WebSocket gateway for Reagent.
//!
//! Exposes a health check and the `/ws` endpoint clients connect to.
//! Each accepted socket gets its own [`session::Session`]: envelopes in,
//! envelopes out, JSON over text frames. Built on Axum.

pub mod session;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use reagent_config::AppConfig;
use reagent_core::envelope::Envelope;
use reagent_provider::{CompletionBackend, OpenAiClient};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use session::Session;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub backend: Arc<dyn CompletionBackend>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = config.require_api_key()?.to_string();
    let backend: Arc<dyn CompletionBackend> = Arc::new(OpenAiClient::new(
        "openai",
        &config.base_url,
        api_key,
        &config.model,
    )?);

    let addr = config.bind_addr();
    let state = Arc::new(GatewayState { config, backend });
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn ws_handler(State(state): State<SharedState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one WebSocket connection until either side hangs up.
async fn handle_socket(socket: WebSocket, state: SharedState) {
    info!("Client connected");
    let (mut sink, mut stream) = socket.split();

    // Outbound envelopes funnel through one writer task so the agent
    // tasks and the eval bridge can all send without sharing the sink.
    let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();
    let writer = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            let json = match serde_json::to_string(&envelope) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize outbound envelope");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let session = Session::new(state.backend.clone(), tx);

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<Envelope>(&text) {
                Ok(envelope) => session.handle_inbound(envelope).await,
                Err(e) => warn!(error = %e, "Dropping malformed inbound frame"),
            },
            Message::Close(_) => break,
            // Pings are answered by Axum; binary frames are not part of
            // the protocol.
            _ => {}
        }
    }

    info!("Client disconnected");
    writer.abort();
}
