//! HTTP transport for MCP.
//!
//! JSON-RPC requests are accepted on `POST /mcp` and forwarded to the server task over a
//! channel. Notifications are acknowledged with `202 Accepted` and no body.

use crate::error::McpError;
use crate::protocol::{INTERNAL_ERROR, JsonRpcRequest, JsonRpcResponse};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// A request paired with the channel its response goes back on.
pub type RequestEnvelope = (JsonRpcRequest, oneshot::Sender<Option<JsonRpcResponse>>);

/// State shared by the HTTP handlers.
pub struct HttpTransportState {
    request_tx: mpsc::Sender<RequestEnvelope>,
}

impl HttpTransportState {
    pub fn new(request_tx: mpsc::Sender<RequestEnvelope>) -> Self {
        Self { request_tx }
    }
}

/// Create the HTTP router.
pub fn create_router(state: Arc<HttpTransportState>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .with_state(state)
}

async fn handle_mcp_post(
    State(state): State<Arc<HttpTransportState>>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let id = request.id.clone();
    let (response_tx, response_rx) = oneshot::channel();

    if state.request_tx.send((request, response_tx)).await.is_err() {
        return unavailable(id, "MCP server unavailable");
    }

    match response_rx.await {
        Ok(Some(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        Err(_) => unavailable(id, "No response from MCP server"),
    }
}

fn unavailable(id: Option<serde_json::Value>, message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(JsonRpcResponse::error(id, INTERNAL_ERROR, message)),
    )
        .into_response()
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "snowgate-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    address: String,
    state: Arc<HttpTransportState>,
}

impl HttpServer {
    pub fn new(address: impl Into<String>, request_tx: mpsc::Sender<RequestEnvelope>) -> Self {
        Self {
            address: address.into(),
            state: Arc::new(HttpTransportState::new(request_tx)),
        }
    }

    /// Bind and serve until the process is stopped.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .map_err(|e| {
                McpError::StartupFailed(format!("Failed to bind to {}: {}", self.address, e))
            })?;

        tracing::info!(address = %self.address, "MCP HTTP server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| McpError::Internal(e.into()))?;

        Ok(())
    }
}
