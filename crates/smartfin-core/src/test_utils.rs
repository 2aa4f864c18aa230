//! Test utilities for smartfin-core
//!
//! This module provides a mock Gemini server speaking the generateContent
//! wire format, for transport-level tests of the advisory backends.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

#[derive(Clone)]
struct ServerState {
    api_key: String,
    reply: String,
    requests: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

/// Mock Gemini server for testing and development
pub struct MockGeminiServer {
    addr: SocketAddr,
    state: ServerState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port
    ///
    /// Requests must carry `api_key` in `x-goog-api-key`; accepted
    /// generateContent calls are answered with `reply`.
    pub async fn start(api_key: &str, reply: &str) -> Self {
        let state = ServerState {
            api_key: api_key.to_string(),
            reply: reply.to_string(),
            requests: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        };

        let app = Router::new()
            .route("/v1beta/models/:call", get(handle_model).post(handle_generate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of accepted generateContent requests
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Prompt text of the most recent accepted request
    pub fn last_prompt(&self) -> Option<String> {
        self.state.last_prompt.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn authorized(state: &ServerState, headers: &HeaderMap) -> bool {
    headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == state.api_key)
}

fn permission_denied() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": { "code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED" }
        })),
    )
        .into_response()
}

/// Model metadata endpoint (health check)
async fn handle_model(
    State(state): State<ServerState>,
    Path(model): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return permission_denied();
    }
    Json(json!({ "name": format!("models/{}", model) })).into_response()
}

/// generateContent endpoint
async fn handle_generate(
    State(state): State<ServerState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    if !call.ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }
    if !authorized(&state, &headers) {
        return permission_denied();
    }

    let prompt = request["contents"][0]["parts"][0]["text"]
        .as_str()
        .map(str::to_string);
    state.requests.fetch_add(1, Ordering::SeqCst);
    *state.last_prompt.lock().unwrap() = prompt;

    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": state.reply }] },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}
