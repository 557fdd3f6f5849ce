use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// A request received by the stub provider
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path plus query string, exactly as received
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

struct StubResponse {
    method: Method,
    path: String,
    status: StatusCode,
    /// JSON text sent back byte-for-byte
    body: String,
}

#[derive(Default)]
struct StubState {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<Vec<StubResponse>>,
}

/// In-process HTTP server standing in for the verification provider
pub struct StubProvider {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubProvider {
    /// Binds to an ephemeral local port and starts serving
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let router = Router::new().fallback(record).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub provider");
        let addr = listener.local_addr().expect("Failed to read stub address");

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Answers `method path` (path without query) with `status` and `body`
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.respond_raw(method, path, status, &body.to_string());
    }

    /// Like `respond`, but sends `body` exactly as written
    pub fn respond_raw(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        self.state.responses.lock().unwrap().push(StubResponse {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
        });
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path_and_query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let responses = state.responses.lock().unwrap();
    match responses
        .iter()
        .find(|r| r.method == method && r.path == uri.path())
    {
        Some(r) => (
            r.status,
            [(header::CONTENT_TYPE, "application/json")],
            r.body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "description": "Not stubbed" })),
        )
            .into_response(),
    }
}
