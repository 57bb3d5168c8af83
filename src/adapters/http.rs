//! Shared reqwest plumbing for the remote adapters.

use std::time::Duration;

use reqwest::{Client, Response};

use super::traits::{AdapterError, AdapterResult};
use crate::data::Mode;

const USER_AGENT: &str = concat!("santseva-store/", env!("CARGO_PKG_VERSION"));

/// Build a client with the configured per-request timeout
pub(crate) fn build_client(backend: Mode, timeout_seconds: u64) -> AdapterResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.max(1)))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AdapterError::Transport {
            backend,
            message: format!("Failed to build HTTP client: {}", e),
        })
}

pub(crate) fn transport_error(backend: Mode, e: reqwest::Error) -> AdapterError {
    AdapterError::Transport {
        backend,
        message: format!("HTTP request failed: {}", e),
    }
}

pub(crate) fn decode_error(backend: Mode, e: impl std::fmt::Display) -> AdapterError {
    AdapterError::Decode {
        backend,
        message: e.to_string(),
    }
}

/// Pass successful responses through; turn anything else into a status error
/// carrying the body's `message` field when there is one.
pub(crate) async fn ensure_success(backend: Mode, response: Response) -> AdapterResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AdapterError::Status {
        backend,
        status: status.as_u16(),
        message: error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
    })
}

/// Pull a human message out of a JSON error body
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error_description", "msg"]
        .iter()
        .find_map(|field| value.get(field).and_then(|m| m.as_str()))
        .or_else(|| {
            value
                .get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str())
        })
        .map(str::to_string)
}

/// Serve `app` on an ephemeral local port and return its base URL
#[cfg(test)]
pub(crate) async fn serve_stub(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
