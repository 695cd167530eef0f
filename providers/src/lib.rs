//! Gemini client for judging sign attempts and fetching fun facts.
//!
//! # Architecture
//!
//! - [`gemini::GeminiClient`] - non-streaming `generateContent` client
//! - [`wire`] - typed response payloads and finish-reason classification
//!
//! The client performs exactly one HTTP attempt per call and reports every
//! failure as a [`GeminiError`]. Deciding what a child sees when a call fails
//! is the engine's job, not this crate's.
//!
//! # Error Handling
//!
//! | Variant | Cause |
//! |---------|-------|
//! | `Transport` | Connect/TLS/IO failure or client-side timeout |
//! | `Api` | Non-2xx status (body capped at 32 KiB) |
//! | `Remote` | 2xx response carrying an `error` object |
//! | `Blocked` | Safety or policy finish reason, or a blocked prompt |
//! | `EmptyResponse` | No text parts in the first candidate |
//! | `MalformedResponse` | Body is not a `GenerateContentResponse` |
//! | `MalformedVerdict` | Text is not `{correct: bool, feedback: string}` |

pub mod gemini;
pub mod wire;

pub use gemini::{GeminiClient, parse_verdict};
pub use signbuddy_types;

use reqwest::StatusCode;
use reqwest::redirect::Policy;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const CONNECT_TIMEOUT_SECS: u64 = 30;

const TCP_KEEPALIVE_SECS: u64 = 60;

const POOL_MAX_IDLE_PER_HOST: usize = 8;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("Gemini returned an error: {0}")]
    Remote(String),
    #[error("{0}")]
    Blocked(String),
    #[error("no text in Gemini response")]
    EmptyResponse,
    #[error("invalid response payload: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("response is not a verdict object: {0}")]
    MalformedVerdict(#[source] serde_json::Error),
}

/// Shared hardened client; connection pooling is per-process.
///
/// Refuses plain HTTP. Use [`loopback_http_client`] for local endpoints.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().https_only(true).build().unwrap_or_else(|e| {
            tracing::error!(
                "Failed to build hardened HTTP client: {e}. Attempting minimal hardened fallback."
            );
            reqwest::Client::builder()
                .https_only(true)
                .redirect(Policy::none())
                .build()
                .expect("Minimal hardened HTTP client must build; cannot proceed without TLS")
        })
    })
}

/// Same limits as [`http_client`] but allows `http://`. Callers must only
/// hand it loopback endpoints (local proxies, mock servers).
pub fn loopback_http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build loopback HTTP client: {e}. Using defaults.");
            reqwest::Client::new()
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        "x-goog-api-client",
        HeaderValue::from_static(concat!("signbuddy/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
