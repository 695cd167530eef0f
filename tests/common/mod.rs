//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use signbuddy_engine::signbuddy_providers::loopback_http_client;
use signbuddy_engine::{
    ApiKey, GeminiClient, ImagePayload, ModelName, SignLabel, VerificationRequest,
    VerificationSettings,
};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

/// Start a mock server that simulates the Gemini API
pub async fn start_gemini_mock() -> MockServer {
    MockServer::start().await
}

/// Client aimed at the mock over plain HTTP.
pub fn gemini_client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(ApiKey::new("test-key").unwrap(), ModelName::default())
        .with_http_client(loopback_http_client().clone())
        .with_base_url(server.uri())
}

/// No simulated thinking, short remote bound.
pub fn fast_settings() -> VerificationSettings {
    VerificationSettings {
        remote_timeout: Duration::from_secs(2),
        offline_delay: Duration::ZERO,
    }
}

pub fn attempt(label: &str) -> VerificationRequest {
    VerificationRequest::new(
        ImagePayload::from_encoded("data:image/jpeg;base64,/9j/4AAQSkZJRg==").unwrap(),
        SignLabel::new(label).unwrap(),
    )
}

/// A `generateContent` body whose first candidate says `text`.
pub fn text_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 258,
            "candidatesTokenCount": 12,
            "totalTokenCount": 270
        }
    })
}

/// Mount a single successful text answer.
pub async fn mount_text_response(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body(text)))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount an HTTP failure that must be seen exactly once (no retries).
pub async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream trouble"))
        .expect(1)
        .mount(server)
        .await;
}
