//! Google Gemini `generateContent` client.
//!
//! Communicates with `{base}/models/{model}:generateContent` using a single
//! non-streaming request per call. Retries are deliberately absent: a failed
//! attempt is reported immediately so the caller can degrade without delay.

use crate::wire;
use crate::{GEMINI_API_BASE_URL, GeminiError, http_client, read_capped_error_body};
use serde_json::{Value, json};
use signbuddy_types::{ApiKey, ModelName, SignLabel, VerificationRequest, VerificationResult};
use std::time::Duration;

/// Gemini client bound to one key and model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: ApiKey,
    model: ModelName,
    base_url: String,
    request_timeout: Option<Duration>,
}

impl GeminiClient {
    #[must_use]
    pub fn new(api_key: ApiKey, model: ModelName) -> Self {
        Self {
            client: http_client().clone(),
            api_key,
            model,
            base_url: GEMINI_API_BASE_URL.to_string(),
            request_timeout: None,
        }
    }

    /// Point the client at another endpoint (proxies, mock servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Per-request total timeout enforced by reqwest.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn model(&self) -> &ModelName {
        &self.model
    }

    /// Ask the model whether the photo shows the target sign.
    pub async fn judge_sign(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResult, GeminiError> {
        let body = build_verification_body(request);
        let text = self.generate_text(&body).await?;
        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        parse_verdict(&text)
    }

    /// Ask the model for a short fun fact. The returned text is trimmed and
    /// may be empty.
    pub async fn fun_fact(&self, label: &SignLabel) -> Result<String, GeminiError> {
        let body = build_fun_fact_body(label);
        let text = self.generate_text(&body).await?;
        Ok(text.trim().to_string())
    }

    async fn generate_text(&self, body: &Value) -> Result<String, GeminiError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str()
        );

        let mut builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(body);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        tracing::debug!(model = %self.model, "Sending generateContent request");
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = read_capped_error_body(response).await;
            return Err(GeminiError::Api { status, body });
        }

        let bytes = response.bytes().await?;
        let parsed: wire::Response =
            serde_json::from_slice(&bytes).map_err(GeminiError::MalformedResponse)?;

        if let Some(usage) = &parsed.usage_metadata {
            tracing::debug!(
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        parsed.text().map_err(|msg| {
            if parsed.error.is_some() {
                GeminiError::Remote(msg)
            } else {
                GeminiError::Blocked(msg)
            }
        })
    }
}

/// Parse model output as `{"correct": bool, "feedback": string}`.
///
/// A surrounding Markdown code fence is tolerated; anything else that is not
/// exactly that object is an error.
pub fn parse_verdict(text: &str) -> Result<VerificationResult, GeminiError> {
    serde_json::from_str(strip_code_fence(text)).map_err(GeminiError::MalformedVerdict)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    match rest.split_once('\n') {
        // Drop the language tag line ("json").
        Some((tag, body)) if !tag.trim_start().starts_with('{') => body.trim(),
        _ => rest.trim(),
    }
}

fn verification_prompt(label: &SignLabel) -> String {
    format!(
        "You are a friendly, encouraging teacher for children learning American Sign Language (ASL).\n\
         The child is trying to sign: \"{label}\".\n\
         Look at the image provided. Is the hand shape roughly correct for \"{label}\"?\n\
         Be lenient because they are children (3-10 years old) and might have small hands or imperfect coordination.\n\
         \n\
         Respond in JSON format:\n\
         {{\n  \"correct\": boolean,\n  \"feedback\": \"Simple, encouraging sentence for a child. If wrong, give a tiny hint.\"\n}}"
    )
}

fn fun_fact_prompt(label: &SignLabel) -> String {
    format!(
        "Write a very short, fun fact about the word or letter \"{label}\" for a 5 year old kid. Max 10 words."
    )
}

/// Build the request body for a sign verdict.
///
/// Note: `inlineData` and `generationConfig` use camelCase; the image part
/// precedes the prompt so the model reads the question with the photo in view.
fn build_verification_body(request: &VerificationRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inlineData": {
                        "mimeType": request.image.mime_type(),
                        "data": request.image.data()
                    }
                },
                { "text": verification_prompt(&request.target_label) }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "correct": { "type": "BOOLEAN" },
                    "feedback": { "type": "STRING" }
                },
                "required": ["correct", "feedback"]
            }
        }
    })
}

fn build_fun_fact_body(label: &SignLabel) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": fun_fact_prompt(label) }]
        }]
    })
}
