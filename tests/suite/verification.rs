//! End-to-end verification against a mock Gemini endpoint

use crate::common::{
    GENERATE_PATH, attempt, fast_settings, gemini_client, mount_status, mount_text_response,
    start_gemini_mock, text_body,
};
use signbuddy_engine::{
    AlwaysOffline, AlwaysOnline, ConnectivityFlag, FALLBACK_FEEDBACK, GeminiClient,
    OFFLINE_MARKER, OFFLINE_PRAISE, PraisePicker, SignVerificationService, VerificationResult,
};
use std::time::{Duration, Instant};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn letter_a_offline_is_marked_praise() {
    let server = start_gemini_mock().await;
    let service = SignVerificationService::new(gemini_client(&server), AlwaysOffline)
        .with_settings(fast_settings());

    let result = service.verify(attempt("A")).await;

    assert!(result.correct);
    assert!(result.feedback.ends_with(OFFLINE_MARKER));
    assert!(
        OFFLINE_PRAISE
            .iter()
            .any(|line| result.feedback.starts_with(line))
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn hello_with_failing_remote_is_fixed_fallback() {
    let server = start_gemini_mock().await;
    mount_status(&server, 500).await;
    let service = SignVerificationService::new(gemini_client(&server), AlwaysOnline)
        .with_settings(fast_settings());

    let result = service.verify(attempt("Hello")).await;

    assert_eq!(
        result,
        VerificationResult {
            correct: true,
            feedback: "I think that looked amazing! Good try!".to_string(),
        }
    );
}

#[tokio::test]
async fn cat_rejection_passes_through() {
    let server = start_gemini_mock().await;
    mount_text_response(
        &server,
        r#"{"correct": false, "feedback": "Try pulling your whiskers higher!"}"#,
    )
    .await;
    let service = SignVerificationService::new(gemini_client(&server), AlwaysOnline)
        .with_settings(fast_settings());

    let result = service.verify(attempt("Cat")).await;

    assert_eq!(
        result,
        VerificationResult::try_again("Try pulling your whiskers higher!")
    );
}

#[tokio::test]
async fn request_strips_data_url_and_declares_mime() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{
                "parts": [{
                    "inlineData": {
                        "mimeType": "image/jpeg",
                        "data": "/9j/4AAQSkZJRg=="
                    }
                }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body(
            r#"{"correct": true, "feedback": "Beautiful B!"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;
    let service = SignVerificationService::new(gemini_client(&server), AlwaysOnline)
        .with_settings(fast_settings());

    let result = service.verify(attempt("B")).await;

    assert_eq!(result, VerificationResult::correct("Beautiful B!"));
}

#[tokio::test]
async fn prose_answer_is_fallback() {
    let server = start_gemini_mock().await;
    mount_text_response(&server, "Great job! That is a perfect A.").await;
    let service = SignVerificationService::new(gemini_client(&server), AlwaysOnline)
        .with_settings(fast_settings());

    let result = service.verify(attempt("A")).await;

    assert_eq!(result, VerificationResult::correct(FALLBACK_FEEDBACK));
}

#[tokio::test]
async fn auth_failure_is_fallback_without_retry() {
    let server = start_gemini_mock().await;
    mount_status(&server, 429).await;
    let service = SignVerificationService::new(gemini_client(&server), AlwaysOnline)
        .with_settings(fast_settings());

    let result = service.verify(attempt("A")).await;

    assert_eq!(result, VerificationResult::correct(FALLBACK_FEEDBACK));
    // `expect(1)` on the mock verifies a single attempt when the server drops.
}

#[tokio::test]
async fn slow_remote_is_bounded_by_timeout() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_body(r#"{"correct": false, "feedback": "late"}"#))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    let mut settings = fast_settings();
    settings.remote_timeout = Duration::from_millis(200);
    let service =
        SignVerificationService::new(gemini_client(&server), AlwaysOnline).with_settings(settings);

    let started = Instant::now();
    let result = service.verify(attempt("A")).await;

    assert_eq!(result, VerificationResult::correct(FALLBACK_FEEDBACK));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn unconfigured_model_is_fallback_online_and_praise_offline() {
    let flag = ConnectivityFlag::new(true);
    let service = SignVerificationService::new(None::<GeminiClient>, flag.clone())
        .with_settings(fast_settings())
        .with_praise(PraisePicker::seeded(3));

    let online = service.verify(attempt("A")).await;
    assert_eq!(online, VerificationResult::correct(FALLBACK_FEEDBACK));

    flag.set_online(false);
    let offline = service.verify(attempt("A")).await;
    assert!(offline.correct);
    assert!(offline.feedback.ends_with(OFFLINE_MARKER));
}

#[tokio::test]
async fn concurrent_attempts_are_independent() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body(
            r#"{"correct": true, "feedback": "Yes!"}"#,
        )))
        .expect(3)
        .mount(&server)
        .await;
    let service = SignVerificationService::new(gemini_client(&server), AlwaysOnline)
        .with_settings(fast_settings());

    let (a, b, c) = tokio::join!(
        service.verify(attempt("A")),
        service.verify(attempt("B")),
        service.verify(attempt("C")),
    );

    for result in [a, b, c] {
        assert_eq!(result, VerificationResult::correct("Yes!"));
    }
}

#[tokio::test]
async fn shell_strings_go_through_verify_encoded() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{
                "parts": [{ "inlineData": { "mimeType": "image/png", "data": "iVBORw0K" } }]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body(
            r#"{"correct": true, "feedback": "Perfect P!"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;
    let service = SignVerificationService::new(gemini_client(&server), AlwaysOnline)
        .with_settings(fast_settings());

    let result = service
        .verify_encoded("data:image/png;base64,iVBORw0K", "P")
        .await;

    assert_eq!(result, VerificationResult::correct("Perfect P!"));
}
