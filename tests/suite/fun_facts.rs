//! Fun fact fetching against a mock Gemini endpoint

use crate::common::{
    GENERATE_PATH, gemini_client, mount_status, mount_text_response, start_gemini_mock,
};
use signbuddy_engine::{
    AlwaysOffline, AlwaysOnline, EncouragementFetcher, GeminiClient, SignLabel,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn cat() -> SignLabel {
    SignLabel::new("Cat").unwrap()
}

#[tokio::test]
async fn offline_is_fixed_without_network() {
    let server = start_gemini_mock().await;
    let fetcher = EncouragementFetcher::new(gemini_client(&server), AlwaysOffline);

    assert_eq!(fetcher.fun_fact(&cat()).await, "You are a superstar!");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn online_success_is_trimmed_text() {
    let server = start_gemini_mock().await;
    mount_text_response(&server, "  Cats can make over 100 sounds!\n").await;
    let fetcher = EncouragementFetcher::new(gemini_client(&server), AlwaysOnline);

    assert_eq!(
        fetcher.fun_fact(&cat()).await,
        "Cats can make over 100 sounds!"
    );
}

#[tokio::test]
async fn prompt_is_plain_text_about_label() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(serde_json::json!({
            "contents": [{
                "parts": [{
                    "text": "Write a very short, fun fact about the word or letter \"Cat\" for a 5 year old kid. Max 10 words."
                }]
            }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(crate::common::text_body("Cats purr when happy!")),
        )
        .expect(1)
        .mount(&server)
        .await;
    let fetcher = EncouragementFetcher::new(gemini_client(&server), AlwaysOnline);

    assert_eq!(fetcher.fun_fact(&cat()).await, "Cats purr when happy!");
}

#[tokio::test]
async fn online_failure_is_fallback() {
    let server = start_gemini_mock().await;
    mount_status(&server, 503).await;
    let fetcher = EncouragementFetcher::new(gemini_client(&server), AlwaysOnline);

    assert_eq!(fetcher.fun_fact(&cat()).await, "Keep up the good work!");
}

#[tokio::test]
async fn blank_answer_is_empty_fallback() {
    let server = start_gemini_mock().await;
    mount_text_response(&server, "   ").await;
    let fetcher = EncouragementFetcher::new(gemini_client(&server), AlwaysOnline);

    assert_eq!(fetcher.fun_fact(&cat()).await, "You are doing great!");
}

#[tokio::test]
async fn unconfigured_model_is_failure_fallback() {
    let fetcher = EncouragementFetcher::new(None::<GeminiClient>, AlwaysOnline);

    assert_eq!(fetcher.fun_fact(&cat()).await, "Keep up the good work!");
}
