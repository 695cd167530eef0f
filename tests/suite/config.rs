//! Configuration wiring into live services

use crate::common::{attempt, mount_text_response, start_gemini_mock};
use signbuddy_engine::{
    AlwaysOnline, ConfigError, SignBuddyConfig, SignVerificationService, VerificationResult,
};
use std::{env, fs};
use std::time::Duration;

#[tokio::test]
async fn config_file_points_client_at_loopback_endpoint() {
    let server = start_gemini_mock().await;
    mount_text_response(&server, r#"{"correct": false, "feedback": "Lift your thumb"}"#).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        format!(
            "[google]\napi_key = \"test-key\"\nbase_url = \"{}\"\n\n[verification]\ntimeout_seconds = 5\noffline_delay_ms = 0\npraise_seed = 9\n",
            server.uri()
        ),
    )
    .unwrap();

    let config = SignBuddyConfig::load_from(&path).unwrap().unwrap();
    let settings = config.verification_settings();
    assert_eq!(settings.remote_timeout, Duration::from_secs(5));
    assert_eq!(settings.offline_delay, Duration::ZERO);

    let client = config.gemini_client().unwrap().unwrap();
    assert_eq!(client.model().as_str(), "gemini-2.5-flash");

    let service = SignVerificationService::new(client, AlwaysOnline)
        .with_settings(settings)
        .with_praise(config.praise_picker());

    assert_eq!(
        service.verify(attempt("A")).await,
        VerificationResult::try_again("Lift your thumb")
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[test]
fn remote_plain_http_endpoint_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[google]\napi_key = \"k\"\nbase_url = \"http://gemini.example.com/v1beta\"\n",
    )
    .unwrap();
    let config = SignBuddyConfig::load_from(&path).unwrap().unwrap();

    assert!(matches!(
        config.gemini_client(),
        Err(ConfigError::InsecureBaseUrl(_))
    ));
}

#[test]
fn missing_key_yields_no_client() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[google]\napi_key = \"\"\n").unwrap();
    let config = SignBuddyConfig::load_from(&path).unwrap().unwrap();
    // GEMINI_API_KEY may be set on developer machines.
    if env::var("GEMINI_API_KEY").is_err() {
        assert!(config.gemini_client().unwrap().is_none());
    }
}

#[test]
fn non_gemini_model_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[google]\napi_key = \"k\"\nmodel = \"gpt-4o\"\n").unwrap();
    let config = SignBuddyConfig::load_from(&path).unwrap().unwrap();

    assert!(config.gemini_client().is_err());
}
