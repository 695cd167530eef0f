//! Core engine for SignBuddy - the verification and encouragement workflows.
//!
//! Both services are generic over the remote [`SignModel`] and an injected
//! [`Connectivity`] signal, and both are total: every call returns something
//! a child can be shown.
//!
//! ```text
//! verify(request)
//!   offline? -> sleep(offline_delay) -> praise + "(Offline Mode)"
//!   online   -> timeout(judge_sign) -> verdict | fixed fallback
//! ```

mod config;
mod connectivity;
mod encouragement;
mod model;
mod praise;
mod verify;

// Re-export from crates for public API
pub use signbuddy_providers::{self, GeminiClient, GeminiError};
pub use signbuddy_types::{
    ApiKey, ImagePayload, ImagePayloadError, LabelError, ModelName, SignLabel,
    VerificationRequest, VerificationResult,
};

pub use config::{
    API_KEY_ENV, AppConfig, ConfigError, GoogleConfig, OFFLINE_ENV, SignBuddyConfig,
    VerificationConfig, config_path, expand_env_vars,
};
pub use connectivity::{AlwaysOffline, AlwaysOnline, Connectivity, ConnectivityFlag};
pub use encouragement::{EMPTY_FUN_FACT, EncouragementFetcher, FAILED_FUN_FACT, OFFLINE_FUN_FACT};
pub use model::{OptionalModelError, SignModel};
pub use praise::{OFFLINE_PRAISE, PraisePicker};
pub use verify::{
    DEFAULT_OFFLINE_DELAY, DEFAULT_REMOTE_TIMEOUT, FALLBACK_FEEDBACK, OFFLINE_MARKER,
    SignVerificationService, VerificationSettings,
};
