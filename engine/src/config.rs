use crate::praise::PraisePicker;
use crate::verify::{DEFAULT_OFFLINE_DELAY, DEFAULT_REMOTE_TIMEOUT, VerificationSettings};
use serde::Deserialize;
use signbuddy_providers::{GEMINI_API_BASE_URL, GeminiClient, loopback_http_client};
use signbuddy_types::{ApiKey, ModelName, ModelNameError};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fmt, fs, io};
use toml::de::Error as TomlError;

/// Environment variable consulted when the config file names no key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Set to `1`/`true` to force offline mode.
pub const OFFLINE_ENV: &str = "SIGNBUDDY_OFFLINE";

#[derive(Debug, Default, Deserialize)]
pub struct SignBuddyConfig {
    pub app: Option<AppConfig>,
    pub google: Option<GoogleConfig>,
    pub verification: Option<VerificationConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: TomlError,
    },
    #[error("invalid model in config: {0}")]
    Model(#[from] ModelNameError),
    #[error("base_url {0} must use https (plain http is allowed for loopback hosts only)")]
    InsecureBaseUrl(String),
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Treat the judge as unreachable regardless of the network.
    #[serde(default)]
    pub offline: bool,
}

/// Google Gemini API settings.
///
/// ```toml
/// [google]
/// api_key = "${GEMINI_API_KEY}"
/// model = "gemini-2.5-flash"
/// ```
#[derive(Default, Deserialize)]
pub struct GoogleConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VerificationConfig {
    pub timeout_seconds: Option<u64>,
    pub offline_delay_ms: Option<u64>,
    /// Fixed seed for offline praise selection.
    pub praise_seed: Option<u64>,
}

/// Expand `${VAR}` references from the environment; unset variables become empty.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        let end = start + 2 + end_rel;
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[end + 1..];
    }

    out.push_str(rest);
    out
}

impl SignBuddyConfig {
    /// Load `~/.signbuddy/config.toml`. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Configured key (after `${VAR}` expansion), else `GEMINI_API_KEY`.
    #[must_use]
    pub fn api_key(&self) -> Option<ApiKey> {
        self.google
            .as_ref()
            .and_then(|google| google.api_key.as_deref())
            .map(expand_env_vars)
            .and_then(ApiKey::new)
            .or_else(|| env::var(API_KEY_ENV).ok().and_then(ApiKey::new))
    }

    pub fn model(&self) -> Result<ModelName, ModelNameError> {
        match self.google.as_ref().and_then(|google| google.model.as_deref()) {
            Some(raw) => ModelName::parse(&expand_env_vars(raw)),
            None => Ok(ModelName::default()),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        self.google
            .as_ref()
            .and_then(|google| google.base_url.as_deref())
            .map(expand_env_vars)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| GEMINI_API_BASE_URL.to_string())
    }

    /// Config flag or `SIGNBUDDY_OFFLINE`.
    #[must_use]
    pub fn force_offline(&self) -> bool {
        let from_config = self.app.as_ref().is_some_and(|app| app.offline);
        let from_env = env::var(OFFLINE_ENV)
            .is_ok_and(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true"));
        from_config || from_env
    }

    #[must_use]
    pub fn verification_settings(&self) -> VerificationSettings {
        let verification = self.verification.as_ref();
        VerificationSettings {
            remote_timeout: verification
                .and_then(|v| v.timeout_seconds)
                .filter(|secs| *secs > 0)
                .map_or(DEFAULT_REMOTE_TIMEOUT, Duration::from_secs),
            offline_delay: verification
                .and_then(|v| v.offline_delay_ms)
                .map_or(DEFAULT_OFFLINE_DELAY, Duration::from_millis),
        }
    }

    #[must_use]
    pub fn praise_picker(&self) -> PraisePicker {
        self.verification
            .as_ref()
            .and_then(|v| v.praise_seed)
            .map_or_else(PraisePicker::from_entropy, PraisePicker::seeded)
    }

    /// Build the Gemini client, or `None` when no key is available.
    ///
    /// A `base_url` that is neither `https://` nor loopback `http://` is
    /// rejected rather than left to fail on every call.
    pub fn gemini_client(&self) -> Result<Option<GeminiClient>, ConfigError> {
        let model = self.model()?;
        let base_url = self.base_url();
        let plain_http = is_loopback_http(&base_url)?;
        let Some(api_key) = self.api_key() else {
            return Ok(None);
        };

        let mut client = GeminiClient::new(api_key, model)
            .with_base_url(base_url)
            .with_request_timeout(self.verification_settings().remote_timeout);
        if plain_http {
            tracing::debug!("Using plain HTTP for loopback Gemini endpoint");
            client = client.with_http_client(loopback_http_client().clone());
        }
        Ok(Some(client))
    }
}

/// `Ok(false)` for https, `Ok(true)` for http to a loopback host.
fn is_loopback_http(base_url: &str) -> Result<bool, ConfigError> {
    let lower = base_url.trim().to_ascii_lowercase();
    if lower.starts_with("https://") {
        return Ok(false);
    }

    let host = lower.strip_prefix("http://").map(|rest| {
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let authority = authority.rsplit('@').next().unwrap_or_default();
        match authority.strip_prefix('[') {
            Some(v6) => v6.split(']').next().unwrap_or_default(),
            None => authority.split(':').next().unwrap_or_default(),
        }
    });

    match host {
        Some("localhost") => Ok(true),
        Some(host) if host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback()) => Ok(true),
        _ => Err(ConfigError::InsecureBaseUrl(base_url.to_string())),
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".signbuddy").join("config.toml"))
}
