//! SignBuddy CLI - stand-in shell for the practice and lesson screens.
//!
//! ```text
//! signbuddy verify <IMAGE_FILE> <LABEL> [--offline]
//! signbuddy fact <LABEL> [--offline]
//! ```
//!
//! The shell owns everything the workflows do not: reading the photo from
//! disk, choosing connectivity, loading config, and printing results.

mod display;

use anyhow::{Context, Result};
use std::{
    env,
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use display::sanitize_terminal_text;
use signbuddy_engine::{
    ConnectivityFlag, EncouragementFetcher, GeminiClient, ImagePayload, SignBuddyConfig,
    SignLabel, SignVerificationService, VerificationRequest,
};

const USAGE: &str = "\
Usage:
  signbuddy verify <IMAGE_FILE> <LABEL> [--offline]
  signbuddy fact <LABEL> [--offline]
  signbuddy help

IMAGE_FILE is a jpg/png/webp/gif photo, or a .txt/.b64 file holding base64
(optionally a data URL). Set GEMINI_API_KEY or ~/.signbuddy/config.toml.";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Results go to stdout; diagnostics stay on stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.signbuddy/logs/signbuddy.log
    if let Some(config_path) = SignBuddyConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("signbuddy.log"));
    }

    candidates.push(PathBuf::from(".signbuddy").join("logs").join("signbuddy.log"));

    candidates
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Verify { image: PathBuf, label: String },
    Fact { label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Invocation {
    command: Command,
    offline: bool,
}

/// `Ok(None)` means help was requested.
fn parse_args<I>(args: I) -> Result<Option<Invocation>, String>
where
    I: IntoIterator<Item = String>,
{
    let mut offline = false;
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--offline" => offline = true,
            "-h" | "--help" => return Ok(None),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("verify") => {
            let (Some(image), Some(label)) = (positional.next(), positional.next()) else {
                return Err("verify needs <IMAGE_FILE> <LABEL>".to_string());
            };
            Command::Verify {
                image: PathBuf::from(image),
                label,
            }
        }
        Some("fact") => {
            let Some(label) = positional.next() else {
                return Err("fact needs <LABEL>".to_string());
            };
            Command::Fact { label }
        }
        Some("help") | None => return Ok(None),
        Some(other) => return Err(format!("unknown command {other}")),
    };

    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument {extra}"));
    }

    Ok(Some(Invocation { command, offline }))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn load_image(path: &Path) -> Result<ImagePayload> {
    let is_encoded = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("b64"));

    if is_encoded {
        let encoded = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return ImagePayload::from_encoded(&encoded)
            .with_context(|| format!("{} is not a usable image payload", path.display()));
    }

    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    ImagePayload::from_bytes(&bytes, mime_for(path))
        .with_context(|| format!("{} is not a usable image", path.display()))
}

/// Offline runs never need the judge. Bad Gemini settings degrade to the
/// fallbacks the same way an unreadable config file does.
fn build_model(config: &SignBuddyConfig, online: bool) -> Option<GeminiClient> {
    if !online {
        return None;
    }

    match config.gemini_client() {
        Ok(Some(client)) => Some(client),
        Ok(None) => {
            tracing::warn!("No Gemini API key configured; remote calls will use fallbacks");
            None
        }
        Err(err) => {
            tracing::warn!(%err, "Invalid Gemini settings; remote calls will use fallbacks");
            eprintln!("warning: {err}; remote calls will use fallbacks");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let invocation = match parse_args(env::args().skip(1)) {
        Ok(Some(invocation)) => invocation,
        Ok(None) => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(msg) => {
            eprintln!("error: {msg}\n\n{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };

    init_tracing();

    let config = match SignBuddyConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("warning: {err}; using defaults");
            SignBuddyConfig::default()
        }
    };

    let online = !(invocation.offline || config.force_offline());
    let connectivity = ConnectivityFlag::new(online);
    let model = build_model(&config, online);
    let settings = config.verification_settings();

    match invocation.command {
        Command::Verify { image, label } => {
            let label = SignLabel::new(&label).context("LABEL must not be blank")?;
            let image = load_image(&image)?;
            let service = SignVerificationService::new(model, connectivity)
                .with_settings(settings)
                .with_praise(config.praise_picker());

            let result = service.verify(VerificationRequest::new(image, label)).await;
            println!("correct: {}", result.correct);
            println!("{}", sanitize_terminal_text(&result.feedback));
        }
        Command::Fact { label } => {
            let label = SignLabel::new(&label).context("LABEL must not be blank")?;
            let fetcher = EncouragementFetcher::new(model, connectivity)
                .with_remote_timeout(settings.remote_timeout);

            let fact = fetcher.fun_fact(&label).await;
            println!("{}", sanitize_terminal_text(&fact));
        }
    }

    Ok(ExitCode::SUCCESS)
}
