//! Core domain types for SignBuddy.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod image;
mod model;

pub use image::{DEFAULT_IMAGE_MIME, ImagePayload, ImagePayloadError};
pub use model::{ApiKey, DEFAULT_GEMINI_MODEL, ModelName, ModelNameError};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Sign Labels
// ============================================================================

/// Name of the sign a learner is attempting ("A", "Hello", "Cat").
///
/// Guaranteed non-empty after trimming; surrounding whitespace is removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignLabel(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("sign label must not be empty")]
pub struct LabelError;

impl SignLabel {
    pub fn new(value: impl AsRef<str>) -> Result<Self, LabelError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            Err(LabelError)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SignLabel {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SignLabel {
    type Error = LabelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SignLabel> for String {
    fn from(value: SignLabel) -> Self {
        value.0
    }
}

impl AsRef<str> for SignLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Verification
// ============================================================================

/// One practice attempt: the captured photo plus the sign it should show.
///
/// Created per attempt and dropped once a verdict is produced.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub image: ImagePayload,
    pub target_label: SignLabel,
}

impl VerificationRequest {
    #[must_use]
    pub fn new(image: ImagePayload, target_label: SignLabel) -> Self {
        Self {
            image,
            target_label,
        }
    }
}

/// Verdict on a practice attempt plus the text shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub correct: bool,
    pub feedback: String,
}

impl VerificationResult {
    #[must_use]
    pub fn correct(feedback: impl Into<String>) -> Self {
        Self {
            correct: true,
            feedback: feedback.into(),
        }
    }

    #[must_use]
    pub fn try_again(hint: impl Into<String>) -> Self {
        Self {
            correct: false,
            feedback: hint.into(),
        }
    }
}
