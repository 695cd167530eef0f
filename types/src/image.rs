//! Encoded photo payloads.
//!
//! Cameras in the practice screen hand over either raw base64 or a full data
//! URL (`data:image/jpeg;base64,...`). The remote judge wants the bare base64
//! body plus a separate MIME type, so the header is split off here.

use base64::engine::general_purpose::STANDARD;
use base64::{DecodeError, Engine};
use std::fmt;
use thiserror::Error;

/// MIME type assumed when the payload carries no data-URL header.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImagePayloadError {
    #[error("image payload is empty")]
    Empty,
    #[error("unsupported MIME type {0} (expected image/*)")]
    NotAnImage(String),
    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(#[source] DecodeError),
}

/// Base64 image data with its declared MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    data: String,
}

// Payloads run to hundreds of KiB; keep logs readable.
impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl ImagePayload {
    /// Parse an encoded payload, stripping any data-URL prefix.
    ///
    /// A header of the form `data:<mime>;base64,` supplies the MIME type;
    /// anything else before the first comma is discarded and the default
    /// `image/jpeg` is assumed. Line breaks and other ASCII whitespace inside
    /// the body (as written by `base64` tools wrapping at 76 columns) are
    /// removed, and the result must decode as standard base64.
    pub fn from_encoded(encoded: &str) -> Result<Self, ImagePayloadError> {
        let encoded = encoded.trim();
        let (mime_type, data) = match encoded.split_once(',') {
            Some((header, body)) => (mime_from_header(header), body),
            None => (None, encoded),
        };

        let data: String = data
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        if data.is_empty() {
            return Err(ImagePayloadError::Empty);
        }

        let mime_type = mime_type.unwrap_or(DEFAULT_IMAGE_MIME);
        ensure_image_mime(mime_type)?;
        STANDARD
            .decode(&data)
            .map_err(ImagePayloadError::InvalidBase64)?;

        Ok(Self {
            mime_type: mime_type.to_ascii_lowercase(),
            data,
        })
    }

    /// Encode raw captured bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, ImagePayloadError> {
        if bytes.is_empty() {
            return Err(ImagePayloadError::Empty);
        }
        let mime_type = mime_type.trim();
        ensure_image_mime(mime_type)?;

        Ok(Self {
            mime_type: mime_type.to_ascii_lowercase(),
            data: STANDARD.encode(bytes),
        })
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Bare base64 body, never prefixed.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }
}

fn mime_from_header(header: &str) -> Option<&str> {
    let rest = header.trim().strip_prefix("data:")?;
    let mime = rest.split(';').next()?.trim();
    if mime.is_empty() { None } else { Some(mime) }
}

fn ensure_image_mime(mime_type: &str) -> Result<(), ImagePayloadError> {
    let is_image = mime_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
        && mime_type.len() > 6;
    if is_image {
        Ok(())
    } else {
        Err(ImagePayloadError::NotAnImage(mime_type.to_string()))
    }
}
