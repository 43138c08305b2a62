//! Image sources: URL validation and the async fetch seam.
//!
//! DESIGN
//! ======
//! The picker never performs I/O itself. A host submits a URL; the URL is
//! validated here before anything touches the surface, and the host's
//! [`ImageFetcher`] produces the raw bytes. Decoding and drawing happen in
//! [`crate::surface`].

#[cfg(test)]
#[path = "source_test.rs"]
mod source_test;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ErrorCode;
use crate::surface::LoadError;

/// Message shown to the user when a submitted URL fails validation.
pub const INVALID_URL_MESSAGE: &str = "Invalid image URL. Please enter a valid URL.";

// Scheme and host fold case over ASCII only: Unicode folding would let
// U+017F and U+212A stand in for `s` and `k`.
static IMAGE_URL_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(?i-u:(https?://)([a-z0-9.-]+))(:[0-9]{1,5})?(/.*)?$"));

/// A URL was rejected before any load was attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("{INVALID_URL_MESSAGE}")]
    Invalid(String),
}

impl ErrorCode for UrlError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_INVALID_URL",
        }
    }
}

/// Check `url` against the accepted `http(s)://host[:port][/path]` shape.
///
/// # Errors
///
/// Returns [`UrlError::Invalid`] if the URL does not match.
pub fn validate_image_url(url: &str) -> Result<(), UrlError> {
    match IMAGE_URL_RE.as_ref() {
        Ok(re) if re.is_match(url) => Ok(()),
        _ => Err(UrlError::Invalid(url.to_string())),
    }
}

/// Fetches raw image bytes for a validated URL. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the encoded image at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the resource is unreachable or rejected.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}
