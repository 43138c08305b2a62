//! Error classification shared by every error type the picker surfaces.

/// Stable, grepable metadata for errors reported to the host.
pub trait ErrorCode {
    /// Short code such as `E_IMAGE_FETCH`.
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same user action may succeed.
    fn retryable(&self) -> bool {
        false
    }
}
