//! Top-level error for the `loupe` binary.

use picker::error::ErrorCode;

use crate::script::ScriptError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report encode failed: {0}")]
    Report(#[from] serde_json::Error),

    #[error("image write failed: {0}")]
    ImageWrite(#[from] image::ImageError),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for AppError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Script(e) => e.error_code(),
            Self::Io(_) => "E_IO",
            Self::Report(_) => "E_REPORT_ENCODE",
            Self::ImageWrite(_) => "E_IMAGE_WRITE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }
}
