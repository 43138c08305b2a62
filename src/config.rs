//! Runtime configuration: command-line flags and fetch tuning from the environment.

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;

/// Placeholder photo shown until the user loads their own.
pub const DEFAULT_IMAGE_URL: &str = "https://images.unsplash.com/photo-1721086130975-83605296fdbb?q=80&w=2971&auto=format&fit=crop&ixlib=rb-4.0.3&ixid=M3wxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8fA%3D%3D";

#[derive(Parser, Debug)]
#[command(name = "loupe", about = "Pick colors from a web image with a magnifying loupe")]
pub struct Cli {
    /// Command script to run. Read from stdin when absent.
    #[arg(long, env = "LOUPE_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Image URL loaded before the script starts. Empty disables it.
    #[arg(long, env = "LOUPE_IMAGE_URL", default_value = DEFAULT_IMAGE_URL)]
    pub image: String,

    /// Start with a blank surface instead of the initial image.
    #[arg(long)]
    pub no_image: bool,

    /// Client-space x offset of the image surface.
    #[arg(long, env = "LOUPE_SURFACE_LEFT", default_value_t = 0.0, allow_negative_numbers = true)]
    pub surface_left: f64,

    /// Client-space y offset of the image surface.
    #[arg(long, env = "LOUPE_SURFACE_TOP", default_value_t = 0.0, allow_negative_numbers = true)]
    pub surface_top: f64,
}

impl Cli {
    /// The image to load before the script, if any.
    #[must_use]
    pub fn initial_image(&self) -> Option<&str> {
        let url = self.image.trim();
        if self.no_image || url.is_empty() {
            return None;
        }
        Some(url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_image_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl FetchConfig {
    /// Build fetch config from environment variables.
    ///
    /// - `LOUPE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LOUPE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LOUPE_MAX_IMAGE_BYTES`: default 32 MiB
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            request_timeout_secs: env_parse("LOUPE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse("LOUPE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            max_image_bytes: env_parse("LOUPE_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset or malformed.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
