//! HTTP image fetcher.
//!
//! Thin reqwest wrapper implementing [`ImageFetcher`]. The body is streamed
//! chunk by chunk so oversized images are rejected before they are buffered.

use std::time::Duration;

use picker::source::ImageFetcher;
use picker::surface::LoadError;

use crate::config::FetchConfig;
use crate::error::AppError;

pub struct HttpImageFetcher {
    http: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageFetcher {
    /// Build a client with the configured timeouts and size limit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &FetchConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, max_bytes: config.max_image_bytes })
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let mut response = self.http.get(url).send().await.map_err(|e| LoadError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }
        if let Some(declared) = response.content_length() {
            check_size(usize::try_from(declared).unwrap_or(usize::MAX), self.max_bytes)?;
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| LoadError::Fetch(e.to_string()))? {
            check_size(body.len() + chunk.len(), self.max_bytes)?;
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// Reject bodies longer than `limit`.
fn check_size(len: usize, limit: usize) -> Result<(), LoadError> {
    if len > limit { Err(LoadError::TooLarge { limit }) } else { Ok(()) }
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
