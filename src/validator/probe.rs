//! oEmbed fetching.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::config::MAX_OEMBED_BODY_SIZE;
use crate::error_handling::{categorize_reqwest_error, ProbeError};

/// Fetches an oEmbed URL and returns its body.
///
/// Implementations never panic on network failures; every failure is a
/// `ProbeError`.
#[async_trait]
pub trait OEmbedProbe: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ProbeError>;
}

/// `OEmbedProbe` backed by the shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Arc<reqwest::Client>,
}

impl HttpProbe {
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OEmbedProbe for HttpProbe {
    async fn fetch(&self, url: &str) -> Result<String, ProbeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| categorize_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_OEMBED_BODY_SIZE as u64 {
                return Err(ProbeError::Malformed(format!(
                    "body of {} bytes exceeds {} bytes",
                    content_length, MAX_OEMBED_BODY_SIZE
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| categorize_reqwest_error(&e))?;

        // Content-Length may be missing or wrong
        if bytes.len() > MAX_OEMBED_BODY_SIZE {
            return Err(ProbeError::Malformed(format!(
                "body of {} bytes exceeds {} bytes",
                bytes.len(),
                MAX_OEMBED_BODY_SIZE
            )));
        }

        let body = String::from_utf8(bytes.to_vec())
            .map_err(|e| ProbeError::Decode(e.to_string()))?;
        if body.trim().is_empty() {
            return Err(ProbeError::EmptyBody);
        }

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
