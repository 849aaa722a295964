//! Outbound media resolution: callers supply either inline base64 bytes or
//! a remote URL; both resolve to raw bytes before a send is attempted.

use {
    anyhow::Result,
    async_trait::async_trait,
    base64::{Engine as _, engine::general_purpose::STANDARD},
    bytes::Bytes,
    thiserror::Error,
    tracing::debug,
};

/// Hard ceiling on resolved media size.
pub const MAX_MEDIA_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to fetch media: {0}")]
    Fetch(String),

    #[error("invalid base64 media payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("media exceeds {MAX_MEDIA_BYTES} bytes")]
    TooLarge,
}

/// Where outbound media comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Remote URL, fetched at send time.
    Url(String),
    /// Inline base64-encoded bytes.
    Base64(String),
}

impl MediaSource {
    /// Classify a raw caller-supplied string: anything with an http(s)
    /// scheme is fetched, everything else is treated as inline base64.
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            Self::Url(input.to_string())
        } else {
            Self::Base64(input.to_string())
        }
    }
}

/// Fetch-by-URL collaborator.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Default fetcher backed by a shared reqwest client.
#[derive(Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?)
    }
}

/// Resolve a media source to raw bytes.
pub async fn resolve(source: &MediaSource, fetcher: &dyn Fetcher) -> Result<Bytes, MediaError> {
    let bytes = match source {
        MediaSource::Url(url) => {
            debug!(url = %url, "fetching outbound media");
            fetcher
                .fetch(url)
                .await
                .map_err(|e| MediaError::Fetch(e.to_string()))?
        },
        MediaSource::Base64(encoded) => Bytes::from(STANDARD.decode(encoded)?),
    };
    if bytes.len() > MAX_MEDIA_BYTES {
        return Err(MediaError::TooLarge);
    }
    Ok(bytes)
}
