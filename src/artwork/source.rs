//! Where artwork bytes come from.

use std::time::Duration;

use async_trait::async_trait;

use super::FetchError;

/// A download in progress, read chunk by chunk.
#[async_trait]
pub trait ArtworkStream: Send {
    /// Next chunk, or `None` at the end.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError>;
}

/// Opens artwork URLs.
#[async_trait]
pub trait ArtworkSource: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn ArtworkStream>, FetchError>;
}

/// Artwork source over HTTP(S).
pub struct HttpArtworkSource {
    http_client: reqwest::Client,
}

impl HttpArtworkSource {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl ArtworkSource for HttpArtworkSource {
    async fn open(&self, url: &str) -> Result<Box<dyn ArtworkStream>, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Box::new(HttpStream { response }))
    }
}

struct HttpStream {
    response: reqwest::Response,
}

#[async_trait]
impl ArtworkStream for HttpStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
        self.response
            .chunk()
            .await
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}
