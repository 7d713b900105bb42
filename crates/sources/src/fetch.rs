use std::time::Duration;

use async_trait::async_trait;

/// Status and full body of a GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("GET {url}: {source}")]
    Transport { url: String, source: reqwest::Error },
}

/// Performs the HTTP requests of `Url` sources.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// [`HttpFetcher`] backed by a shared `reqwest` client. Bodies are read at
/// most one byte past `max_body_bytes`, leaving the rejection to the caller.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(FetchError::Client)?;
        Ok(Self { client, max_body_bytes })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let transport = |source| FetchError::Transport { url: url.to_string(), source };
        let mut resp = self.client.get(url).send().await.map_err(transport)?;
        let status = resp.status().as_u16();
        let cap = self.max_body_bytes.saturating_add(1);
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(transport)? {
            let take = chunk.len().min(cap - body.len());
            body.extend_from_slice(&chunk[..take]);
            if body.len() >= cap {
                break;
            }
        }
        Ok(HttpResponse { status, body })
    }
}
