// src/utils/http.rs

//! HTTP transport seam.
//!
//! Redirects are never followed at the transport level; the fetcher handles
//! them explicitly so the redirect policy (follow/depth/update) stays in one
//! place. Network-level failures map to `Err`, any HTTP status, including
//! 3xx and 5xx, maps to `Ok`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::models::FetcherConfig;

/// Network-level failure (DNS, timeout, connection refused).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self(error.to_string())
    }
}

/// A raw HTTP response with the parts the fetcher cares about.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// `Location` header, present on redirect responses
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status) && self.location.is_some()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for issuing GET requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport with redirect following disabled.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a configured transport.
    pub fn new(config: &FetcherConfig) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_requires_location() {
        let with_location = HttpResponse {
            status: 301,
            location: Some("http://example.org/new.json".into()),
            body: Vec::new(),
        };
        assert!(with_location.is_redirect());

        let without_location = HttpResponse {
            status: 301,
            location: None,
            body: Vec::new(),
        };
        assert!(!without_location.is_redirect());
    }

    #[test]
    fn test_success_range() {
        let ok = HttpResponse {
            status: 204,
            location: None,
            body: Vec::new(),
        };
        assert!(ok.is_success());

        let server_error = HttpResponse {
            status: 500,
            location: None,
            body: Vec::new(),
        };
        assert!(!server_error.is_success());
        assert!(!server_error.is_redirect());
    }
}
