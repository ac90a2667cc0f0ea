//! HTTP boundary of the client
//!
//! The client only needs "send this request, give me the status and body".
//! Keeping that behind [`Transport`] lets tests run the full protocol against
//! an in-memory service, and leaves timeouts and connection policy to
//! whoever builds the transport.

mod http_client;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

pub use http_client::ReqwestTransport;

/// A request to the secret management service
#[derive(Debug, Clone)]
pub struct SmsRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    /// Secret value for writes, sent as `text/plain`
    pub body: Option<String>,
}

impl SmsRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsResponse {
    pub status: StatusCode,
    pub body: String,
}

impl SmsResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: SmsRequest) -> Result<SmsResponse, TransportError>;
}
