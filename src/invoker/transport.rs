use std::error::Error as _;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

/// What came back from the wire: a status line and the body as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A fault between sending the request and having the body in hand.
///
/// Messages never include the request URL, since the URL carries the
/// access key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let message = error_chain(&err);
        if err.is_timeout() {
            TransportError::Timeout(message)
        } else if err.is_connect() {
            TransportError::Connect(message)
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(message)
        } else {
            TransportError::Other(message)
        }
    }
}

/// Flatten an error and its sources into `outer: inner: innermost`.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

/// The injected HTTP GET capability. Implementations must be safe to share
/// across concurrent invocations.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Response, TransportError>;
}

/// A pre-built, caller-owned client. Cloning a `reqwest::Client` shares its
/// connection pool, so callers can hand over a clone and keep using theirs.
#[async_trait]
impl Transport for reqwest::Client {
    async fn get(&self, url: &Url) -> Result<Response, TransportError> {
        let resp = reqwest::Client::get(self, url.clone()).send().await?;
        let status = resp.status();

        // A non-success result never carries the body, so don't wait for it.
        let body = if status.is_success() {
            resp.text().await?
        } else {
            String::new()
        };

        Ok(Response { status, body })
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &Url) -> Result<Response, TransportError> {
        (**self).get(url).await
    }
}
