use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Response, Transport, TransportError};

/// A scripted transport for tests. Returns pre-defined outcomes in order,
/// repeating the last one once the script runs out, and records every URL
/// it was asked for.
pub struct MockTransport {
    outcomes: Vec<Result<Response, TransportError>>,
    index: AtomicUsize,
    requests: Mutex<Vec<Url>>,
}

impl MockTransport {
    pub fn new(outcomes: Vec<Result<Response, TransportError>>) -> Self {
        Self {
            outcomes,
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `status` and `body`.
    pub fn respond(status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(vec![Ok(Response::new(status, body))])
    }

    /// Always fail with `err`.
    pub fn fail(err: TransportError) -> Self {
        Self::new(vec![Err(err)])
    }

    /// URLs requested so far, in call order.
    pub fn requests(&self) -> Vec<Url> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &Url) -> Result<Response, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .get(i)
            .or_else(|| self.outcomes.last())
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::Other(
                    "MockTransport: no scripted responses".to_string(),
                ))
            })
    }
}
