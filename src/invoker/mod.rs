//! The function invoker: one GET to a fixed endpoint, one result back.
//!
//! [`FunctionInvoker::invoke`] never returns an error and never panics.
//! Every outcome, including transport faults, is folded into an
//! [`InvocationResult`].

pub mod endpoint;
pub mod mock;
pub mod transport;

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, warn};

pub use endpoint::{Endpoint, EndpointError, redact_url};
pub use transport::{Response, Transport, TransportError};

/// Outcome of a single invocation. Exactly one variant per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InvocationResult {
    /// 2xx response; the body decoded as text.
    Success { body: String },
    /// The function answered with a non-success status.
    Status {
        status: u16,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// The call itself failed.
    Failure { message: String },
}

/// A non-success [`InvocationResult`], for callers that want `?`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("function returned status {status}")]
    Status { status: u16, reason: Option<String> },
    #[error("function call failed: {0}")]
    Failure(String),
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success { .. })
    }

    pub fn into_result(self) -> Result<String, InvocationError> {
        match self {
            InvocationResult::Success { body } => Ok(body),
            InvocationResult::Status { status, reason } => {
                Err(InvocationError::Status { status, reason })
            }
            InvocationResult::Failure { message } => Err(InvocationError::Failure(message)),
        }
    }

    fn from_response(resp: Response) -> Self {
        if resp.status.is_success() {
            InvocationResult::Success { body: resp.body }
        } else {
            InvocationResult::Status {
                status: resp.status.as_u16(),
                reason: resp.status.canonical_reason().map(str::to_string),
            }
        }
    }
}

/// Renders the text contract: the body, `Error: <status>`, or
/// `Exception: <message>`.
impl fmt::Display for InvocationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationResult::Success { body } => f.write_str(body),
            InvocationResult::Status {
                status,
                reason: Some(reason),
            } => write!(f, "Error: {status} {reason}"),
            InvocationResult::Status {
                status,
                reason: None,
            } => write!(f, "Error: {status}"),
            InvocationResult::Failure { message } => write!(f, "Exception: {message}"),
        }
    }
}

/// Issues one GET per [`invoke`](Self::invoke) against a fixed endpoint,
/// through a caller-supplied transport.
pub struct FunctionInvoker<T> {
    transport: T,
    endpoint: Endpoint,
}

impl<T: Transport> FunctionInvoker<T> {
    pub fn new(transport: T, endpoint: Endpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn invoke(&self) -> InvocationResult {
        let url = self.endpoint.url();
        debug!(
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            "invoking function"
        );

        let outcome = AssertUnwindSafe(self.transport.get(url))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(resp)) => {
                let result = InvocationResult::from_response(resp);
                match &result {
                    InvocationResult::Success { body } => {
                        debug!(bytes = body.len(), "function call succeeded");
                    }
                    InvocationResult::Status { status, .. } => {
                        warn!(status, "function returned non-success status");
                    }
                    InvocationResult::Failure { .. } => {}
                }
                result
            }
            Ok(Err(err)) => {
                warn!(error = %err, "function call failed");
                InvocationResult::Failure {
                    message: err.to_string(),
                }
            }
            Err(payload) => {
                let message = format!("transport panicked: {}", panic_message(payload.as_ref()));
                warn!(error = %message, "function call failed");
                InvocationResult::Failure { message }
            }
        }
    }

    /// [`invoke`](Self::invoke), rendered to text.
    pub async fn invoke_text(&self) -> String {
        self.invoke().await.to_string()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
