//! Issuing requests.
//!
//! A [`Backend`] turns a request into the raw response text; it may be a WASM
//! bridge, an HTTP client, or a recorded fixture. [`issue`] makes exactly one
//! call, bounds it by a deadline and decodes the result. Anything that keeps
//! a well-formed response from arriving is an [`InfraError`].

use std::future::Future;
use std::time::Duration;

use crate::{decode_response, ProtocolError, Request, Response};

/// Failure of the transport itself.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("transport failed: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        TransportError {
            message: message.into(),
        }
    }
}

/// No usable response was obtained.
#[derive(Debug, thiserror::Error)]
pub enum InfraError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("no response within {}ms", deadline.as_millis())]
    Timeout { deadline: Duration },
    #[error("malformed response: {0}")]
    Malformed(#[source] ProtocolError),
}

/// Something that executes analysis commands.
pub trait Backend {
    /// Run `request` and return the raw wire response.
    fn call(&self, request: &Request) -> impl Future<Output = Result<String, TransportError>>;
}

/// Send `request` once and wait at most `deadline` for the response.
#[tracing::instrument(level = "debug", skip_all, fields(command = %request.command(), deadline = ?deadline))]
pub async fn issue<B: Backend>(
    backend: &B,
    request: &Request,
    deadline: Duration,
) -> Result<Response, InfraError> {
    let raw = match tokio::time::timeout(deadline, backend.call(request)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "backend transport failed");
            return Err(InfraError::Transport(err));
        }
        Err(_elapsed) => {
            tracing::warn!("backend did not answer before the deadline");
            return Err(InfraError::Timeout { deadline });
        }
    };
    tracing::debug!(bytes = raw.len(), "response received");
    decode_response(request.command(), &raw).map_err(InfraError::Malformed)
}
