//! # Error Types
//!
//! All failures of the pipeline funnel through [`DashError`]. Callers that only need to
//! decide between "show an empty panel" and "this is a bug" use [`DashError::kind`].

use std::io;
use thiserror::Error;

/// Errors that can occur while fetching, parsing, transforming or persisting race data.
#[derive(Error, Debug)]
pub enum DashError {
    /// HTTP request failed (connection refused, timeout, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// Body was not JSON or did not have the expected shape
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    /// A documented precondition of a transform was violated
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Selection store could not be read or written
    #[error("state store IO: {0}")]
    Store(#[from] io::Error),

    /// Selection store contents could not be (de)serialized
    #[error("state store format: {0}")]
    StoreFormat(#[from] serde_json::Error),
}

/// Coarse classification of [`DashError`] used for recovery decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    MalformedResponse,
    InvalidInput,
    Storage,
}

impl DashError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashError::Http(_) | DashError::Status { .. } => ErrorKind::Network,
            DashError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            DashError::InvalidInput(_) => ErrorKind::InvalidInput,
            DashError::Store(_) | DashError::StoreFormat(_) => ErrorKind::Storage,
        }
    }

    /// True for failures a view recovers from by showing an empty panel.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Network | ErrorKind::MalformedResponse
        )
    }

    pub(crate) fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        DashError::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        DashError::InvalidInput(reason.into())
    }
}
