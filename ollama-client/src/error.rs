//! Error types returned by every [`OllamaClient`](crate::OllamaClient) operation.

use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A required input was missing; raised before any network access.
    #[error("{0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body failed while it was being read incrementally.
    #[error("Stream read error: {0}")]
    StreamRead(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Operation cancelled")]
    Cancelled,

    /// Names the public operation that failed; `source` is the underlying cause.
    #[error("failed to {operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse classification of an [`Error`], looking through operation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Api,
    Decode,
    Cancelled,
}

impl Error {
    pub(crate) fn during(self, operation: impl Into<String>) -> Self {
        Error::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any operation context.
    pub fn root(&self) -> &Error {
        match self {
            Error::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Operation { source, .. } => source.kind(),
            Error::Validation(_) => ErrorKind::Validation,
            Error::InvalidUrl(_)
            | Error::Client(_)
            | Error::Transport(_)
            | Error::StreamRead(_) => ErrorKind::Transport,
            Error::Api(_) => ErrorKind::Api,
            Error::JsonParse(_) => ErrorKind::Decode,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// The structured server error, if this failure came from the server.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self.root() {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.api_error(), Some(err) if err.status_code == 404)
    }
}

/// An error reported by the Ollama server: the HTTP status and its message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Ollama API error (status {status_code}): {message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
}

/// The `{"error": "..."}` envelope the server uses for failures.
#[derive(Deserialize, Debug)]
pub(crate) struct ErrorEnvelope {
    pub error: String,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Builds an [`ApiError`] from a failed response. The `error` field of a JSON
    /// envelope is used as the message; any other body is used verbatim.
    pub fn from_response(status_code: u16, body: &[u8]) -> Self {
        let message = match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(envelope) => envelope.error,
            Err(_) => String::from_utf8_lossy(body).into_owned(),
        };
        Self {
            status_code,
            message,
        }
    }
}
