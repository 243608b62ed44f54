//! A typed async client for the Ollama HTTP API.
//!
//! Unary endpoints return their decoded response. Long-running endpoints (model
//! pull, push and create, streamed generation and chat) deliver one decoded record
//! per line of the response body to a callback, in order, until the body ends or a
//! record marks completion.

use std::sync::Arc;

use reqwest::Url;

use self::transport::Transport;

pub mod builder;
pub mod client;
mod error;
pub mod parser;
mod stream;
pub mod transport;
pub mod types;

pub use error::{ApiError, Error, ErrorKind, Result};
pub use tokio_util::sync::CancellationToken;

/// Client for a single Ollama server.
///
/// Cloning is cheap: clones share the transport and its connection pool. The
/// client holds no per-call state, so it can be used from many tasks at once.
#[derive(Clone)]
pub struct OllamaClient {
    transport: Arc<dyn Transport + Send + Sync>,
    base_url: Url,
    cancellation: CancellationToken,
}
