//! Contains data structures for requests and responses to the Ollama API.
//!
//! This module defines the various types used to interact with the Ollama server,
//! including chat messages, generation requests, model management payloads,
//! streamed progress records, and the HTTP envelopes exchanged with a transport.

pub mod chat;
pub mod embeddings;
pub mod generate;
mod http;
mod models;
mod progress;
mod shared;

pub use http::*;
pub use models::*;
pub use progress::*;
pub use shared::*;

use bytes::Bytes;

use crate::Result;

/// Decodes a complete, successful response body. Implemented for every unary
/// response type through `#[derive(FromBytes)]`.
pub trait FromBytes: Sized {
    fn from_bytes(bytes: Bytes) -> Result<Self>;
}

/// A record that can arrive on a line-delimited JSON response stream.
pub trait StreamRecord: serde::de::DeserializeOwned {
    /// `true` when no further records follow for this operation.
    fn is_terminal(&self) -> bool {
        false
    }
}
