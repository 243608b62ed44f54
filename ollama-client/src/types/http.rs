use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use serde::Serialize;

use crate::Result;

/// A transport-agnostic request: a verb, a path relative to the base URL and an
/// optional JSON body.
#[derive(Default, Debug, Clone)]
pub struct HttpRequest {
    pub path: String,
    pub verb: HttpVerb,
    pub body: Option<serde_json::Value>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    #[default]
    GET,
    POST,
    DELETE,
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A response whose body is read incrementally.
///
/// Transports only hand out a live body for successful statuses; for any other
/// status the body is collected first so it can become an
/// [`ApiError`](crate::ApiError).
pub enum HttpStreamResponse {
    Streaming { status: u16, body: ByteStream },
    Failed(HttpResponse),
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

/// `true` for statuses in `200..300`.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

impl HttpRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn get(mut self) -> Self {
        self.verb = HttpVerb::GET;
        self
    }

    pub fn post(mut self) -> Self {
        self.verb = HttpVerb::POST;
        self
    }

    pub fn delete(mut self) -> Self {
        self.verb = HttpVerb::DELETE;
        self
    }

    pub fn body<T: Serialize>(mut self, body: T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// The `stream` flag carried in the JSON body, if any.
    pub fn stream_flag(&self) -> Option<bool> {
        self.body.as_ref()?.get("stream")?.as_bool()
    }
}
