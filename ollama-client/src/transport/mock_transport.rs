use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream;
use futures::StreamExt;

use crate::transport::Transport;
use crate::types::{is_success_status, HttpRequest, HttpResponse, HttpStreamResponse};
use crate::{Error, Result};

/// One piece of a mocked response body.
#[derive(Debug, Clone)]
pub enum MockChunk {
    /// Bytes delivered as one read.
    Data(Bytes),
    /// The read fails with [`Error::StreamRead`] carrying this message.
    Fail(String),
    /// The body stops producing data without ending.
    Stall,
}

impl MockChunk {
    /// A chunk holding `line` followed by a newline.
    pub fn line(line: impl AsRef<str>) -> Self {
        MockChunk::Data(Bytes::from(format!("{}\n", line.as_ref())))
    }

    pub fn data(data: impl Into<Bytes>) -> Self {
        MockChunk::Data(data.into())
    }
}

#[derive(Debug, Clone)]
struct MockResponse {
    status: u16,
    chunks: Vec<MockChunk>,
}

/// A mock implementation of the [`Transport`] trait for testing purposes.
///
/// Responses are queued per request path and handed out in order, to buffered
/// and streaming requests alike. Every request that reaches the transport is
/// recorded, so tests can check what went on the wire, or that nothing did.
/// A path with nothing queued answers `404 {"error": "no mock response for <path>"}`.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a new, empty [`MockTransport`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and body for `path`.
    pub fn with_response(self, path: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        self.with_stream_chunks(path, status, vec![MockChunk::Data(body.into())])
    }

    /// Queues a `200` response whose body is `lines`, each newline-terminated and
    /// delivered as a separate read.
    pub fn with_stream_lines<I>(self, path: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let chunks = lines.into_iter().map(MockChunk::line).collect();
        self.with_stream_chunks(path, 200, chunks)
    }

    /// Queues a response whose body is delivered chunk by chunk.
    pub fn with_stream_chunks(
        self,
        path: impl Into<String>,
        status: u16,
        chunks: Vec<MockChunk>,
    ) -> Self {
        lock(&self.responses)
            .entry(path.into())
            .or_default()
            .push_back(MockResponse { status, chunks });
        self
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request received for `path`.
    pub fn last_request(&self, path: &str) -> Option<HttpRequest> {
        lock(&self.requests)
            .iter()
            .rev()
            .find(|request| request.path == path)
            .cloned()
    }

    fn take_response(&self, request: HttpRequest) -> MockResponse {
        let path = request.path.clone();
        lock(&self.requests).push(request);

        lock(&self.responses)
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| MockResponse {
                status: 404,
                chunks: vec![MockChunk::data(
                    serde_json::json!({ "error": format!("no mock response for {}", path) })
                        .to_string(),
                )],
            })
    }
}

/// Concatenates all chunks, failing or stalling where the chunks say so.
async fn collect(response: MockResponse) -> Result<HttpResponse> {
    let mut body = BytesMut::new();
    for chunk in response.chunks {
        match chunk {
            MockChunk::Data(bytes) => body.extend_from_slice(&bytes),
            MockChunk::Fail(message) => return Err(Error::StreamRead(message)),
            MockChunk::Stall => futures::future::pending::<()>().await,
        }
    }
    Ok(HttpResponse {
        status: response.status,
        body: body.freeze(),
    })
}

#[async_trait]
impl Transport for MockTransport {
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(path = %request.path)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        collect(self.take_response(request)).await
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(path = %request.path)))]
    async fn send_http_stream_request(&self, request: HttpRequest) -> Result<HttpStreamResponse> {
        let response = self.take_response(request);
        if !is_success_status(response.status) {
            return Ok(HttpStreamResponse::Failed(collect(response).await?));
        }

        let status = response.status;
        let stalls = response
            .chunks
            .iter()
            .any(|chunk| matches!(chunk, MockChunk::Stall));
        let items = response
            .chunks
            .into_iter()
            .map_while(|chunk| match chunk {
                MockChunk::Data(bytes) => Some(Ok(bytes)),
                MockChunk::Fail(message) => Some(Err(Error::StreamRead(message))),
                MockChunk::Stall => None,
            })
            .collect::<Vec<Result<Bytes>>>();

        let body = if stalls {
            stream::iter(items).chain(stream::pending()).boxed()
        } else {
            stream::iter(items).boxed()
        };
        Ok(HttpStreamResponse::Streaming { status, body })
    }
}
