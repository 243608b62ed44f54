use async_trait::async_trait;

use crate::types::{HttpRequest, HttpResponse, HttpStreamResponse};
use crate::Result;

mod mock_transport;
mod reqwest_transport;

pub use mock_transport::{MockChunk, MockTransport};
pub use reqwest_transport::ReqwestTransport;

/// The seam between [`OllamaClient`](crate::OllamaClient) and the network.
///
/// Implementations perform exactly one round trip per call and never retry.
/// They report the status code as-is; classifying it is the client's job.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends a request and buffers the complete response body.
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Sends a request whose successful response body is read incrementally.
    ///
    /// For a non-2xx status the body must be collected and returned as
    /// [`HttpStreamResponse::Failed`].
    async fn send_http_stream_request(&self, request: HttpRequest) -> Result<HttpStreamResponse>;
}
