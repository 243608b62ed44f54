use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};

use crate::transport::Transport;
use crate::types::{is_success_status, HttpRequest, HttpResponse, HttpStreamResponse, HttpVerb};
use crate::{Error, Result};

/// A [`Transport`] implementation that uses the `reqwest` crate for making HTTP requests.
///
/// This is the default transport used by [`OllamaClient`](crate::OllamaClient) if no custom transport
/// is provided. Every request carries `Content-Type: application/json` and
/// `Accept: application/json`. The request timeout only applies to buffered
/// requests; streaming requests may run as long as the server keeps sending.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    request_timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Creates a new `ReqwestTransport` with a default `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Client`] if the `reqwest` client cannot be built.
    pub fn new(base_url: Url, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;
        Ok(Self::from_client(client, base_url, api_key))
    }

    /// Wraps an already configured `reqwest` client.
    pub fn from_client(client: Client, base_url: Url, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
            request_timeout: None,
        }
    }

    /// Sets the total timeout applied to buffered (non-streaming) requests.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `path` to the base URL, keeping any path prefix the base URL has.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path)).map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    fn build_request(&self, request: &HttpRequest) -> Result<reqwest::RequestBuilder> {
        let url = self.endpoint(&request.path)?;

        let mut request_builder = match request.verb {
            HttpVerb::GET => self.client.get(url),
            HttpVerb::POST => self.client.post(url),
            HttpVerb::DELETE => self.client.delete(url),
        }
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json");

        if let Some(api_key) = &self.api_key {
            request_builder = request_builder.bearer_auth(api_key);
        }

        if let Some(body) = &request.body {
            request_builder = request_builder.body(serde_json::to_vec(body)?);
        }

        Ok(request_builder)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(path = %request.path)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut request_builder = self.build_request(&request)?;
        if let Some(timeout) = self.request_timeout {
            request_builder = request_builder.timeout(timeout);
        }

        let response = request_builder.send().await.map_err(Error::Transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(Error::Transport)?;
        Ok(HttpResponse { status, body })
    }

    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(path = %request.path)))]
    async fn send_http_stream_request(&self, request: HttpRequest) -> Result<HttpStreamResponse> {
        let response = self
            .build_request(&request)?
            .send()
            .await
            .map_err(Error::Transport)?;
        let status = response.status().as_u16();

        if !is_success_status(status) {
            let body = response.bytes().await.map_err(Error::Transport)?;
            return Ok(HttpStreamResponse::Failed(HttpResponse { status, body }));
        }

        let body = response
            .bytes_stream()
            .map(|item| item.map_err(Error::Transport))
            .boxed();
        Ok(HttpStreamResponse::Streaming { status, body })
    }
}
