use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use reqwest::{Client, Url};
use tokio_util::sync::CancellationToken;

use crate::transport::{ReqwestTransport, Transport};
use crate::{Error, OllamaClient, Result};

/// Base URL used when neither [`OllamaClientBuilder::base_url`] nor `OLLAMA_HOST` is set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Total timeout for non-streaming requests unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A builder for constructing an [`OllamaClient`].
///
/// - Uses the configured base URL, else the `OLLAMA_HOST` environment variable,
///   else `http://localhost:11434`. A host without a scheme gets `http://`.
/// - Uses the configured API key, else `OLLAMA_API_KEY`, else nothing.
/// - Applies a 30 second timeout to non-streaming requests. Streaming requests
///   (pull, push, create, streamed generate and chat) have no total timeout.
/// - Uses `reqwest`-based transport by default - [`ReqwestTransport`].
#[derive(Default)]
pub struct OllamaClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport + Send + Sync>>,
}

impl OllamaClientBuilder {
    /// Creates a new [`OllamaClientBuilder`]. This method is called by [`OllamaClient::builder`]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the Ollama API. An empty string means "not set".
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets a bearer token sent with every request.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the total timeout for non-streaming requests.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the timeout for establishing a connection, for every request.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom transport implementation for the client.
    ///
    /// This allows for using different HTTP clients or mock implementations for testing.
    /// When set, the API key and timeouts configured on this builder are not used.
    ///
    /// For testing, you can use [`MockTransport`](crate::transport::MockTransport)
    /// or your own mock [`Transport`] implementations.
    pub fn transport(mut self, transport: Arc<dyn Transport + Send + Sync>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the [`OllamaClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL cannot be parsed and
    /// [`Error::Client`] if the `reqwest` client cannot be built.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub fn build(self) -> Result<OllamaClient> {
        let base_url_str = self
            .base_url
            .filter(|url| !url.is_empty())
            .or_else(|| std::env::var("OLLAMA_HOST").ok().filter(|url| !url.is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&base_url_str)?;

        let transport = if let Some(t) = self.transport {
            t
        } else {
            let api_key = self
                .api_key
                .or_else(|| std::env::var("OLLAMA_API_KEY").ok());

            let mut client_builder = Client::builder();
            if let Some(connect_timeout) = self.connect_timeout {
                client_builder = client_builder.connect_timeout(connect_timeout);
            }
            let client = client_builder
                .build()
                .map_err(|e| Error::Client(e.to_string()))?;

            Arc::new(
                ReqwestTransport::from_client(client, base_url.clone(), api_key)
                    .request_timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT)),
            )
        };

        Ok(OllamaClient {
            transport,
            base_url,
            cancellation: CancellationToken::new(),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    Url::parse(&with_scheme).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        let url = parse_base_url("gpu-box:11434").unwrap();
        assert_eq!(url.as_str(), "http://gpu-box:11434/");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let url = parse_base_url("https://ollama.internal/prefix").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.path(), "/prefix");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse_base_url("http://").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
