use std::future::Future;

use bytes::Bytes;
use reqwest::Url;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "metrics")]
use metrics::counter;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::builder::OllamaClientBuilder;
use crate::stream;
use crate::types::chat::{ChatRequest, ChatResponse};
use crate::types::embeddings::{EmbeddingRequest, EmbeddingResponse};
use crate::types::generate::{GenerateRequest, GenerateResponse};
use crate::types::{
    CopyRequest, CreateProgress, CreateRequest, DeleteRequest, FromBytes, HttpRequest,
    HttpStreamResponse, ListModelsResponse, ModelInfo, ProcessStatusResponse, ProgressRecord,
    PullRequest, PushRequest, ShowRequest, StreamRecord,
};
use crate::{ApiError, Error, OllamaClient, Result};

impl OllamaClient {
    pub fn builder() -> OllamaClientBuilder {
        OllamaClientBuilder::new()
    }

    /// Builds a client from the environment, see [`OllamaClientBuilder`].
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns a client sharing this one's transport whose calls stop with
    /// [`Error::Cancelled`] once `token` is cancelled.
    ///
    /// The token is checked when a request is submitted and between records of a
    /// streaming response. A callback that is already running is not interrupted.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            ..self.clone()
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Lists the models available locally (`GET /api/tags`).
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn list_models(&self) -> Result<ListModelsResponse> {
        #[cfg(feature = "metrics")]
        count_request("list_models", "non_streaming");

        self.call(HttpRequest::new("/api/tags").get())
            .await
            .map_err(|e| e.during("list models"))
    }

    /// Shows details of a model (`POST /api/show`).
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn show_model(&self, model: &str) -> Result<ModelInfo> {
        #[cfg(feature = "metrics")]
        count_request("show_model", "non_streaming");

        async {
            require("model name", model)?;
            let request = HttpRequest::new("/api/show").post().body(ShowRequest {
                model: model.to_string(),
            })?;
            self.call(request).await
        }
        .await
        .map_err(|e| e.during(format!("show model {:?}", model)))
    }

    /// Copies `source` to a new model named `destination` (`POST /api/copy`).
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn copy_model(&self, source: &str, destination: &str) -> Result<()> {
        #[cfg(feature = "metrics")]
        count_request("copy_model", "non_streaming");

        async {
            require("source model name", source)?;
            require("destination model name", destination)?;
            let request = HttpRequest::new("/api/copy").post().body(CopyRequest {
                source: source.to_string(),
                destination: destination.to_string(),
            })?;
            self.send(request).await.map(drop)
        }
        .await
        .map_err(|e| e.during(format!("copy model {:?} to {:?}", source, destination)))
    }

    /// Deletes a model (`DELETE /api/delete`).
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn delete_model(&self, model: &str) -> Result<()> {
        #[cfg(feature = "metrics")]
        count_request("delete_model", "non_streaming");

        async {
            require("model name", model)?;
            let request = HttpRequest::new("/api/delete").delete().body(DeleteRequest {
                model: model.to_string(),
            })?;
            self.send(request).await.map(drop)
        }
        .await
        .map_err(|e| e.during(format!("delete model {:?}", model)))
    }

    /// Downloads a model from the registry (`POST /api/pull`), reporting each
    /// progress record to `on_progress` until the server closes the stream.
    #[cfg_attr(feature = "tracing", instrument(skip(self, on_progress)))]
    pub async fn pull_model<F>(&self, model: &str, on_progress: F) -> Result<()>
    where
        F: FnMut(ProgressRecord),
    {
        #[cfg(feature = "metrics")]
        count_request("pull_model", "streaming");

        async {
            require("model name", model)?;
            let request = HttpRequest::new("/api/pull").post().body(PullRequest {
                model: model.to_string(),
                insecure: None,
                stream: true,
            })?;
            self.stream(request, on_progress).await
        }
        .await
        .map_err(|e| e.during(format!("pull model {:?}", model)))
    }

    /// Creates a model named `name` from the contents of a Modelfile
    /// (`POST /api/create`), reporting each status record to `on_progress`.
    #[cfg_attr(feature = "tracing", instrument(skip(self, modelfile, on_progress)))]
    pub async fn create_model<F>(&self, name: &str, modelfile: &str, on_progress: F) -> Result<()>
    where
        F: FnMut(CreateProgress),
    {
        #[cfg(feature = "metrics")]
        count_request("create_model", "streaming");

        async {
            require("model name", name)?;
            require("modelfile content", modelfile)?;
            let request = HttpRequest::new("/api/create").post().body(CreateRequest {
                name: name.to_string(),
                modelfile: modelfile.to_string(),
                stream: true,
            })?;
            self.stream(request, on_progress).await
        }
        .await
        .map_err(|e| e.during(format!("create model {:?}", name)))
    }

    /// Uploads a model to its registry (`POST /api/push`), reporting each
    /// progress record to `on_progress`.
    #[cfg_attr(feature = "tracing", instrument(skip(self, on_progress)))]
    pub async fn push_model<F>(&self, name: &str, on_progress: F) -> Result<()>
    where
        F: FnMut(ProgressRecord),
    {
        #[cfg(feature = "metrics")]
        count_request("push_model", "streaming");

        async {
            require("model name", name)?;
            let request = HttpRequest::new("/api/push").post().body(PushRequest {
                name: name.to_string(),
                insecure: None,
                stream: true,
            })?;
            self.stream(request, on_progress).await
        }
        .await
        .map_err(|e| e.during(format!("push model {:?}", name)))
    }

    /// Generates a complete response in one round trip (`POST /api/generate`
    /// with `"stream": false`, whatever `request.stream` says).
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(model = %request.model)))]
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        #[cfg(feature = "metrics")]
        count_request("generate", "non_streaming");

        async {
            require("model name", &request.model)?;
            let request = HttpRequest::new("/api/generate")
                .post()
                .body(request.with_stream(false))?;
            self.call(request).await
        }
        .await
        .map_err(|e| e.during("generate text"))
    }

    /// Streams a generation (`POST /api/generate` with `"stream": true`, whatever
    /// `request.stream` says). `on_chunk` receives every fragment in order; the
    /// call returns after the record with `done == true`.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request, on_chunk), fields(model = %request.model)))]
    pub async fn generate_stream<F>(&self, request: &GenerateRequest, on_chunk: F) -> Result<()>
    where
        F: FnMut(GenerateResponse),
    {
        #[cfg(feature = "metrics")]
        count_request("generate", "streaming");

        async {
            require("model name", &request.model)?;
            let request = HttpRequest::new("/api/generate")
                .post()
                .body(request.with_stream(true))?;
            self.stream(request, on_chunk).await
        }
        .await
        .map_err(|e| e.during("generate text"))
    }

    /// Sends a conversation and returns the complete reply (`POST /api/chat` with
    /// `"stream": false`).
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(model = %request.model)))]
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        #[cfg(feature = "metrics")]
        count_request("chat", "non_streaming");

        async {
            validate_chat(request)?;
            let request = HttpRequest::new("/api/chat")
                .post()
                .body(request.with_stream(false))?;
            self.call(request).await
        }
        .await
        .map_err(|e| e.during("chat"))
    }

    /// Streams the reply to a conversation (`POST /api/chat` with
    /// `"stream": true`), delivering every fragment to `on_chunk` until the record
    /// with `done == true`.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request, on_chunk), fields(model = %request.model)))]
    pub async fn chat_stream<F>(&self, request: &ChatRequest, on_chunk: F) -> Result<()>
    where
        F: FnMut(ChatResponse),
    {
        #[cfg(feature = "metrics")]
        count_request("chat", "streaming");

        async {
            validate_chat(request)?;
            let request = HttpRequest::new("/api/chat")
                .post()
                .body(request.with_stream(true))?;
            self.stream(request, on_chunk).await
        }
        .await
        .map_err(|e| e.during("chat"))
    }

    /// Computes an embedding vector for a prompt (`POST /api/embeddings`).
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(model = %request.model)))]
    pub async fn embeddings(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        #[cfg(feature = "metrics")]
        count_request("embeddings", "non_streaming");

        async {
            require("model name", &request.model)?;
            require("prompt", &request.prompt)?;
            let request = HttpRequest::new("/api/embeddings").post().body(request)?;
            self.call(request).await
        }
        .await
        .map_err(|e| e.during("generate embeddings"))
    }

    /// Lists the models currently loaded into memory (`GET /api/ps`).
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn process_status(&self) -> Result<ProcessStatusResponse> {
        #[cfg(feature = "metrics")]
        count_request("process_status", "non_streaming");

        self.call(HttpRequest::new("/api/ps").get())
            .await
            .map_err(|e| e.during("get process status"))
    }

    /// Races `future` against the cancellation token.
    async fn cancellable<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(Error::Cancelled),
            result = future => result,
        }
    }

    /// Unary executor: one round trip, the whole body buffered, non-2xx mapped
    /// to [`ApiError`].
    async fn send(&self, request: HttpRequest) -> Result<Bytes> {
        let response = self
            .cancellable(self.transport.send_http_request(request))
            .await?;

        if !response.is_success() {
            #[cfg(feature = "tracing")]
            tracing::warn!(status = response.status, "request failed");
            return Err(ApiError::from_response(response.status, &response.body).into());
        }
        Ok(response.body)
    }

    async fn call<T: FromBytes>(&self, request: HttpRequest) -> Result<T> {
        T::from_bytes(self.send(request).await?)
    }

    /// Streaming executor: a non-2xx status becomes an [`ApiError`] before any
    /// record is read; otherwise every record goes to `on_record`.
    async fn stream<M, F>(&self, request: HttpRequest, on_record: F) -> Result<()>
    where
        M: StreamRecord,
        F: FnMut(M),
    {
        let response = self
            .cancellable(self.transport.send_http_stream_request(request))
            .await?;

        match response {
            HttpStreamResponse::Failed(response) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(status = response.status, "streaming request failed");
                Err(ApiError::from_response(response.status, &response.body).into())
            }
            HttpStreamResponse::Streaming { status, body } => {
                #[cfg(feature = "tracing")]
                tracing::debug!(status, "reading response stream");
                stream::drive(status, body, &self.cancellation, on_record).await
            }
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn validate_chat(request: &ChatRequest) -> Result<()> {
    require("model name", &request.model)?;
    if request.messages.is_empty() {
        return Err(Error::Validation("at least one message is required".into()));
    }
    Ok(())
}

#[cfg(feature = "metrics")]
fn count_request(operation: &'static str, kind: &'static str) {
    counter!("ollama_client.requests_total", "operation" => operation, "type" => kind)
        .increment(1);
}
