//! Contains all data structures that are particularly used for Ollama Generate API

use ollama_client_macros::FromBytes;
use serde::{Deserialize, Serialize};

use super::{GenerationMetrics, ModelOptions, StreamRecord};

/// Represents a request to the Ollama API for text generation.
///
/// The same request is used by [`OllamaClient::generate`](crate::OllamaClient::generate)
/// and [`OllamaClient::generate_stream`](crate::OllamaClient::generate_stream). Whatever
/// `stream` holds here, each call sends a copy with the flag its response framing
/// needs, so the request can be reused with both.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// The name of the model to use for generation (e.g., "llama2").
    pub model: String,
    pub prompt: String,
    /// A system message that overrides the one in the Modelfile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// A prompt template that overrides the one in the Modelfile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Optional base64-encoded images for multimodal models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Response format, e.g. `"json"` or a JSON schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
    /// If `true`, the prompt is sent without any templating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    /// How long the model stays loaded after the request (e.g. `"5m"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Returns a copy of this request with `stream` set to the given value.
    pub fn with_stream(&self, stream: bool) -> Self {
        Self {
            stream,
            ..self.clone()
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the images for the request. An image should be a Base64-encoded string
    pub fn images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn format(mut self, format: impl Into<serde_json::Value>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    pub fn options(mut self, options: ModelOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Represents a response from the Ollama API for text generation.
///
/// A non-streaming call returns one of these holding the whole text; a streaming
/// call delivers one per line, each holding the next fragment in `response`.
#[derive(Deserialize, Serialize, Default, FromBytes, Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    /// The name of the model that generated the response.
    #[serde(default)]
    pub model: String,
    /// The timestamp when the response was created.
    #[serde(default)]
    pub created_at: String,
    /// The generated text (or the next fragment of it when streaming).
    #[serde(default)]
    pub response: String,
    /// Indicates if the generation is complete.
    #[serde(default)]
    pub done: bool,
    /// The reason why the generation finished (e.g., "stop", "length").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    /// An encoding of the conversation, usable as context for a follow-up request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<i64>>,
    #[serde(flatten)]
    pub metrics: GenerationMetrics,
}

impl GenerateResponse {
    pub fn tokens_per_second(&self) -> Option<f64> {
        self.metrics.tokens_per_second()
    }
}

impl StreamRecord for GenerateResponse {
    fn is_terminal(&self) -> bool {
        self.done
    }
}
