//! Contains all data structures that are particularly used for Ollama Chat API

use ollama_client_macros::FromBytes;
use serde::{Deserialize, Serialize};

use super::{GenerationMetrics, ModelOptions, Role, StreamRecord};

/// Represents a chat request to the Ollama API.
///
/// Like [`GenerateRequest`](super::generate::GenerateRequest), the `stream` flag is
/// overridden per call: [`OllamaClient::chat`](crate::OllamaClient::chat) always sends
/// `false` and [`OllamaClient::chat_stream`](crate::OllamaClient::chat_stream) always
/// sends `true`.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// The name of the model to use for the chat completion (e.g., "llama2").
    pub model: String,
    /// The conversation so far, oldest message first.
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
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

    pub fn add_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
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

/// A single chat message, used both in requests and in responses.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct Message {
    /// The role of the sender (e.g., `User`, `Assistant`, `System`).
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// Optional base64-encoded images attached to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }
}

/// Represents a chat response from the Ollama API.
///
/// Streaming calls deliver one per line; `message.content` then holds the next
/// fragment of the assistant's reply.
#[derive(Deserialize, Serialize, Default, FromBytes, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// The name of the model that generated the response.
    #[serde(default)]
    pub model: String,
    /// The timestamp when the response was created.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub message: Message,
    /// Indicates if the chat completion is complete.
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    #[serde(flatten)]
    pub metrics: GenerationMetrics,
}

impl ChatResponse {
    pub fn tokens_per_second(&self) -> Option<f64> {
        self.metrics.tokens_per_second()
    }
}

impl StreamRecord for ChatResponse {
    fn is_terminal(&self) -> bool {
        self.done
    }
}
