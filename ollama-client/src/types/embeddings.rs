//! Request and response types for the Ollama Embeddings API.

use ollama_client_macros::FromBytes;
use serde::{Deserialize, Serialize};

use super::ModelOptions;

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct EmbeddingRequest {
    pub model: String,
    /// The text to embed.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn options(mut self, options: ModelOptions) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Deserialize, Serialize, Default, FromBytes, Debug, Clone, PartialEq)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub embedding: Vec<f64>,
}
