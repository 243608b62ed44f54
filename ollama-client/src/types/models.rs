use ollama_client_macros::FromBytes;
use serde::{Deserialize, Serialize};

/// Represents the response from listing all locally available models (`/api/tags`).
#[derive(Deserialize, Serialize, Default, FromBytes, Debug, Clone)]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// Represents the response from listing the models currently loaded (`/api/ps`).
#[derive(Deserialize, Serialize, Default, FromBytes, Debug, Clone)]
pub struct ProcessStatusResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// Information about a single model.
///
/// The same shape is used by the list, show and process-status endpoints. Each
/// endpoint fills a different subset of fields, so every field falls back to its
/// default when absent.
#[derive(Deserialize, Serialize, Default, FromBytes, Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// The name of the model (e.g., "llama2:latest").
    #[serde(default)]
    pub name: String,
    /// The model identifier, as reported by `/api/ps`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// When the model was last modified (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// The size of the model in bytes.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub digest: String,
    #[serde(default)]
    pub details: ModelDetails,
    /// When a loaded model will be unloaded (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// VRAM used by a loaded model, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_vram: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modelfile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct ModelDetails {
    #[serde(default)]
    pub parent_model: String,
    #[serde(default)]
    pub format: String,
    /// The family of the model (e.g., "llama").
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub families: Vec<String>,
    /// The parameter size of the model (e.g., "7B").
    #[serde(default)]
    pub parameter_size: String,
    /// The quantization level of the model (e.g., "Q4_0").
    #[serde(default)]
    pub quantization_level: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ShowRequest {
    pub model: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct CopyRequest {
    pub source: String,
    pub destination: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct DeleteRequest {
    pub model: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct PullRequest {
    pub model: String,
    /// Allow insecure connections to the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    pub stream: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateRequest {
    pub name: String,
    /// The contents of the Modelfile.
    pub modelfile: String,
    pub stream: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct PushRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    pub stream: bool,
}
