use serde::{Deserialize, Serialize};

use super::StreamRecord;

/// A progress update streamed while pulling or pushing a model.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    /// Human readable phase, e.g. `"pulling manifest"`, `"downloading"`, `"success"`.
    #[serde(default)]
    pub status: String,
    /// The layer currently being transferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Total bytes of the current layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Bytes transferred so far for the current layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
}

pub type PullProgress = ProgressRecord;
pub type PushProgress = ProgressRecord;

impl ProgressRecord {
    /// Completion of the current layer as a fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> Option<f64> {
        match (self.completed, self.total) {
            (Some(completed), Some(total)) if total > 0 => {
                Some((completed as f64 / total as f64).min(1.0))
            }
            _ => None,
        }
    }
}

impl StreamRecord for ProgressRecord {}

/// A progress update streamed while creating a model from a Modelfile.
#[derive(Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct CreateProgress {
    #[serde(default)]
    pub status: String,
}

impl StreamRecord for CreateProgress {}
