//! Hugging Face Inference API request/response payloads.

use serde::{Deserialize, Serialize};

/// Request body for a hosted text-to-image model.
#[derive(Debug, Serialize)]
pub struct InferenceRequest {
    pub inputs: String,
    pub options: InferenceOptions,
}

/// Provider options sent alongside the inputs.
#[derive(Debug, Serialize)]
pub struct InferenceOptions {
    /// Block until the model is loaded instead of returning a 503 "loading" status.
    pub wait_for_model: bool,
}

impl InferenceRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            inputs: prompt.to_string(),
            options: InferenceOptions {
                wait_for_model: true,
            },
        }
    }
}

/// Error body returned with non-2xx statuses.
///
/// `error` is usually a string but some deployments return a list of strings.
#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    pub error: Option<serde_json::Value>,
}

impl ProviderErrorBody {
    pub fn message(&self) -> Option<String> {
        let message = match self.error.as_ref()? {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            _ => return None,
        };

        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}
