use super::types::ProviderErrorBody;
use crate::{Error, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Message used when a failed response carries no usable `error` field.
pub const PROVIDER_FAILURE: &str = "Failed to generate image";

/// Thin REST client for one Hugging Face inference endpoint.
pub struct HuggingFaceHttpClient {
    client: Client,
    api_token: String,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HuggingFaceHttpClient {
    /// `timeout` of `None` lets a request run until the provider answers.
    pub fn new(api_token: String, endpoint: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(api_token, endpoint, timeout, Client::new())
    }

    pub fn new_with_client(
        api_token: String,
        endpoint: String,
        timeout: Option<Duration>,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_token,
            endpoint,
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a JSON payload and return the raw response body.
    ///
    /// Non-2xx statuses become [`Error::Provider`] carrying the provider's
    /// `error` text when the body has one.
    pub async fn post_for_bytes<Req: Serialize>(&self, request: &Req) -> Result<Vec<u8>> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to inference endpoint: {}", e);
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            tracing::error!(
                "Inference API error (status {}): {}",
                status,
                String::from_utf8_lossy(&body)
            );
            let message = serde_json::from_slice::<ProviderErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.message())
                .unwrap_or_else(|| PROVIDER_FAILURE.to_string());
            return Err(Error::Provider(message));
        }

        let body = response.bytes().await?;
        tracing::debug!("Inference endpoint returned {} bytes", body.len());
        Ok(body.to_vec())
    }
}
