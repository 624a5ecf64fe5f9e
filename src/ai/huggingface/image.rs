use super::client::HuggingFaceHttpClient;
use super::types::InferenceRequest;
use crate::ai::ImageGenerationService;
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct HuggingFaceImageClient {
    http: HuggingFaceHttpClient,
}

impl HuggingFaceImageClient {
    pub fn new(api_token: String, endpoint: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(api_token, endpoint, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_token: String,
        endpoint: String,
        timeout: Option<Duration>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: HuggingFaceHttpClient::new_with_client(api_token, endpoint, timeout, client),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api_token.clone(),
            config.endpoint.clone(),
            config.request_timeout,
        )
    }
}

#[async_trait]
impl ImageGenerationService for HuggingFaceImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        tracing::debug!(
            "Requesting image from {} ({} char prompt)",
            self.http.endpoint(),
            prompt.chars().count()
        );

        let request = InferenceRequest::new(prompt);
        let image_bytes = self.http.post_for_bytes(&request).await?;

        if image_bytes.is_empty() {
            tracing::warn!("Inference endpoint returned success with an empty body");
            return Err(Error::EmptyImage);
        }

        Ok(image_bytes)
    }
}
