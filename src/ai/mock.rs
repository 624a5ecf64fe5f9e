use super::ImageGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// A tiny valid 1x1 PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64,
    0x60, 0xF8, 0x5F, 0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47, 0xBA, 0x92, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Clone)]
enum MockResponse {
    Image(Vec<u8>),
    Provider(String),
    Empty,
}

/// Scripted stand-in for the inference provider.
///
/// Responses are consumed in order and cycle once exhausted. With no script
/// every call returns [`TINY_PNG`].
#[derive(Clone)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    gate: Option<Arc<Notify>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.push(MockResponse::Image(response));
        self
    }

    pub fn with_provider_error(self, message: &str) -> Self {
        self.push(MockResponse::Provider(message.to_string()));
        self
    }

    pub fn with_empty_response(self) -> Self {
        self.push(MockResponse::Empty);
        self
    }

    /// Hold every call until the gate is notified, keeping the request in flight.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn get_call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    fn push(&self, response: MockResponse) {
        lock(&self.responses).push(response);
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let response = {
            let mut prompts = lock(&self.prompts);
            prompts.push(prompt.to_string());
            let index = prompts.len() - 1;

            let responses = lock(&self.responses);
            if responses.is_empty() {
                MockResponse::Image(TINY_PNG.to_vec())
            } else {
                responses[index % responses.len()].clone()
            }
        };

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match response {
            MockResponse::Image(bytes) => Ok(bytes),
            MockResponse::Provider(message) => Err(Error::Provider(message)),
            MockResponse::Empty => Err(Error::EmptyImage),
        }
    }
}
