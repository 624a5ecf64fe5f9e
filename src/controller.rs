//! Generation lifecycle: one prompt, one remote call, one outcome.
//!
//! The controller publishes a [`GenerationState`] snapshot after every
//! transition. Observers read it through [`GenerationController::state`] or a
//! `watch` receiver and never see a half-applied update.
//!
//! The image and error slots are cleared on different schedules: submitting
//! clears the error at once, while the previous image is only replaced when the
//! new call finishes.

use crate::ai::ImageGenerationService;
use crate::error::GENERIC_FAILURE;
use crate::image::{HandleStore, ImageHandle};
use crate::{Error, Result};
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt";
pub const RENDER_FAILURE_MESSAGE: &str = "Failed to load the generated image";

/// Observable controller state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationState {
    pub prompt: String,
    pub busy: bool,
    pub image: Option<ImageHandle>,
    pub error: Option<String>,
}

impl GenerationState {
    /// The image a presentation layer should show. Hidden while a new request
    /// is in flight even though the slot still holds the previous handle.
    pub fn visible_image(&self) -> Option<&ImageHandle> {
        if self.busy {
            None
        } else {
            self.image.as_ref()
        }
    }
}

/// Result of one [`GenerationController::submit`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Generated(ImageHandle),
    /// The prompt failed validation; nothing was sent.
    Rejected,
    Failed(String),
}

pub struct GenerationController {
    service: Box<dyn ImageGenerationService>,
    handles: HandleStore,
    state: watch::Sender<GenerationState>,
}

impl GenerationController {
    pub fn new(service: Box<dyn ImageGenerationService>) -> Self {
        Self::with_handle_store(service, HandleStore::new())
    }

    pub fn with_handle_store(
        service: Box<dyn ImageGenerationService>,
        handles: HandleStore,
    ) -> Self {
        let (state, _) = watch::channel(GenerationState::default());
        Self {
            service,
            handles,
            state,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> GenerationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    pub fn handles(&self) -> &HandleStore {
        &self.handles
    }

    pub fn set_prompt(&self, prompt: &str) {
        self.state.send_modify(|state| state.prompt = prompt.to_string());
    }

    /// Submit whatever prompt is currently set.
    pub async fn submit_current(&self) -> SubmitOutcome {
        let prompt = self.state.borrow().prompt.clone();
        self.submit(&prompt).await
    }

    /// Run one generation for `prompt`.
    ///
    /// Callers must not submit again while `busy` is set; overlapping calls are
    /// not coordinated here.
    pub async fn submit(&self, prompt: &str) -> SubmitOutcome {
        if prompt.trim().is_empty() {
            info!("Rejected empty prompt");
            self.state.send_modify(|state| {
                state.prompt = prompt.to_string();
                state.error = Some(EMPTY_PROMPT_MESSAGE.to_string());
            });
            return SubmitOutcome::Rejected;
        }

        self.state.send_modify(|state| {
            state.prompt = prompt.to_string();
            state.busy = true;
            state.error = None;
        });
        info!("Generating image ({} char prompt)", prompt.chars().count());

        match self.request_image(prompt).await {
            Ok(handle) => {
                info!(
                    "Generated image {} ({} bytes, {})",
                    handle.id(),
                    handle.len(),
                    handle.mime_type()
                );
                let mut superseded = None;
                self.state.send_modify(|state| {
                    superseded = state.image.replace(handle.clone());
                    state.busy = false;
                });
                self.release(superseded);
                SubmitOutcome::Generated(handle)
            }
            Err(e) => {
                let message = e.user_message();
                warn!("Image generation failed: {}", message);
                self.fail(message.clone(), |state| state.busy = false);
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Inbound event from the presentation layer: the image identified by
    /// `handle_id` could not be decoded or displayed.
    ///
    /// Reports about a handle that is no longer current are ignored.
    pub fn image_failed_to_load(&self, handle_id: Uuid) {
        let current = self.state.borrow().image.as_ref().map(ImageHandle::id);
        if current != Some(handle_id) {
            warn!(
                "Ignoring load failure for stale image handle {} (current: {:?})",
                handle_id, current
            );
            return;
        }

        warn!("Generated image {} failed to load", handle_id);
        self.fail(RENDER_FAILURE_MESSAGE.to_string(), |_| {});
    }

    async fn request_image(&self, prompt: &str) -> Result<ImageHandle> {
        let bytes = self.service.generate_image(prompt).await?;
        self.handles.register(bytes)
    }

    /// Enter the failure state: set the error, drop the image, then apply
    /// `finish` within the same update.
    fn fail<F>(&self, message: String, finish: F)
    where
        F: FnOnce(&mut GenerationState),
    {
        let message = if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        };

        let mut cleared = None;
        self.state.send_modify(|state| {
            state.error = Some(message);
            cleared = state.image.take();
            finish(state);
        });
        self.release(cleared);
    }

    fn release(&self, handle: Option<ImageHandle>) {
        if let Some(handle) = handle {
            self.handles.release(handle.id());
        }
    }
}

impl Drop for GenerationController {
    fn drop(&mut self) {
        let current = self.state.borrow().image.as_ref().map(ImageHandle::id);
        if let Some(id) = current {
            self.handles.release(id);
        }
    }
}

/// Convenience for callers that want the outcome as a `Result`.
impl SubmitOutcome {
    pub fn into_result(self) -> Result<ImageHandle> {
        match self {
            SubmitOutcome::Generated(handle) => Ok(handle),
            SubmitOutcome::Rejected => Err(Error::Validation(EMPTY_PROMPT_MESSAGE.to_string())),
            SubmitOutcome::Failed(message) => Err(Error::Provider(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::TINY_PNG;
    use crate::ai::MockImageGenerationClient;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn controller_with(mock: &MockImageGenerationClient) -> GenerationController {
        GenerationController::new(Box::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_whitespace_prompt_is_rejected_without_request() {
        let mock = MockImageGenerationClient::new();
        let controller = controller_with(&mock);

        for prompt in ["", "   ", "\t\n  "] {
            let outcome = controller.submit(prompt).await;
            assert_eq!(outcome, SubmitOutcome::Rejected);

            let state = controller.state();
            assert!(!state.busy);
            assert_eq!(state.error.as_deref(), Some("Please enter a prompt"));
        }

        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_prompt_keeps_previous_image() {
        let mock = MockImageGenerationClient::new();
        let controller = controller_with(&mock);

        let handle = controller.submit("a lighthouse").await.into_result().unwrap();
        controller.submit("  ").await;

        let state = controller.state();
        assert_eq!(state.image, Some(handle));
        assert_eq!(state.error.as_deref(), Some(EMPTY_PROMPT_MESSAGE));
    }

    #[tokio::test]
    async fn test_success_stores_exact_bytes_and_clears_error() {
        let payload = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let mock = MockImageGenerationClient::new().with_image_response(payload.clone());
        let controller = controller_with(&mock);

        controller.submit("").await;
        assert!(controller.state().error.is_some());

        let outcome = controller.submit("a quiet harbor").await;
        let handle = outcome.into_result().unwrap();

        let state = controller.state();
        assert!(!state.busy);
        assert_eq!(state.error, None);
        assert_eq!(state.image.as_ref().unwrap().bytes(), payload.as_slice());
        assert_eq!(handle.mime_type(), "image/jpeg");
        assert_eq!(mock.get_prompts(), vec!["a quiet harbor"]);
    }

    #[tokio::test]
    async fn test_empty_payload_is_failure() {
        let mock = MockImageGenerationClient::new().with_image_response(Vec::new());
        let controller = controller_with(&mock);

        let outcome = controller.submit("anything").await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed("Generated image is empty".to_string())
        );

        let state = controller.state();
        assert!(!state.busy);
        assert_eq!(state.image, None);
        assert_eq!(controller.handles().live_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_clears_previous_image() {
        let mock = MockImageGenerationClient::new()
            .with_image_response(TINY_PNG.to_vec())
            .with_provider_error("model busy");
        let controller = controller_with(&mock);

        controller.submit("first").await;
        assert!(controller.state().image.is_some());

        controller.submit("second").await;

        let state = controller.state();
        assert_eq!(
            state,
            GenerationState {
                prompt: "second".to_string(),
                busy: false,
                image: None,
                error: Some("model busy".to_string()),
            }
        );
        assert_eq!(controller.handles().live_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_provider_message_uses_generic_text() {
        let mock = MockImageGenerationClient::new().with_provider_error("");
        let controller = controller_with(&mock);

        controller.submit("x").await;
        assert_eq!(controller.state().error.as_deref(), Some(GENERIC_FAILURE));
    }

    #[tokio::test]
    async fn test_busy_while_in_flight_and_previous_image_hidden() {
        let gate = Arc::new(Notify::new());
        let mock = MockImageGenerationClient::new()
            .with_image_response(vec![1, 1, 1])
            .with_image_response(vec![2, 2, 2])
            .with_gate(gate.clone());
        let controller = Arc::new(controller_with(&mock));

        gate.notify_one();
        let first = controller.submit("first").await.into_result().unwrap();

        let mut rx = controller.subscribe();
        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit("second").await }
        });

        let during = rx.wait_for(|state| state.busy).await.unwrap().clone();
        assert_eq!(during.error, None);
        assert_eq!(during.image.as_ref(), Some(&first));
        assert_eq!(during.visible_image(), None);

        gate.notify_one();
        let second = task.await.unwrap().into_result().unwrap();

        let after = controller.state();
        assert!(!after.busy);
        assert_eq!(after.image.as_ref().unwrap().bytes(), &[2, 2, 2]);
        assert_eq!(after.visible_image(), Some(&second));
        assert!(controller.handles().resolve(&first.url()).is_none());
    }

    #[tokio::test]
    async fn test_repeated_generations_keep_one_live_handle() {
        let mock = MockImageGenerationClient::new();
        let controller = controller_with(&mock);

        let mut urls = Vec::new();
        for i in 0..5 {
            let handle = controller
                .submit(&format!("prompt {}", i))
                .await
                .into_result()
                .unwrap();
            urls.push(handle.url());
        }

        assert_eq!(controller.handles().live_count(), 1);
        assert!(controller.handles().resolve(&urls[4]).is_some());
        assert!(controller.handles().resolve(&urls[0]).is_none());
    }

    #[tokio::test]
    async fn test_render_failure_clears_image() {
        let mock = MockImageGenerationClient::new();
        let controller = controller_with(&mock);

        let handle = controller.submit("a red fox").await.into_result().unwrap();
        controller.image_failed_to_load(handle.id());

        let state = controller.state();
        assert!(!state.busy);
        assert_eq!(state.image, None);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to load the generated image")
        );
        assert_eq!(controller.handles().live_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_render_failure_is_ignored() {
        let mock = MockImageGenerationClient::new();
        let controller = controller_with(&mock);

        let old = controller.submit("one").await.into_result().unwrap();
        let current = controller.submit("two").await.into_result().unwrap();

        controller.image_failed_to_load(old.id());

        let state = controller.state();
        assert_eq!(state.image, Some(current));
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_submit_current_uses_set_prompt() {
        let mock = MockImageGenerationClient::new();
        let controller = controller_with(&mock);

        controller.set_prompt("A serene landscape");
        assert_eq!(controller.state().prompt, "A serene landscape");

        let outcome = controller.submit_current().await;
        assert!(matches!(outcome, SubmitOutcome::Generated(_)));
        assert_eq!(mock.get_prompts(), vec!["A serene landscape"]);
    }

    #[tokio::test]
    async fn test_drop_releases_current_handle() {
        let store = HandleStore::new();
        let controller = GenerationController::with_handle_store(
            Box::new(MockImageGenerationClient::new()),
            store.clone(),
        );

        controller.submit("x").await;
        assert_eq!(store.live_count(), 1);

        drop(controller);
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_outcome_into_result() {
        tokio_test::assert_err!(SubmitOutcome::Rejected.into_result());
        tokio_test::assert_err!(SubmitOutcome::Failed("nope".to_string()).into_result());
    }
}
