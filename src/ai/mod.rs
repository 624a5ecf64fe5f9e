//! Text-to-image inference integration
//!
//! Defines the service seam the generation controller calls, plus the hosted
//! Hugging Face implementation and a scriptable mock.

pub mod huggingface;
pub mod mime;
pub mod mock;

pub use huggingface::HuggingFaceImageClient;
pub use mock::MockImageGenerationClient;

use crate::Result;
use async_trait::async_trait;

/// Converts a prompt into raw image bytes.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}
