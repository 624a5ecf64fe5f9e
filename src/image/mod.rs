//! Generated image handling
//!
//! Wraps generated bytes in locally resolvable handles, decodes them for
//! display, and saves them for the download affordance.

pub mod download;
pub mod handle;
pub mod mock;
pub mod renderer;

pub use download::save_download;
pub use handle::{HandleStore, ImageHandle};
pub use mock::MockImageRenderer;
pub use renderer::ImageRenderer;

use crate::Result;
use async_trait::async_trait;

/// Dimensions of a successfully decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
}

/// Presentation-side decoding of an image handle.
#[async_trait]
pub trait ImageRenderService: Send + Sync {
    async fn render(&self, handle: &ImageHandle) -> Result<RenderedImage>;
}
