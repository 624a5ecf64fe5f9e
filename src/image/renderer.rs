use super::{ImageHandle, ImageRenderService, RenderedImage};
use crate::{Error, Result};
use async_trait::async_trait;

/// Decodes handles with the `image` crate, off the async executor.
#[derive(Debug, Default)]
pub struct ImageRenderer;

impl ImageRenderer {
    pub fn new() -> Self {
        Self
    }

    fn decode_sync(bytes: &[u8]) -> Result<RenderedImage> {
        let img = image::load_from_memory(bytes)?;
        Ok(RenderedImage {
            width: img.width(),
            height: img.height(),
        })
    }
}

#[async_trait]
impl ImageRenderService for ImageRenderer {
    async fn render(&self, handle: &ImageHandle) -> Result<RenderedImage> {
        let bytes = handle.bytes().to_vec();
        let rendered = tokio::task::spawn_blocking(move || Self::decode_sync(&bytes))
            .await
            .map_err(|e| Error::Invariant(format!("Image decoding task join error: {}", e)))?
            .map_err(|e| {
                tracing::warn!("Failed to decode image {}: {}", handle.id(), e);
                e
            })?;

        tracing::debug!(
            "Decoded image {} ({}x{})",
            handle.id(),
            rendered.width,
            rendered.height
        );
        Ok(rendered)
    }
}
