use super::{ImageHandle, ImageRenderService, RenderedImage};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub struct MockImageRenderer {
    render_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockImageRenderer {
    pub fn new() -> Self {
        Self {
            render_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *lock(&self.should_fail) = should_fail;
        self
    }

    pub fn get_render_count(&self) -> usize {
        *lock(&self.render_count)
    }
}

impl Default for MockImageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ImageRenderService for MockImageRenderer {
    async fn render(&self, handle: &ImageHandle) -> Result<RenderedImage> {
        *lock(&self.render_count) += 1;

        if *lock(&self.should_fail) {
            return Err(Error::Render(format!("Mock decode failure for {}", handle.id())));
        }

        Ok(RenderedImage {
            width: 512,
            height: 512,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::HandleStore;

    #[tokio::test]
    async fn test_mock_renderer_counts_calls() {
        let renderer = MockImageRenderer::new();
        let handle = HandleStore::new().register(vec![1, 2, 3]).unwrap();

        let rendered = renderer.render(&handle).await.unwrap();
        assert_eq!(rendered.width, 512);
        assert_eq!(renderer.get_render_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_renderer_with_failure() {
        let renderer = MockImageRenderer::new().with_failure(true);
        let handle = HandleStore::new().register(vec![1, 2, 3]).unwrap();

        assert!(renderer.render(&handle).await.is_err());
        assert_eq!(renderer.get_render_count(), 1);
    }
}
