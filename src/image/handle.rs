use crate::ai::mime::detect_image_mime;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const URL_SCHEME: &str = "blob:promptcanvas/";

/// Opaque reference to in-memory image bytes.
///
/// Cloning is cheap; clones share the same bytes. The same handle serves as
/// display source and download source.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    id: Uuid,
    bytes: Arc<[u8]>,
    mime_type: &'static str,
    created_at: DateTime<Utc>,
}

impl ImageHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    // Handles are never created over empty payloads.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Local URL resolvable through the [`HandleStore`] that issued it.
    pub fn url(&self) -> String {
        format!("{}{}", URL_SCHEME, self.id)
    }

    /// Self-contained `data:` URL usable directly as an image source.
    pub fn data_url(&self) -> String {
        use base64::Engine as _;
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Registry of live image handles.
///
/// Every handle is created here and must be released once superseded so
/// repeated generations do not accumulate image buffers.
#[derive(Debug, Clone, Default)]
pub struct HandleStore {
    live: Arc<Mutex<HashMap<Uuid, ImageHandle>>>,
}

impl HandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `bytes` in a new handle. Empty payloads are not images.
    pub fn register(&self, bytes: Vec<u8>) -> Result<ImageHandle> {
        if bytes.is_empty() {
            return Err(Error::EmptyImage);
        }

        let handle = ImageHandle {
            id: Uuid::new_v4(),
            mime_type: detect_image_mime(&bytes),
            bytes: Arc::from(bytes),
            created_at: Utc::now(),
        };
        self.live().insert(handle.id, handle.clone());
        tracing::debug!(
            "Registered image handle {} ({} bytes, {})",
            handle.id,
            handle.len(),
            handle.mime_type
        );
        Ok(handle)
    }

    /// Look up a live handle by the URL it handed out.
    pub fn resolve(&self, url: &str) -> Option<ImageHandle> {
        let id = Uuid::parse_str(url.strip_prefix(URL_SCHEME)?).ok()?;
        self.live().get(&id).cloned()
    }

    /// Drop the store's reference to a handle. Returns whether it was live.
    pub fn release(&self, id: Uuid) -> bool {
        let released = self.live().remove(&id).is_some();
        if released {
            tracing::debug!("Released image handle {}", id);
        }
        released
    }

    pub fn live_count(&self) -> usize {
        self.live().len()
    }

    fn live(&self) -> MutexGuard<'_, HashMap<Uuid, ImageHandle>> {
        self.live
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
