use super::ImageHandle;
use crate::models::DOWNLOAD_FILENAME;
use crate::Result;
use std::path::{Path, PathBuf};

/// Save the handle's bytes as `<dir>/generated-image.png`, overwriting any
/// earlier download.
pub async fn save_download(handle: &ImageHandle, dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(DOWNLOAD_FILENAME);
    tokio::fs::write(&path, handle.bytes()).await?;
    tracing::info!(
        "Saved image {} ({} bytes) to {}",
        handle.id(),
        handle.len(),
        path.display()
    );
    Ok(path)
}
