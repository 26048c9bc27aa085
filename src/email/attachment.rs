//! Attachment preparation from a file on disk

use crate::domain::{Attachment, DEFAULT_CONTENT_TYPE};
use crate::error::{DeliveryError, Result};
use std::path::Path;

/// Guess a MIME type from the file extension
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Read a file into an [`Attachment`].
///
/// An empty path or one that does not name an existing file is rejected
/// with [`DeliveryError::AttachmentNotFound`]. Zero-length files are fine.
pub async fn prepare(file_path: &str) -> Result<Attachment> {
    if file_path.trim().is_empty() {
        return Err(DeliveryError::AttachmentNotFound(file_path.to_string()));
    }

    let path = Path::new(file_path);
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(DeliveryError::AttachmentNotFound(file_path.to_string())),
    }

    let content = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string());

    Ok(Attachment::new(filename, content, content_type_for(path)))
}
