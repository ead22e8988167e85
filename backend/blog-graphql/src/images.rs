//! On-disk storage for post images
//!
//! Files land in `<root>/images/` and are referred to by the relative path
//! `images/<file>`, which is what clients store in a post's `imageUrl`.

use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const IMAGES_DIR: &str = "images";

/// MIME types accepted for upload
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn accepts(mime: &str) -> bool {
        ACCEPTED_MIME_TYPES
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(mime))
    }

    /// Persist an uploaded image and return its relative path
    ///
    /// Returns `Ok(None)` without touching the disk when the MIME type is not
    /// png/jpg/jpeg.
    pub async fn store(
        &self,
        bytes: &[u8],
        mime: &str,
        original_name: &str,
    ) -> Result<Option<String>, ImageError> {
        if !Self::accepts(mime) {
            debug!(mime, "Rejected image upload with unsupported type");
            return Ok(None);
        }

        // The short id keeps same-name uploads within one millisecond apart
        let file_name = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..8],
            sanitize_file_name(original_name)
        );

        let dir = self.images_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&file_name))
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        let relative = format!("{IMAGES_DIR}/{file_name}");
        info!(path = %relative, size = bytes.len(), "Image stored");
        Ok(Some(relative))
    }

    /// Best-effort removal of a previously stored image
    ///
    /// Only `images/<file>` paths are honoured. Never fails: any other path and
    /// I/O errors are logged and swallowed.
    pub async fn discard(&self, path: &str) {
        let path = path.trim();
        if path.is_empty() {
            return;
        }

        if !is_stored_image(Path::new(path)) {
            warn!(path, "Refusing to discard path outside images directory");
            return;
        }

        match tokio::fs::remove_file(self.root.join(path)).await {
            Ok(()) => info!(path, "Image discarded"),
            Err(e) => warn!(path, error = %e, "Failed to discard image"),
        }
    }
}

/// Last path segment of a client-supplied name
fn sanitize_file_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => "upload".to_string(),
        name => name.replace(char::is_whitespace, "_"),
    }
}

/// Exactly `images/<file>`
fn is_stored_image(path: &Path) -> bool {
    let mut components = path.components();
    matches!(
        (components.next(), components.next(), components.next()),
        (Some(Component::Normal(dir)), Some(Component::Normal(_)), None) if dir == IMAGES_DIR
    )
}
