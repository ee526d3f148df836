//! Product images attached to a session: records, the per-session cap and
//! ingestion from uploads or public URLs.

pub mod fetch;
pub mod handlers;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

pub use fetch::{fetch_all, parse_url_list, HttpImageFetcher, ImageFetcher};

/// Most images a session may hold.
pub const MAX_IMAGES: usize = 20;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("You can upload a maximum of {limit} images ({current} attached, {requested} requested)")]
    LimitExceeded {
        limit: usize,
        current: usize,
        requested: usize,
    },

    #[error("Please enter at least one URL.")]
    NoUrls,

    #[error("fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("{0} is not an image")]
    NotAnImage(String),

    #[error("image client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// An attached image. Bytes stay server-side; only metadata is serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub content: Bytes,
}

/// An image before it has been given an id.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub file_name: String,
    pub mime_type: String,
    pub content: Bytes,
}

impl NewImage {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Fails with `LimitExceeded` when `requested` more images would push a
/// collection of `current` over the cap.
pub fn check_capacity(current: usize, requested: usize) -> Result<(), ImageError> {
    if current + requested > MAX_IMAGES {
        return Err(ImageError::LimitExceeded {
            limit: MAX_IMAGES,
            current,
            requested,
        });
    }
    Ok(())
}

/// Ordered image list with the cap enforced on every insertion.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ImageCollection {
    images: Vec<ImageRecord>,
}

impl ImageCollection {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn as_slice(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.images.iter().any(|image| image.id == id)
    }

    /// Adds a batch all-or-nothing. Every entry counts toward the cap, but
    /// entries without an `image/*` MIME type are then skipped. Returns the
    /// records that were added.
    pub fn add_batch(&mut self, batch: Vec<NewImage>) -> Result<Vec<ImageRecord>, ImageError> {
        check_capacity(self.images.len(), batch.len())?;

        let (images, skipped): (Vec<NewImage>, Vec<NewImage>) =
            batch.into_iter().partition(NewImage::is_image);
        for image in &skipped {
            warn!(
                "Skipping {} with non-image type {}",
                image.file_name, image.mime_type
            );
        }

        let added: Vec<ImageRecord> = images
            .into_iter()
            .map(|image| ImageRecord {
                id: Uuid::new_v4(),
                file_name: image.file_name,
                mime_type: image.mime_type,
                content: image.content,
            })
            .collect();
        self.images.extend(added.iter().cloned());
        Ok(added)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<ImageRecord> {
        let index = self.images.iter().position(|image| image.id == id)?;
        Some(self.images.remove(index))
    }
}

#[cfg(test)]
pub(crate) fn sample_image(name: &str) -> NewImage {
    NewImage {
        file_name: name.to_string(),
        mime_type: "image/jpeg".to_string(),
        content: Bytes::from_static(b"\xff\xd8\xff"),
    }
}
