//! Axum route handlers for session images.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{AppError, IMAGE_FETCH_WARNING};
use crate::images::{check_capacity, ImageRecord, NewImage};
use crate::session::workflow::{add_images_from_urls, add_uploaded_images};
use crate::state::AppState;

const DEFAULT_UPLOAD_NAME: &str = "upload";

#[derive(Debug, Deserialize)]
pub struct ImageUrlsRequest {
    /// One URL per line.
    pub urls: String,
}

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub added: Vec<ImageRecord>,
    pub images: Vec<ImageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

async fn images_response(
    state: &AppState,
    id: Uuid,
    added: Vec<ImageRecord>,
    warning: Option<String>,
) -> Result<Json<ImagesResponse>, AppError> {
    let images = state
        .sessions
        .read(id, |s| s.images().as_slice().to_vec())
        .await?;
    Ok(Json(ImagesResponse {
        added,
        images,
        warning,
    }))
}

/// POST /api/v1/sessions/:id/images (multipart, one `file` part per image)
///
/// The cap is checked as each `file` part arrives, before its bytes are read.
pub async fn handle_upload_images(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ImagesResponse>, AppError> {
    let current = state.sessions.read(id, |s| s.images().len()).await?;
    let mut batch = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            warn!("Ignoring unknown multipart field: {name}");
            continue;
        }
        check_capacity(current, batch.len() + 1)?;
        let file_name = field.file_name().unwrap_or(DEFAULT_UPLOAD_NAME).to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read {file_name}: {e}")))?;
        batch.push(NewImage {
            file_name,
            mime_type,
            content,
        });
    }

    info!("Session {id}: received {} files", batch.len());
    let added = add_uploaded_images(&state.sessions, id, batch).await?;
    images_response(&state, id, added, None).await
}

/// POST /api/v1/sessions/:id/images/urls
///
/// Fetch failures do not fail the request; the response carries a warning.
pub async fn handle_add_image_urls(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ImageUrlsRequest>,
) -> Result<Json<ImagesResponse>, AppError> {
    let ingest =
        add_images_from_urls(state.image_fetcher.as_ref(), &state.sessions, id, &request.urls)
            .await?;
    let warning = ingest.failure.map(|_| IMAGE_FETCH_WARNING.to_string());
    images_response(&state, id, ingest.added, warning).await
}

/// DELETE /api/v1/sessions/:id/images/:image_id
///
/// Removes the image and its alt text.
pub async fn handle_delete_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ImagesResponse>, AppError> {
    state
        .sessions
        .update(id, |s| s.remove_image(image_id).map(|_| ()))
        .await?;
    images_response(&state, id, Vec::new(), None).await
}
