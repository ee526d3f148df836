use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::images::ImageError;
use crate::llm_client::LlmError;
use crate::session::SessionError;

/// User-facing text for a failed primary generation. Diagnostics are logged, never returned.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate listing. Please check your API key and try again.";
pub const REGENERATE_FAILED_MESSAGE: &str = "Failed to regenerate keyword. Please try again.";
pub const EMPTY_DESCRIPTION_MESSAGE: &str = "Please enter a product description.";
pub const IMAGE_FETCH_WARNING: &str =
    "Could not fetch some images. Please check the URLs and ensure they are publicly accessible.";

/// Failures of the listing generation features, one variant per containment class.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Primary listing call failed or its output failed validation. Fatal to the attempt.
    #[error("listing generation failed: {0}")]
    Generation(String),

    /// Alternative titles, alternative categories, seasonal keywords. Logged, degrades to empty.
    #[error("{feature} unavailable: {source}")]
    PartialFeature {
        feature: &'static str,
        #[source]
        source: LlmError,
    },

    /// One image's alt text. Degrades to a fallback string for that image only.
    #[error("alt-text generation failed: {0}")]
    AltText(String),

    /// The keyword refine action failed. Shown inline, listing untouched.
    #[error("keyword regeneration failed: {0}")]
    Regenerate(String),

    /// Some URL fetches failed. Successes are kept; this is surfaced as a warning.
    #[error("{failed} of {requested} images could not be fetched")]
    ImageFetch { failed: usize, requested: usize },
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Image limit: {0}")]
    ImageLimit(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error("Preferences error: {0}")]
    Preferences(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) | SessionError::ImageNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            SessionError::Superseded => AppError::Conflict(err.to_string()),
            SessionError::NoListing
            | SessionError::NotAnAlternative(_)
            | SessionError::KeywordIndex { .. } => AppError::Validation(err.to_string()),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::LimitExceeded { .. } => AppError::ImageLimit(err.to_string()),
            ImageError::NoUrls => AppError::Validation(err.to_string()),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ImageLimit(msg) => (StatusCode::BAD_REQUEST, "IMAGE_LIMIT", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "SUPERSEDED", msg.clone()),
            AppError::Listing(ListingError::Regenerate(detail)) => {
                tracing::error!("Keyword regeneration error: {detail}");
                (
                    StatusCode::BAD_GATEWAY,
                    "REGENERATE_ERROR",
                    REGENERATE_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Listing(e) => {
                tracing::error!("Listing error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    GENERATION_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Preferences(msg) => {
                tracing::error!("Preferences error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PREFERENCES_ERROR",
                    "Could not save preferences".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
