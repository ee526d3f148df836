pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::images::handlers as images;
use crate::preferences::handlers as preferences;
use crate::session::handlers as sessions;
use crate::state::AppState;

/// Room for a full batch of product photos in one multipart upload.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Preferences
        .route(
            "/api/v1/preferences",
            get(preferences::handle_get_preferences).put(preferences::handle_update_preferences),
        )
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route("/api/v1/sessions/:id", get(sessions::handle_get_session))
        .route(
            "/api/v1/sessions/:id/generate",
            post(sessions::handle_generate),
        )
        .route(
            "/api/v1/sessions/:id/seasonal-keywords",
            post(sessions::handle_seasonal_keywords),
        )
        .route(
            "/api/v1/sessions/:id/title",
            post(sessions::handle_select_title),
        )
        .route(
            "/api/v1/sessions/:id/title-display",
            get(sessions::handle_title_display),
        )
        .route(
            "/api/v1/sessions/:id/category",
            post(sessions::handle_select_category),
        )
        .route(
            "/api/v1/sessions/:id/keywords",
            get(sessions::handle_list_keywords),
        )
        .route(
            "/api/v1/sessions/:id/keywords/regenerate",
            post(sessions::handle_regenerate_keyword),
        )
        .route(
            "/api/v1/sessions/:id/keywords/:index",
            put(sessions::handle_save_keyword),
        )
        .route(
            "/api/v1/sessions/:id/highlight",
            post(sessions::handle_highlight),
        )
        // Images
        .route(
            "/api/v1/sessions/:id/images",
            post(images::handle_upload_images),
        )
        .route(
            "/api/v1/sessions/:id/images/urls",
            post(images::handle_add_image_urls),
        )
        .route(
            "/api/v1/sessions/:id/images/:image_id",
            delete(images::handle_delete_image),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
