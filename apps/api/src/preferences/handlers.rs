use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::preferences::{Language, Preferences, PreferencesUpdate};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub dark_mode: bool,
    pub language: Language,
    pub direction: &'static str,
}

impl From<Preferences> for PreferencesResponse {
    fn from(prefs: Preferences) -> Self {
        Self {
            dark_mode: prefs.dark_mode,
            language: prefs.language,
            direction: prefs.language.direction(),
        }
    }
}

/// GET /api/v1/preferences
pub async fn handle_get_preferences(State(state): State<AppState>) -> Json<PreferencesResponse> {
    Json(state.preferences.get().await.into())
}

/// PUT /api/v1/preferences
pub async fn handle_update_preferences(
    State(state): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> Result<Json<PreferencesResponse>, AppError> {
    let prefs = state
        .preferences
        .update(update)
        .await
        .map_err(|e| AppError::Preferences(e.to_string()))?;
    Ok(Json(prefs.into()))
}
