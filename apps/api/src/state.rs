use std::sync::Arc;

use crate::images::ImageFetcher;
use crate::llm_client::LanguageModel;
use crate::preferences::PreferenceStore;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation backend. Default: `LlmClient` (Gemini); tests use a scripted model.
    pub llm: Arc<dyn LanguageModel>,
    pub image_fetcher: Arc<dyn ImageFetcher>,
    pub sessions: SessionStore,
    pub preferences: PreferenceStore,
}
