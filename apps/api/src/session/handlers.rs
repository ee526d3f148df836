//! Axum route handlers for the Sessions API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::highlight::{highlight, keywords_in_text, split_title, Segment, TitleDisplay};
use crate::listing::models::{filter_by_volume, Keyword, ListingRequest, Volume, VolumeFilter};
use crate::listing::validation::KEYWORD_MAX_CHARS;
use crate::session::workflow::{run_generation, run_regenerate_keyword, run_seasonal_keywords};
use crate::session::{Session, SessionError};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SeasonalKeywordsRequest {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalKeywordsResponse {
    pub seasonal_keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectTitleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectCategoryRequest {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateKeywordRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct KeywordQuery {
    #[serde(default)]
    pub volume: VolumeFilter,
}

/// A keyword with its usage badges.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordUsage {
    pub index: usize,
    pub keyword: String,
    pub volume: Volume,
    pub reason: String,
    pub in_title: bool,
    pub in_description: bool,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub keywords: Vec<KeywordUsage>,
}

#[derive(Debug, Deserialize)]
pub struct HighlightRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct HighlightResponse {
    pub segments: Vec<Segment>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<Session>) {
    let session = state.sessions.create().await;
    tracing::info!("Created session {}", session.id);
    (StatusCode::CREATED, Json(session))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.get(id).await?))
}

/// POST /api/v1/sessions/:id/generate
///
/// Primary listing, then alternative titles, categories and image alt texts.
/// Returns the session as left by this run.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ListingRequest>,
) -> Result<Json<Session>, AppError> {
    let session = run_generation(state.llm.as_ref(), &state.sessions, id, request).await?;
    Ok(Json(session))
}

/// POST /api/v1/sessions/:id/seasonal-keywords
pub async fn handle_seasonal_keywords(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<SeasonalKeywordsRequest>>,
) -> Result<Json<SeasonalKeywordsResponse>, AppError> {
    let description = body.and_then(|Json(b)| b.description);
    let seasonal_keywords =
        run_seasonal_keywords(state.llm.as_ref(), &state.sessions, id, description).await?;
    Ok(Json(SeasonalKeywordsResponse { seasonal_keywords }))
}

/// POST /api/v1/sessions/:id/title
pub async fn handle_select_title(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectTitleRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state
        .sessions
        .update(id, |s| {
            s.select_alternative_title(&request.title)?;
            Ok::<_, SessionError>(s.clone())
        })
        .await?;
    Ok(Json(session))
}

/// POST /api/v1/sessions/:id/category
///
/// Swaps like title selection: the previous category joins the alternatives.
/// Earlier clients only dropped the chosen entry and lost the old category.
pub async fn handle_select_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectCategoryRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state
        .sessions
        .update(id, |s| {
            s.select_alternative_category(&request.category)?;
            Ok::<_, SessionError>(s.clone())
        })
        .await?;
    Ok(Json(session))
}

/// PUT /api/v1/sessions/:id/keywords/:index
pub async fn handle_save_keyword(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(keyword): Json<Keyword>,
) -> Result<Json<Session>, AppError> {
    let text = keyword.keyword.trim();
    if text.is_empty() {
        return Err(AppError::Validation("keyword cannot be empty".to_string()));
    }
    if text.chars().count() > KEYWORD_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "keyword must be at most {KEYWORD_MAX_CHARS} characters"
        )));
    }
    let keyword = Keyword {
        keyword: text.to_string(),
        ..keyword
    };

    let session = state
        .sessions
        .update(id, |s| {
            s.save_keyword(index, keyword)?;
            Ok::<_, SessionError>(s.clone())
        })
        .await?;
    Ok(Json(session))
}

/// POST /api/v1/sessions/:id/keywords/regenerate
///
/// Returns a suggested replacement; save it with PUT .../keywords/:index.
pub async fn handle_regenerate_keyword(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RegenerateKeywordRequest>,
) -> Result<Json<Keyword>, AppError> {
    let keyword =
        run_regenerate_keyword(state.llm.as_ref(), &state.sessions, id, request.index).await?;
    Ok(Json(keyword))
}

/// GET /api/v1/sessions/:id/keywords?volume=High
pub async fn handle_list_keywords(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<KeywordQuery>,
) -> Result<Json<KeywordsResponse>, AppError> {
    let keywords = state
        .sessions
        .read(id, |s| -> Result<Vec<KeywordUsage>, SessionError> {
            let listing = s.require_listing()?;
            let all = listing.keyword_strings();
            let in_title = keywords_in_text(&listing.title, &all);
            let in_description = keywords_in_text(&listing.description, &all);
            Ok(filter_by_volume(&listing.keywords, query.volume)
                .into_iter()
                .map(|(index, k)| KeywordUsage {
                    index,
                    keyword: k.keyword.clone(),
                    volume: k.volume,
                    reason: k.reason.clone(),
                    in_title: in_title.contains(&k.keyword.as_str()),
                    in_description: in_description.contains(&k.keyword.as_str()),
                })
                .collect())
        })
        .await??;
    Ok(Json(KeywordsResponse { keywords }))
}

/// GET /api/v1/sessions/:id/title-display
pub async fn handle_title_display(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TitleDisplay>, AppError> {
    let display = state
        .sessions
        .read(id, |s| -> Result<TitleDisplay, SessionError> {
            let listing = s.require_listing()?;
            let priority = s.request().and_then(ListingRequest::priority_keyword);
            Ok(split_title(
                &listing.title,
                priority,
                &listing.keyword_strings(),
            ))
        })
        .await??;
    Ok(Json(display))
}

/// POST /api/v1/sessions/:id/highlight
pub async fn handle_highlight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<HighlightRequest>,
) -> Result<Json<HighlightResponse>, AppError> {
    let segments = state
        .sessions
        .read(id, |s| {
            let keywords = s.listing().map(|l| l.keyword_strings()).unwrap_or_default();
            highlight(&request.text, &keywords)
        })
        .await?;
    Ok(Json(HighlightResponse { segments }))
}
