//! Generation orchestration: one primary call, then every secondary feature
//! concurrently. Secondary results are settled together; no single failure
//! aborts the others.

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ListingError;
use crate::images::ImageRecord;
use crate::listing::generator::{
    generate_alt_text, generate_alternative_categories, generate_alternative_titles,
    generate_listing, ALT_TEXT_FALLBACK,
};
use crate::listing::models::{ListingData, ListingRequest};
use crate::llm_client::LanguageModel;

/// Alt text for one image. `failed` marks the fallback string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AltText {
    pub image_id: Uuid,
    pub text: String,
    pub failed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryResults {
    pub alternative_titles: Vec<String>,
    pub alternative_categories: Vec<String>,
    pub alt_texts: Vec<AltText>,
}

/// Phase 1. Fatal on failure; nothing secondary runs without a listing.
pub async fn generate_primary(
    llm: &dyn LanguageModel,
    request: &ListingRequest,
) -> Result<ListingData, ListingError> {
    generate_listing(llm, request).await
}

/// Phase 2. Alternative titles, alternative categories and one alt-text call
/// per image, all in flight at once.
pub async fn generate_secondary(
    llm: &dyn LanguageModel,
    request: &ListingRequest,
    listing: &ListingData,
    images: &[ImageRecord],
) -> SecondaryResults {
    let keywords = listing.keyword_strings();
    let description = request.description.trim();

    let titles = generate_alternative_titles(
        llm,
        description,
        &listing.title,
        &keywords,
        request.priority_keyword(),
    );
    let categories =
        generate_alternative_categories(llm, description, &listing.category, &keywords);
    let alt_texts = join_all(images.iter().map(|image| {
        let keywords = &keywords;
        async move {
            match generate_alt_text(
                llm,
                description,
                keywords,
                image.content.clone(),
                &image.mime_type,
            )
            .await
            {
                Ok(text) => AltText {
                    image_id: image.id,
                    text,
                    failed: false,
                },
                Err(e) => {
                    warn!("Alt text for {} ({}): {e}", image.file_name, image.id);
                    AltText {
                        image_id: image.id,
                        text: ALT_TEXT_FALLBACK.to_string(),
                        failed: true,
                    }
                }
            }
        }
    }));

    let (alternative_titles, alternative_categories, alt_texts) =
        tokio::join!(titles, categories, alt_texts);

    info!(
        "Secondary results: {} titles, {} categories, {}/{} alt texts",
        alternative_titles.len(),
        alternative_categories.len(),
        alt_texts.iter().filter(|a| !a.failed).count(),
        alt_texts.len()
    );

    SecondaryResults {
        alternative_titles,
        alternative_categories,
        alt_texts,
    }
}
