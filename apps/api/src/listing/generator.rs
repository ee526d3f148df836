//! Listing generation calls. One function per feature; each builds its prompt,
//! goes through the `LanguageModel` seam and validates what comes back.
//!
//! Containment:
//! - primary listing: any failure is fatal (`ListingError::Generation`)
//! - alternative titles / categories / seasonal keywords: logged, empty vec
//! - alt text: `ListingError::AltText`, the caller substitutes a fallback
//! - keyword regeneration: `ListingError::Regenerate`

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::ListingError;
use crate::highlight::eq_ignore_case;
use crate::listing::models::{Keyword, ListingData, ListingRequest, Source};
use crate::listing::prompts::{
    audience_instruction, keyword_schema, region_instruction, string_list_schema,
    ALT_CATEGORIES_PROMPT_TEMPLATE, ALT_TEXT_PROMPT_TEMPLATE, ALT_TITLES_PROMPT_TEMPLATE,
    LISTING_PROMPT_TEMPLATE, REGENERATE_KEYWORD_PROMPT_TEMPLATE,
    SEASONAL_KEYWORDS_PROMPT_TEMPLATE,
};
use crate::listing::validation::{validate_keyword, validate_listing};
use crate::llm_client::prompts::{banned_words_rule, FENCED_JSON_OBJECT, SEO_SPECIALIST, TITLE_RULES};
use crate::llm_client::{call_json, parse_json, LanguageModel, ModelRequest};

pub const MAX_ALTERNATIVES: usize = 3;
pub const ALT_TEXT_MAX_CHARS: usize = 125;
pub const ALT_TEXT_FALLBACK: &str = "Failed to generate alt-text for this image.";
/// Keywords fed to the alt-text prompt.
const ALT_TEXT_KEYWORDS: usize = 2;
pub const SEASONAL_KEYWORD_COUNT: usize = 5;
const SEASONAL_KEYWORD_WORDS: usize = 3;
/// Extra calls allowed when the model answers with a keyword the listing already has.
pub const MAX_REGENERATE_ATTEMPTS: u32 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Primary listing
// ────────────────────────────────────────────────────────────────────────────

pub async fn generate_listing(
    llm: &dyn LanguageModel,
    request: &ListingRequest,
) -> Result<ListingData, ListingError> {
    let prompt = build_listing_prompt(request);

    // Web search and JSON mode cannot be combined upstream, so the payload
    // comes back as fenced text.
    let response = llm
        .generate(ModelRequest::text(prompt).with_web_search())
        .await
        .map_err(|e| ListingError::Generation(format!("model call failed: {e}")))?;

    let payload: Value = parse_json(&response.text)
        .map_err(|e| ListingError::Generation(format!("unparseable payload: {e}")))?;

    let mut listing = validate_listing(&payload)
        .map_err(|v| ListingError::Generation(format!("schema validation failed: {v}")))?;
    listing.sources = dedupe_sources(response.sources);

    info!(
        "Generated listing: {} keywords, {} sources",
        listing.keywords.len(),
        listing.sources.len()
    );
    Ok(listing)
}

pub fn build_listing_prompt(request: &ListingRequest) -> String {
    let (priority_instruction, title_start_rule) = match request.priority_keyword() {
        Some(keyword) => (
            format!(
                "The user has specified a priority keyword: \"{keyword}\". This keyword MUST be included in the title, preferably at the very beginning.\n"
            ),
            format!("The title MUST start with \"{keyword}\"."),
        ),
        None => (String::new(), String::new()),
    };
    let audience = request
        .purchase_intent
        .map(|intent| format!("{}\n", audience_instruction(intent)))
        .unwrap_or_default();
    let region = request
        .geography
        .map(|geo| format!("{}\n", region_instruction(geo)))
        .unwrap_or_default();

    LISTING_PROMPT_TEMPLATE
        .replace("{persona}", SEO_SPECIALIST)
        .replace("{description}", request.description.trim())
        .replace("{priority_instruction}", &priority_instruction)
        .replace("{audience_instruction}", &audience)
        .replace("{region_instruction}", &region)
        .replace("{json_instruction}", FENCED_JSON_OBJECT)
        .replace("{title_rules}", TITLE_RULES)
        .replace("{banned_words}", &banned_words_rule())
        .replace("{title_start_rule}", &title_start_rule)
}

fn dedupe_sources(sources: Vec<Source>) -> Vec<Source> {
    let mut unique: Vec<Source> = Vec::with_capacity(sources.len());
    for source in sources {
        if !unique.iter().any(|s| s.uri == source.uri) {
            unique.push(source);
        }
    }
    unique
}

// ────────────────────────────────────────────────────────────────────────────
// Secondary features
// ────────────────────────────────────────────────────────────────────────────

pub async fn generate_alternative_titles<S: AsRef<str>>(
    llm: &dyn LanguageModel,
    description: &str,
    original_title: &str,
    keywords: &[S],
    priority_keyword: Option<&str>,
) -> Vec<String> {
    let priority_instruction = priority_keyword
        .map(|k| format!("Priority Keyword: \"{k}\". Every title MUST start with it.\n"))
        .unwrap_or_default();
    let prompt = ALT_TITLES_PROMPT_TEMPLATE
        .replace("{persona}", SEO_SPECIALIST)
        .replace("{description}", description)
        .replace("{original_title}", original_title)
        .replace("{keywords}", &join(keywords))
        .replace("{priority_instruction}", &priority_instruction)
        .replace("{title_rules}", TITLE_RULES)
        .replace("{banned_words}", &banned_words_rule());
    let request =
        ModelRequest::text(prompt).with_json_schema(string_list_schema("Alternative titles"));

    string_alternatives(llm, "alternative titles", request, original_title).await
}

pub async fn generate_alternative_categories<S: AsRef<str>>(
    llm: &dyn LanguageModel,
    description: &str,
    original_category: &str,
    keywords: &[S],
) -> Vec<String> {
    let prompt = ALT_CATEGORIES_PROMPT_TEMPLATE
        .replace("{persona}", SEO_SPECIALIST)
        .replace("{description}", description)
        .replace("{original_category}", original_category)
        .replace("{keywords}", &join(keywords));
    let request =
        ModelRequest::text(prompt).with_json_schema(string_list_schema("Alternative categories"));

    string_alternatives(llm, "alternative categories", request, original_category).await
}

/// Runs a list-of-strings call and keeps at most three distinct entries that
/// differ from the original. Failures are logged and degrade to an empty vec.
async fn string_alternatives(
    llm: &dyn LanguageModel,
    feature: &'static str,
    request: ModelRequest,
    original: &str,
) -> Vec<String> {
    let raw: Vec<String> = match call_json(llm, request).await {
        Ok(raw) => raw,
        Err(source) => {
            warn!("{}", ListingError::PartialFeature { feature, source });
            return Vec::new();
        }
    };

    let mut kept: Vec<String> = Vec::with_capacity(MAX_ALTERNATIVES);
    for candidate in raw.iter().map(|s| s.trim()) {
        if kept.len() == MAX_ALTERNATIVES {
            break;
        }
        if candidate.is_empty()
            || eq_ignore_case(candidate, original.trim())
            || kept.iter().any(|k| eq_ignore_case(k, candidate))
        {
            continue;
        }
        kept.push(candidate.to_string());
    }
    kept
}

pub async fn generate_alt_text<S: AsRef<str>>(
    llm: &dyn LanguageModel,
    description: &str,
    keywords: &[S],
    image: Bytes,
    mime_type: &str,
) -> Result<String, ListingError> {
    let main_keywords = join(&keywords[..keywords.len().min(ALT_TEXT_KEYWORDS)]);
    let prompt = ALT_TEXT_PROMPT_TEMPLATE
        .replace("{description}", description)
        .replace("{main_keywords}", &main_keywords)
        .replace("{max_chars}", &ALT_TEXT_MAX_CHARS.to_string());

    let response = llm
        .generate(ModelRequest::text(prompt).with_image(mime_type, image))
        .await
        .map_err(|e| ListingError::AltText(e.to_string()))?;

    clean_alt_text(&response.text)
        .ok_or_else(|| ListingError::AltText("model returned an empty alt text".to_string()))
}

/// Trims, strips quote characters and caps the length. `None` when nothing is left.
pub fn clean_alt_text(raw: &str) -> Option<String> {
    let stripped: String = raw.trim().chars().filter(|c| !matches!(c, '"' | '\'')).collect();
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return None;
    }
    Some(stripped.chars().take(ALT_TEXT_MAX_CHARS).collect())
}

/// Asks for one replacement keyword. The answer must not duplicate any keyword
/// already in the listing, the replaced one included; duplicates are retried.
pub async fn regenerate_keyword(
    llm: &dyn LanguageModel,
    description: &str,
    existing: &[Keyword],
    keyword_to_replace: &str,
) -> Result<Keyword, ListingError> {
    let others: Vec<&str> = existing
        .iter()
        .map(|k| k.keyword.as_str())
        .filter(|k| !eq_ignore_case(k, keyword_to_replace))
        .collect();
    let prompt = REGENERATE_KEYWORD_PROMPT_TEMPLATE
        .replace("{description}", description)
        .replace("{other_keywords}", &others.join(", "))
        .replace("{keyword_to_replace}", keyword_to_replace);

    for attempt in 1..=MAX_REGENERATE_ATTEMPTS {
        let request = ModelRequest::text(prompt.clone()).with_json_schema(keyword_schema());
        let value: Value = call_json(llm, request)
            .await
            .map_err(|e| ListingError::Regenerate(e.to_string()))?;
        let keyword =
            validate_keyword(&value, "keyword").map_err(|v| ListingError::Regenerate(v.to_string()))?;

        let duplicate = eq_ignore_case(&keyword.keyword, keyword_to_replace)
            || existing
                .iter()
                .any(|k| eq_ignore_case(&k.keyword, &keyword.keyword));
        if !duplicate {
            return Ok(keyword);
        }
        warn!(
            "Regenerated keyword {:?} already in listing (attempt {}/{})",
            keyword.keyword, attempt, MAX_REGENERATE_ATTEMPTS
        );
    }

    Err(ListingError::Regenerate(format!(
        "no new keyword after {MAX_REGENERATE_ATTEMPTS} attempts"
    )))
}

pub async fn generate_seasonal_keywords(llm: &dyn LanguageModel, description: &str) -> Vec<String> {
    let prompt = build_seasonal_prompt(description, Utc::now().date_naive());
    let request =
        ModelRequest::text(prompt).with_json_schema(string_list_schema("Seasonal keywords"));

    let raw: Vec<String> = match call_json(llm, request).await {
        Ok(raw) => raw,
        Err(source) => {
            warn!(
                "{}",
                ListingError::PartialFeature {
                    feature: "seasonal keywords",
                    source,
                }
            );
            return Vec::new();
        }
    };

    raw.iter()
        .map(|k| k.trim())
        .filter(|k| k.split_whitespace().count() == SEASONAL_KEYWORD_WORDS)
        .take(SEASONAL_KEYWORD_COUNT)
        .map(str::to_string)
        .collect()
}

/// The seasonal prompt, anchored to `today` as "Month Year".
pub fn build_seasonal_prompt(description: &str, today: NaiveDate) -> String {
    SEASONAL_KEYWORDS_PROMPT_TEMPLATE
        .replace("{current_date}", &today.format("%B %Y").to_string())
        .replace("{description}", description)
}

fn join<S: AsRef<str>>(items: &[S]) -> String {
    items.iter().map(AsRef::<str>::as_ref).collect::<Vec<_>>().join(", ")
}
