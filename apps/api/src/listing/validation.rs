//! Field-by-field validation of model output. Nothing the model returns is
//! trusted until every required field has been checked for presence, type,
//! enum value and cardinality.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::listing::models::{
    Attributes, ChecklistItem, Keyword, ListingData, PricingSuggestion, PricingTier, Volume,
    PRICING_CURRENCY,
};

pub const KEYWORD_COUNT: usize = 13;
pub const MATERIAL_COUNT: usize = 13;
pub const PRICING_COUNT: usize = 3;
pub const CHECKLIST_COUNT: usize = 6;
pub const ATTRIBUTE_RANGE: RangeInclusive<usize> = 5..=8;
pub const COLOR_RANGE: RangeInclusive<usize> = 5..=7;
pub const STORE_SECTION_RANGE: RangeInclusive<usize> = 5..=7;

pub const TITLE_MAX_CHARS: usize = 140;
pub const TITLE_WORD_RANGE: RangeInclusive<usize> = 3..=14;
pub const KEYWORD_MAX_CHARS: usize = 20;
/// Listing areas the checklist is asked to cover.
pub const CHECKLIST_AREAS: [&str; 6] =
    ["Title", "Photos", "Description", "Pricing", "Tags", "Attributes"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaViolation {
    #[error("`{0}` must be a JSON object")]
    NotAnObject(String),

    #[error("missing field `{0}`")]
    Missing(String),

    #[error("`{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("`{field}` has {actual} entries, expected {expected}")]
    Cardinality {
        field: &'static str,
        actual: usize,
        expected: String,
    },

    #[error("`{field}` has unknown value {value:?}")]
    UnknownEnumValue { field: String, value: String },

    #[error("`{field}` must be \"USD\", got {value:?}")]
    Currency { field: String, value: String },

    #[error("pricing tier {0:?} appears more than once")]
    DuplicateTier(PricingTier),
}

/// Validates the primary listing payload and normalizes its ordering:
/// keywords High → Low (stable), pricing Budget → Premium.
pub fn validate_listing(payload: &Value) -> Result<ListingData, SchemaViolation> {
    let obj = as_object(payload, "listing")?;

    let title = string_field(obj, "title")?;
    let description = string_field(obj, "description")?;
    let category = string_field(obj, "category")?;

    let keywords_raw = array_field(obj, "keywords")?;
    check_exact("keywords", keywords_raw.len(), KEYWORD_COUNT)?;
    let mut keywords = keywords_raw
        .iter()
        .enumerate()
        .map(|(i, v)| validate_keyword(v, &format!("keywords[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    keywords.sort_by_key(|k| k.volume);

    let materials = string_array_field(obj, "materials")?;
    check_exact("materials", materials.len(), MATERIAL_COUNT)?;

    let attributes = attributes_field(obj)?;
    check_range("attributes", attributes.len(), &ATTRIBUTE_RANGE)?;

    let colors = string_array_field(obj, "colors")?;
    check_range("colors", colors.len(), &COLOR_RANGE)?;

    let store_sections = string_array_field(obj, "storeSections")?;
    check_range("storeSections", store_sections.len(), &STORE_SECTION_RANGE)?;

    let pricing_raw = array_field(obj, "pricingSuggestions")?;
    check_exact("pricingSuggestions", pricing_raw.len(), PRICING_COUNT)?;
    let mut pricing_suggestions = pricing_raw
        .iter()
        .enumerate()
        .map(|(i, v)| validate_pricing(v, &format!("pricingSuggestions[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    pricing_suggestions.sort_by_key(|p| p.tier);
    if let Some(pair) = pricing_suggestions.windows(2).find(|w| w[0].tier == w[1].tier) {
        return Err(SchemaViolation::DuplicateTier(pair[0].tier));
    }

    let checklist_raw = array_field(obj, "checklist")?;
    check_exact("checklist", checklist_raw.len(), CHECKLIST_COUNT)?;
    let checklist = checklist_raw
        .iter()
        .enumerate()
        .map(|(i, v)| -> Result<ChecklistItem, SchemaViolation> {
            let path = format!("checklist[{i}]");
            let item = as_object(v, &path)?;
            Ok(ChecklistItem {
                element: nested_string(item, &path, "element")?,
                instruction: nested_string(item, &path, "instruction")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let listing = ListingData {
        title,
        description,
        keywords,
        category,
        materials,
        attributes,
        colors,
        store_sections,
        pricing_suggestions,
        checklist,
        sources: Vec::new(),
    };
    flag_soft_limits(&listing);
    Ok(listing)
}

/// Validates one `{keyword, volume, reason}` object.
pub fn validate_keyword(value: &Value, path: &str) -> Result<Keyword, SchemaViolation> {
    let obj = as_object(value, path)?;
    let keyword = nested_string(obj, path, "keyword")?;
    if keyword.trim().is_empty() {
        return Err(SchemaViolation::WrongType {
            field: format!("{path}.keyword"),
            expected: "a non-empty string",
        });
    }
    let volume_raw = nested_string(obj, path, "volume")?;
    let volume = Volume::parse(&volume_raw).ok_or_else(|| SchemaViolation::UnknownEnumValue {
        field: format!("{path}.volume"),
        value: volume_raw.clone(),
    })?;
    let reason = nested_string(obj, path, "reason")?;
    Ok(Keyword {
        keyword: keyword.trim().to_string(),
        volume,
        reason,
    })
}

fn validate_pricing(value: &Value, path: &str) -> Result<PricingSuggestion, SchemaViolation> {
    let obj = as_object(value, path)?;
    let tier_raw = nested_string(obj, path, "tier")?;
    let tier = PricingTier::parse(&tier_raw).ok_or_else(|| SchemaViolation::UnknownEnumValue {
        field: format!("{path}.tier"),
        value: tier_raw.clone(),
    })?;
    let price = obj
        .get("price")
        .ok_or_else(|| SchemaViolation::Missing(format!("{path}.price")))?
        .as_f64()
        .ok_or_else(|| SchemaViolation::WrongType {
            field: format!("{path}.price"),
            expected: "a number",
        })?;
    let currency = nested_string(obj, path, "currency")?;
    if currency != PRICING_CURRENCY {
        return Err(SchemaViolation::Currency {
            field: format!("{path}.currency"),
            value: currency,
        });
    }
    let reason = nested_string(obj, path, "reason")?;
    Ok(PricingSuggestion {
        tier,
        price,
        currency,
        reason,
    })
}

/// Keeps the payload's key order.
fn attributes_field(obj: &Map<String, Value>) -> Result<Attributes, SchemaViolation> {
    let attributes = obj
        .get("attributes")
        .ok_or_else(|| SchemaViolation::Missing("attributes".to_string()))?;
    let map = attributes
        .as_object()
        .ok_or_else(|| SchemaViolation::WrongType {
            field: "attributes".to_string(),
            expected: "an object",
        })?;
    map.iter()
        .map(|(key, value)| {
            value
                .as_str()
                .map(|v| (key.clone(), v.to_string()))
                .ok_or_else(|| SchemaViolation::WrongType {
                    field: format!("attributes.{key}"),
                    expected: "a string",
                })
        })
        .collect()
}

/// Logs constraints the prompt asks for but the listing can live without.
fn flag_soft_limits(listing: &ListingData) {
    let title_chars = listing.title.chars().count();
    let title_words = listing.title.split_whitespace().count();
    if title_chars > TITLE_MAX_CHARS || !TITLE_WORD_RANGE.contains(&title_words) {
        warn!(
            "Generated title is {} chars / {} words (limits {} chars, {:?} words)",
            title_chars, title_words, TITLE_MAX_CHARS, TITLE_WORD_RANGE
        );
    }
    for keyword in listing
        .keywords
        .iter()
        .filter(|k| k.keyword.chars().count() > KEYWORD_MAX_CHARS)
    {
        warn!(
            "Keyword {:?} exceeds the {}-character tag limit",
            keyword.keyword, KEYWORD_MAX_CHARS
        );
    }
    let missing = missing_checklist_areas(&listing.checklist);
    if !missing.is_empty() {
        warn!("Checklist does not cover {}", missing.join(", "));
    }
}

/// Areas from `CHECKLIST_AREAS` no checklist element mentions, ignoring case.
pub fn missing_checklist_areas(checklist: &[ChecklistItem]) -> Vec<&'static str> {
    let elements: Vec<String> = checklist.iter().map(|c| c.element.to_lowercase()).collect();
    CHECKLIST_AREAS
        .into_iter()
        .filter(|area| {
            let area = area.to_lowercase();
            !elements.iter().any(|e| e.contains(&area))
        })
        .collect()
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaViolation> {
    value
        .as_object()
        .ok_or_else(|| SchemaViolation::NotAnObject(path.to_string()))
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Result<String, SchemaViolation> {
    obj.get(key)
        .ok_or_else(|| SchemaViolation::Missing(key.to_string()))?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SchemaViolation::WrongType {
            field: key.to_string(),
            expected: "a string",
        })
}

fn nested_string(
    obj: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<String, SchemaViolation> {
    string_field(obj, key).map_err(|violation| match violation {
        SchemaViolation::Missing(_) => SchemaViolation::Missing(format!("{path}.{key}")),
        SchemaViolation::WrongType { expected, .. } => SchemaViolation::WrongType {
            field: format!("{path}.{key}"),
            expected,
        },
        other => other,
    })
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Vec<Value>, SchemaViolation> {
    obj.get(key)
        .ok_or_else(|| SchemaViolation::Missing(key.to_string()))?
        .as_array()
        .ok_or_else(|| SchemaViolation::WrongType {
            field: key.to_string(),
            expected: "an array",
        })
}

fn string_array_field(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>, SchemaViolation> {
    array_field(obj, key)?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| SchemaViolation::WrongType {
                    field: format!("{key}[{i}]"),
                    expected: "a string",
                })
        })
        .collect()
}

fn check_exact(field: &'static str, actual: usize, expected: usize) -> Result<(), SchemaViolation> {
    if actual == expected {
        Ok(())
    } else {
        Err(SchemaViolation::Cardinality {
            field,
            actual,
            expected: expected.to_string(),
        })
    }
}

fn check_range(
    field: &'static str,
    actual: usize,
    range: &RangeInclusive<usize>,
) -> Result<(), SchemaViolation> {
    if range.contains(&actual) {
        Ok(())
    } else {
        Err(SchemaViolation::Cardinality {
            field,
            actual,
            expected: format!("{}-{}", range.start(), range.end()),
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    /// A payload that satisfies every constraint. Keywords and pricing are
    /// deliberately out of order.
    pub fn valid_listing_json(title: &str) -> Value {
        let volumes = [
            "Medium", "High", "Low", "High", "Medium", "High", "Low", "Medium", "High", "Low",
            "Medium", "High", "Low",
        ];
        let keywords: Vec<Value> = volumes
            .iter()
            .enumerate()
            .map(|(i, volume)| {
                json!({
                    "keyword": format!("keyword {i}"),
                    "volume": volume,
                    "reason": format!("reason {i}"),
                })
            })
            .collect();
        let materials: Vec<String> = (0..13).map(|i| format!("material {i}")).collect();
        json!({
            "title": title,
            "description": "✨ What It Is\n• A handmade oak sign",
            "keywords": keywords,
            "category": "Home & Living > Home Decor > Signs",
            "materials": materials,
            "attributes": {
                "Primary Color": "Natural",
                "Secondary Color": "White",
                "Style": "Farmhouse",
                "Occasion": "Housewarming",
                "Craft Type": "Woodworking"
            },
            "colors": ["Natural Oak", "Matte Black", "Cream", "Walnut", "Sage Green"],
            "storeSections": ["Wood Signs", "Gifts for Her", "Wall Decor", "Custom Orders", "Seasonal"],
            "pricingSuggestions": [
                {"tier": "Premium", "price": 89.0, "currency": "USD", "reason": "Large size"},
                {"tier": "Budget", "price": 29.5, "currency": "USD", "reason": "Small size"},
                {"tier": "Standard", "price": 49, "currency": "USD", "reason": "Most popular"}
            ],
            "checklist": [
                {"element": "Title", "instruction": "Front-load the main phrase."},
                {"element": "Photos", "instruction": "Show the sign on a wall."},
                {"element": "Description", "instruction": "Add dimensions."},
                {"element": "Pricing", "instruction": "Offer free shipping over $35."},
                {"element": "Tags", "instruction": "Use all 13 tags."},
                {"element": "Attributes", "instruction": "Fill in occasion."}
            ]
        })
    }
}
