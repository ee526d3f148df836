use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

pub use crate::llm_client::Source;

/// Categorical estimate of search popularity. Ordered High < Medium < Low so an
/// ascending sort puts the highest volume first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Volume {
    High,
    Medium,
    Low,
}

impl Volume {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Volume::High),
            "medium" => Some(Volume::Medium),
            "low" => Some(Volume::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub keyword: String,
    pub volume: Volume,
    pub reason: String,
}

/// Volume filter for the keyword card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum VolumeFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl VolumeFilter {
    pub fn matches(self, volume: Volume) -> bool {
        match self {
            VolumeFilter::All => true,
            VolumeFilter::High => volume == Volume::High,
            VolumeFilter::Medium => volume == Volume::Medium,
            VolumeFilter::Low => volume == Volume::Low,
        }
    }
}

/// Keeps the keywords whose volume passes the filter, in listing order,
/// paired with their index in the listing.
pub fn filter_by_volume(keywords: &[Keyword], filter: VolumeFilter) -> Vec<(usize, &Keyword)> {
    keywords
        .iter()
        .enumerate()
        .filter(|(_, k)| filter.matches(k.volume))
        .collect()
}

/// Price-positioning band. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PricingTier {
    Budget,
    Standard,
    Premium,
}

impl PricingTier {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "budget" => Some(PricingTier::Budget),
            "standard" => Some(PricingTier::Standard),
            "premium" => Some(PricingTier::Premium),
            _ => None,
        }
    }
}

pub const PRICING_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSuggestion {
    pub tier: PricingTier,
    pub price: f64,
    pub currency: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub element: String,
    pub instruction: String,
}

/// Product attributes in the order the model listed them. Serializes as a
/// JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// The full generated listing. Created wholesale by one generation call, then
/// edited in place by user actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingData {
    pub title: String,
    pub description: String,
    pub keywords: Vec<Keyword>,
    pub category: String,
    pub materials: Vec<String>,
    pub attributes: Attributes,
    pub colors: Vec<String>,
    pub store_sections: Vec<String>,
    pub pricing_suggestions: Vec<PricingSuggestion>,
    pub checklist: Vec<ChecklistItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl ListingData {
    pub fn keyword_strings(&self) -> Vec<&str> {
        self.keywords.iter().map(|k| k.keyword.as_str()).collect()
    }
}

/// Target audience the copy is tailored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseIntent {
    Professionals,
    Beginners,
    Handicrafts,
    Children,
    HomeDecor,
    Commercial,
}

/// Primary market region; drives spelling and trend choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geography {
    Us,
    Europe,
    SouthAmerica,
    Asia,
    NorthAfrica,
}

/// User input for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub description: String,
    #[serde(default)]
    pub priority_keyword: Option<String>,
    #[serde(default)]
    pub purchase_intent: Option<PurchaseIntent>,
    #[serde(default)]
    pub geography: Option<Geography>,
}

impl ListingRequest {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            priority_keyword: None,
            purchase_intent: None,
            geography: None,
        }
    }

    /// The priority keyword, if the user gave a non-blank one.
    pub fn priority_keyword(&self) -> Option<&str> {
        self.priority_keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
