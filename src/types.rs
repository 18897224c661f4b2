use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One news story extracted from an upstream feed.
///
/// Articles are derived per request and never persisted. The `id` is only
/// unique within a single response; callers must not treat it as stable
/// across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    /// At most 200 characters, with a trailing `...` when truncated.
    pub summary: String,
    pub full_content: String,
    pub url: String,
    /// Display name of the originating feed.
    pub source: String,
    pub category: Category,
    pub published_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Topic label assigned to an article.
///
/// `Stocks` is a legacy value that may appear in already-categorized data;
/// the categorizer never assigns it and it is not a selectable filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bitcoin,
    Defi,
    Macro,
    Altcoins,
    Stocks,
}

/// Category selector accepted by the feed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Bitcoin,
    Defi,
    Macro,
    Altcoins,
}

impl CategoryFilter {
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Bitcoin => category == Category::Bitcoin,
            CategoryFilter::Defi => category == Category::Defi,
            CategoryFilter::Macro => category == Category::Macro,
            CategoryFilter::Altcoins => category == Category::Altcoins,
        }
    }
}

/// One page of the merged, sorted, filtered feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<Article>,
    pub has_more: bool,
    /// Post-filter article count, not a global count.
    pub total: usize,
}

/// A single asset quote with its 24h change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub id: String,
    /// Asset id with the first character uppercased.
    pub name: String,
    pub price: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
}

/// Latest fear/greed index reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentReading {
    /// Index value in 0..=100.
    pub value: i64,
    /// Textual label supplied by the upstream service.
    pub classification: String,
    /// Milliseconds since epoch.
    pub timestamp: i64,
    /// Advisory, milliseconds.
    pub next_update_at: i64,
}
