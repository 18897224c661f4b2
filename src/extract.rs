use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::categorize::categorize;
use crate::types::Article;

/// Substituted when an item carries no link.
const PLACEHOLDER_LINK: &str = "#";

/// Summaries are cut at this many characters, plus an ellipsis marker.
const SUMMARY_LIMIT: usize = 200;

static ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<item[^>]*>.*?</item>").unwrap());

/// Matches either a CDATA payload or a plain inline payload; the CDATA
/// alternative comes first so it takes precedence when both could match.
fn field_regex(tag: &str) -> Regex {
    Regex::new(&format!(
        r"(?is)<{tag}[^>]*><!\[CDATA\[(.*?)\]\]></{tag}>|<{tag}[^>]*>(.*?)</{tag}>"
    ))
    .unwrap()
}

static TITLE_RE: Lazy<Regex> = Lazy::new(|| field_regex("title"));
static DESC_RE: Lazy<Regex> = Lazy::new(|| field_regex("description"));
static CONTENT_RE: Lazy<Regex> = Lazy::new(|| field_regex("content:encoded"));
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<link[^>]*>(.*?)</link>").unwrap());
static PUBDATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pubDate[^>]*>(.*?)</pubDate>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

fn capture<'a>(re: &Regex, item: &'a str) -> Option<&'a str> {
    re.captures(item)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
}

/// Naive tag removal: delete anything between angle brackets.
pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// Decode named and numeric HTML character entities to literal Unicode.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn clean(text: &str) -> String {
    decode_entities(strip_tags(text).trim())
}

fn truncate_summary(description: &str) -> String {
    if description.chars().count() > SUMMARY_LIMIT {
        let cut: String = description.chars().take(SUMMARY_LIMIT).collect();
        format!("{}...", cut)
    } else {
        description.to_string()
    }
}

/// Feed timestamps are RFC 2822 in the wild; some sources emit RFC 3339.
fn parse_pub_date(raw: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(fallback)
}

fn placeholder_image(source: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(source.as_bytes()).collect();
    format!("/placeholder.svg?height=200&width=300&text={}", encoded)
}

/// Extract normalized articles from raw feed markup.
///
/// Fragments that cannot be parsed cleanly are dropped, never surfaced as
/// errors; a document with no parseable items yields an empty vec. Items
/// whose title is missing or cleans to empty are dropped entirely rather
/// than emitted with a placeholder.
pub fn extract_articles(raw: &str, source: &str, extracted_at: DateTime<Utc>) -> Vec<Article> {
    let mut articles = Vec::new();

    for (idx, item) in ITEM_RE.find_iter(raw).enumerate() {
        let item = item.as_str();

        let title = match capture(&TITLE_RE, item).map(clean) {
            Some(title) if !title.is_empty() => title,
            _ => continue,
        };

        let description = capture(&DESC_RE, item).map(clean).unwrap_or_default();

        // The richer content field keeps inline markup; only entities are
        // decoded, matching what feed consumers render.
        let full_content = capture(&CONTENT_RE, item)
            .map(|content| decode_entities(content.trim()))
            .unwrap_or_else(|| description.clone());

        let url = capture(&LINK_RE, item)
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .unwrap_or(PLACEHOLDER_LINK)
            .to_string();

        let published_at = capture(&PUBDATE_RE, item)
            .map(|raw| parse_pub_date(raw, extracted_at))
            .unwrap_or(extracted_at);

        let category = categorize(&title, &description, source);

        articles.push(Article {
            id: format!("{}-{}-{}", source, extracted_at.timestamp_millis(), idx),
            title,
            summary: truncate_summary(&description),
            full_content,
            url,
            source: source.to_string(),
            category,
            published_at,
            image_url: Some(placeholder_image(source)),
        });
    }

    debug!(source, count = articles.len(), "extracted articles");
    articles
}
