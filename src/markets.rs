use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use serde::Deserialize;
use tracing::info;

use crate::config::{PricesConfig, SentimentConfig};
use crate::error::FetchError;
use crate::fetch::{Fetcher, RetryPolicy};
use crate::types::{PricePoint, SentimentReading};

/// Batch quote URL for the configured asset set.
fn price_query_url(config: &PricesConfig) -> String {
    format!(
        "{}/simple/price?ids={}&vs_currencies={}&include_24hr_change=true",
        config.base_url,
        config.asset_ids.join(","),
        config.vs_currency
    )
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Map the upstream `{asset: {usd: …, usd_24hr_change: …}}` shape to price
/// points. An asset entry missing its quote field is skipped; a missing or
/// null change field defaults to zero.
fn parse_price_payload(body: &str, vs_currency: &str) -> Result<Vec<PricePoint>, FetchError> {
    let data: BTreeMap<String, BTreeMap<String, Option<f64>>> = serde_json::from_str(body)?;
    let change_key = format!("{}_24hr_change", vs_currency);

    let mut points = Vec::with_capacity(data.len());
    for (id, fields) in data {
        let Some(price) = fields.get(vs_currency).copied().flatten() else {
            continue;
        };
        let change_24h = fields.get(&change_key).copied().flatten().unwrap_or(0.0);
        points.push(PricePoint {
            name: capitalize(&id),
            id,
            price,
            change_24h,
        });
    }
    Ok(points)
}

/// Fetch the multi-asset price batch.
///
/// Unlike the news pipeline there is no per-item fault isolation: any fetch
/// failure fails the whole call and propagates to the caller.
pub async fn fetch_prices(
    fetcher: &Fetcher,
    config: &PricesConfig,
    policy: &RetryPolicy,
) -> Result<Vec<PricePoint>, FetchError> {
    let url = price_query_url(config);
    let body = fetcher.fetch_text(&url, HeaderMap::new(), policy).await?;
    let points = parse_price_payload(&body, &config.vs_currency)?;
    info!(count = points.len(), "fetched asset prices");
    Ok(points)
}

#[derive(Debug, Deserialize)]
struct SentimentEnvelope {
    #[serde(default)]
    data: Vec<SentimentEntry>,
}

/// The upstream index service returns every numeric field as a string,
/// in seconds.
#[derive(Debug, Deserialize)]
struct SentimentEntry {
    value: String,
    value_classification: String,
    timestamp: String,
    #[serde(default)]
    time_until_update: Option<String>,
}

fn parse_sentiment_payload(body: &str) -> Result<SentimentReading, FetchError> {
    let envelope: SentimentEnvelope = serde_json::from_str(body)?;
    let latest = envelope
        .data
        .into_iter()
        .next()
        .ok_or(FetchError::EmptyUpstreamData)?;

    Ok(SentimentReading {
        value: latest.value.parse().unwrap_or(0),
        classification: latest.value_classification,
        timestamp: latest.timestamp.parse::<i64>().unwrap_or(0) * 1000,
        next_update_at: latest
            .time_until_update
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(0)
            * 1000,
    })
}

/// Fetch the latest sentiment-index reading.
///
/// An empty result list is a distinct "no data" condition, separate from a
/// transport failure of the fetch itself.
pub async fn fetch_sentiment(
    fetcher: &Fetcher,
    config: &SentimentConfig,
    policy: &RetryPolicy,
) -> Result<SentimentReading, FetchError> {
    let body = fetcher
        .fetch_text(&config.url, HeaderMap::new(), policy)
        .await?;
    let reading = parse_sentiment_payload(&body)?;
    info!(value = reading.value, classification = %reading.classification, "fetched sentiment index");
    Ok(reading)
}
