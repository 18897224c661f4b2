use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::FetchError;
use crate::fetch::{Fetcher, RetryPolicy};
use crate::markets;
use crate::pipeline;
use crate::types::{CategoryFilter, FeedPage, PricePoint, SentimentReading};

const MAX_PAGE_LIMIT: u32 = 100;

pub struct AppState {
    pub fetcher: Fetcher,
    pub policy: RetryPolicy,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            fetcher: Fetcher::new(&config.fetch),
            policy: RetryPolicy::from_config(&config.fetch),
            config,
        }
    }
}

/// Upstream failure surfaced as an HTTP error payload, so callers can tell
/// "empty" apart from "broken".
pub struct ApiError(FetchError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        ApiError(err)
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Aggregated, paginated news feed.
///
/// Always answers 200: a failing source degrades to an empty contribution
/// inside the pipeline, and an unknown category is rejected before this
/// handler runs by query deserialization.
pub async fn feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> Json<FeedPage> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, MAX_PAGE_LIMIT);

    let feed = pipeline::get_feed(
        &state.fetcher,
        &state.config.sources,
        &state.policy,
        page,
        query.category,
        limit,
    )
    .await;

    Json(feed)
}

/// Batch asset prices. Propagates upstream failures as error payloads.
pub async fn prices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PricePoint>>, ApiError> {
    let points = markets::fetch_prices(&state.fetcher, &state.config.prices, &state.policy).await?;
    Ok(Json(points))
}

/// Latest sentiment-index reading; 404 when the upstream has no entries.
pub async fn sentiment(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SentimentReading>, ApiError> {
    let reading =
        markets::fetch_sentiment(&state.fetcher, &state.config.sentiment, &state.policy).await?;
    Ok(Json(reading))
}

pub async fn health() -> &'static str {
    "OK"
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/feed", get(feed))
        .route("/prices", get(prices))
        .route("/sentiment", get(sentiment))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
