use chrono::Utc;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::SourceConfig;
use crate::extract::extract_articles;
use crate::fetch::{Fetcher, RetryPolicy};
use crate::types::{Article, CategoryFilter, FeedPage};

/// Browser User-Agents rotated across sources; several feed hosts refuse
/// requests that do not look like a browser.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/108.0.1462.54 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
];

fn feed_headers(source_idx: usize) -> HeaderMap {
    let agent = USER_AGENTS[source_idx % USER_AGENTS.len()];
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(agent));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "application/rss+xml, application/xml, text/xml, application/atom+xml",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        header::REFERER,
        HeaderValue::from_static("https://www.google.com/"),
    );
    headers
}

/// Fetch and extract one source. Failures degrade to an empty contribution;
/// this function never errors.
async fn fetch_source(
    fetcher: &Fetcher,
    source: &SourceConfig,
    policy: &RetryPolicy,
    idx: usize,
) -> Vec<Article> {
    match fetcher
        .fetch_text(&source.url, feed_headers(idx), policy)
        .await
    {
        Ok(body) => {
            let articles = extract_articles(&body, &source.name, Utc::now());
            if articles.is_empty() {
                warn!(source = %source.name, "no parseable items in feed");
            } else {
                info!(source = %source.name, count = articles.len(), "parsed articles");
            }
            articles
        }
        Err(e) => {
            warn!(source = %source.name, error = %e, "feed fetch failed, contributing no articles");
            Vec::new()
        }
    }
}

/// Merge, sort, filter, and paginate already-extracted articles.
///
/// Sort is by `published_at` descending and stable, so equal timestamps keep
/// the per-source concatenation order. `total` counts the post-filter set.
pub fn assemble_page(
    mut articles: Vec<Article>,
    filter: CategoryFilter,
    page: u32,
    limit: u32,
) -> FeedPage {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    let filtered: Vec<Article> = if filter == CategoryFilter::All {
        articles
    } else {
        articles
            .into_iter()
            .filter(|article| filter.matches(article.category))
            .collect()
    };

    let total = filtered.len();
    let page = page.max(1) as usize;
    let limit = limit.max(1) as usize;
    let start = (page - 1) * limit;
    let has_more = start + limit < total;

    let items = filtered.into_iter().skip(start).take(limit).collect();

    FeedPage {
        items,
        has_more,
        total,
    }
}

/// Serve one page of the aggregated feed.
///
/// Fans out one fetch+extract task per configured source, waits for every
/// task to settle, and tolerates individual failures: a dead source just
/// contributes nothing. Sources are re-assembled in configured order before
/// the merge so ties sort deterministically.
pub async fn get_feed(
    fetcher: &Fetcher,
    sources: &[SourceConfig],
    policy: &RetryPolicy,
    page: u32,
    filter: CategoryFilter,
    limit: u32,
) -> FeedPage {
    let mut tasks = JoinSet::new();
    for (idx, source) in sources.iter().enumerate() {
        let fetcher = fetcher.clone();
        let source = source.clone();
        let policy = policy.clone();
        tasks.spawn(async move { (idx, fetch_source(&fetcher, &source, &policy, idx).await) });
    }

    let mut slots: Vec<Vec<Article>> = vec![Vec::new(); sources.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, articles)) => slots[idx] = articles,
            // A panicked source task counts as a failed source, nothing more.
            Err(e) => warn!(error = %e, "source task aborted"),
        }
    }

    let all: Vec<Article> = slots.into_iter().flatten().collect();
    assemble_page(all, filter, page, limit)
}
