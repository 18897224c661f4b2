use serde::Deserialize;
use std::path::Path;

use crate::types::Category;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub prices: PricesConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

/// Retry and timeout tuning shared by every upstream call.
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Overall per-request deadline; the retry schedule has no ceiling of
    /// its own beyond attempts x max backoff.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// One upstream feed endpoint. The set is fixed at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    /// Advisory topic hint; the categorizer assigns the actual label.
    #[serde(default)]
    pub category: Option<Category>,
}

impl SourceConfig {
    fn new(name: &str, url: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category: Some(category),
        }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("CoinDesk", "https://www.coindesk.com/feed/", Category::Bitcoin),
        SourceConfig::new("Cointelegraph", "https://cointelegraph.com/rss", Category::Altcoins),
        SourceConfig::new("Bitcoinist", "https://bitcoinist.com/feed/", Category::Bitcoin),
        SourceConfig::new("Decrypt", "https://decrypt.co/feed", Category::Altcoins),
        SourceConfig::new("The Block", "https://www.theblockcrypto.com/rss", Category::Macro),
        SourceConfig::new("Blockworks", "https://www.blockworks.co/feed", Category::Defi),
        SourceConfig::new("DL News", "https://www.dlnews.com/rss", Category::Macro),
    ]
}

/// Batch price quote endpoint (CoinGecko-shaped).
#[derive(Debug, Deserialize, Clone)]
pub struct PricesConfig {
    #[serde(default = "default_prices_base_url")]
    pub base_url: String,
    #[serde(default = "default_asset_ids")]
    pub asset_ids: Vec<String>,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
}

fn default_prices_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_asset_ids() -> Vec<String> {
    [
        "bitcoin", "ethereum", "solana", "ripple", "cardano", "dogecoin", "polkadot", "litecoin",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_vs_currency() -> String {
    "usd".to_string()
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            base_url: default_prices_base_url(),
            asset_ids: default_asset_ids(),
            vs_currency: default_vs_currency(),
        }
    }
}

/// Fear/greed index endpoint (alternative.me-shaped).
#[derive(Debug, Deserialize, Clone)]
pub struct SentimentConfig {
    #[serde(default = "default_sentiment_url")]
    pub url: String,
}

fn default_sentiment_url() -> String {
    "https://api.alternative.me/fng/".to_string()
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            url: default_sentiment_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            fetch: FetchConfig::default(),
            sources: default_sources(),
            prices: PricesConfig::default(),
            sentiment: SentimentConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind, "0.0.0.0:3000");
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.base_delay_ms, 1000);
        assert_eq!(config.sources.len(), 7);
        assert_eq!(config.prices.asset_ids.len(), 8);
        assert_eq!(config.prices.vs_currency, "usd");
        assert!(config.sentiment.url.contains("alternative.me"));
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            bind = "127.0.0.1:8080"

            [fetch]
            max_attempts = 5
            base_delay_ms = 250

            [[sources]]
            name = "Test Feed"
            url = "https://example.com/feed.xml"
            category = "bitcoin"

            [[sources]]
            name = "Another Feed"
            url = "https://example.org/rss"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.fetch.max_attempts, 5);
        assert_eq!(config.fetch.base_delay_ms, 250);
        // Unset fields keep their defaults
        assert_eq!(config.fetch.request_timeout_secs, 15);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].name, "Test Feed");
        assert_eq!(config.sources[0].category, Some(Category::Bitcoin));
        assert_eq!(config.sources[1].category, None);
    }

    #[test]
    fn test_empty_config_uses_default_sources() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.sources.len(), 7);
        assert_eq!(config.sources[0].name, "CoinDesk");
        assert_eq!(config.sources[6].name, "DL News");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let content = "this is not valid toml {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_source_missing_url_is_rejected() {
        let content = r#"
            [[sources]]
            name = "Test Feed"
            # Missing url field
        "#;

        let result = Config::from_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_source_category_is_rejected() {
        let content = r#"
            [[sources]]
            name = "Test Feed"
            url = "https://example.com/feed.xml"
            category = "sports"
        "#;

        let result = Config::from_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_price_overrides() {
        let content = r#"
            [prices]
            asset_ids = ["bitcoin", "ethereum"]
            vs_currency = "eur"
        "#;

        let config = Config::from_str(content).unwrap();
        assert_eq!(config.prices.asset_ids, vec!["bitcoin", "ethereum"]);
        assert_eq!(config.prices.vs_currency, "eur");
        assert_eq!(config.prices.base_url, "https://api.coingecko.com/api/v3");
    }
}
