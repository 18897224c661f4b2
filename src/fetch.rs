use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, warn};

use crate::config::FetchConfig;
use crate::error::FetchError;

/// Backoff schedule for one upstream call: up to `max_attempts` tries with a
/// delay of `base_delay * 2^attempt` (zero-based, no jitter) before each
/// retry. A 429 consumes an attempt slot exactly like a network error does.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt)
    }
}

/// Thin wrapper over a shared [`reqwest::Client`] adding bounded retries,
/// exponential backoff, and rate-limit-aware waiting. Every upstream
/// integration goes through this.
///
/// Calls are independent; there is no state shared between them beyond the
/// client's connection pool, so concurrent callers do not interact.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("Chainwire/0.1 (News Aggregator)")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// GET `url` and return the response body as text.
    ///
    /// Non-2xx, non-429 statuses fail immediately with the upstream status;
    /// 429 and transport errors back off and retry until the attempt budget
    /// is exhausted.
    pub async fn fetch_text(
        &self,
        url: &str,
        headers: HeaderMap,
        policy: &RetryPolicy,
    ) -> Result<String, FetchError> {
        for attempt in 0..policy.max_attempts {
            debug!(url, attempt = attempt + 1, max = policy.max_attempts, "fetching");

            let result = self
                .client
                .get(url)
                .headers(headers.clone())
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) => {
                    if attempt + 1 == policy.max_attempts {
                        error!(url, error = %e, "transport failure, retries exhausted");
                        return Err(FetchError::Transport {
                            attempts: policy.max_attempts,
                            source: e,
                        });
                    }
                    let delay = policy.backoff(attempt);
                    warn!(url, error = %e, delay_ms = delay.as_millis() as u64, "transport error, backing off");
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let delay = policy.backoff(attempt);
                warn!(url, delay_ms = delay.as_millis() as u64, "rate limited, backing off");
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                error!(url, status = status.as_u16(), "upstream error status");
                return Err(FetchError::UpstreamStatus {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                });
            }

            match response.text().await {
                Ok(body) => {
                    debug!(url, bytes = body.len(), "fetched");
                    return Ok(body);
                }
                Err(e) => {
                    if attempt + 1 == policy.max_attempts {
                        error!(url, error = %e, "body read failure, retries exhausted");
                        return Err(FetchError::Transport {
                            attempts: policy.max_attempts,
                            source: e,
                        });
                    }
                    let delay = policy.backoff(attempt);
                    warn!(url, error = %e, delay_ms = delay.as_millis() as u64, "body read error, backing off");
                    tokio::time::sleep(delay).await;
                }
            }
        }

        // Only reachable when every attempt ended in a 429.
        error!(url, attempts = policy.max_attempts, "rate limited, retries exhausted");
        Err(FetchError::RateLimited {
            attempts: policy.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.backoff(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_policy_from_config() {
        let config = FetchConfig {
            max_attempts: 5,
            base_delay_ms: 50,
            request_timeout_secs: 15,
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_policy_clamps_zero_attempts() {
        let config = FetchConfig {
            max_attempts: 0,
            base_delay_ms: 1000,
            request_timeout_secs: 15,
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
    }
}
