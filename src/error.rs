use thiserror::Error;

/// Failure modes of upstream calls.
///
/// Per-source feed failures are absorbed by the aggregation pipeline; the
/// single-endpoint market adapters propagate these to the HTTP response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, DNS, or timeout failure after all retries.
    #[error("transport failure after {attempts} attempts: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream kept answering 429 until the attempt budget ran out.
    #[error("rate limited by upstream after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Non-2xx, non-429 response. Not retried.
    #[error("upstream returned {status} {status_text}")]
    UpstreamStatus { status: u16, status_text: String },

    /// Well-formed response carrying no usable entries.
    #[error("upstream returned no data")]
    EmptyUpstreamData,

    /// Body fetched fine but did not match the expected shape.
    #[error("malformed upstream payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl FetchError {
    /// HTTP status this failure maps to at the service boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::UpstreamStatus { status, .. } => *status,
            FetchError::EmptyUpstreamData => 404,
            FetchError::Transport { .. }
            | FetchError::RateLimited { .. }
            | FetchError::MalformedPayload(_) => 500,
        }
    }
}
