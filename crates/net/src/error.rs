use thiserror::Error;

/// Everything that can go wrong between building a request URL and decoding its JSON.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot build a request URL from base {base:?}")]
    Url { base: String },
    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
