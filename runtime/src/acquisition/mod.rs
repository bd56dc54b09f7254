//! Static acquisition: one plain HTTP GET, no JavaScript.

pub mod http_client;

use async_trait::async_trait;

pub use http_client::HttpClient;

/// Failure while fetching static markup.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{status} error for url {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Something that can return the raw markup behind a URL.
#[async_trait]
pub trait StaticFetcher: Send + Sync {
    /// Fetch `url` once. Fails on transport errors and non-success status.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
