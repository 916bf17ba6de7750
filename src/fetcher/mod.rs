//! Network retrieval of metadata payloads and artifacts
//!
//! - error.rs: FetchError
//! - http.rs: reqwest-backed implementation

pub mod error;
pub mod http;

#[cfg(test)]
use mockall::automock;

pub use error::FetchError;
pub use http::HttpFetcher;

/// Trait for fetching raw upstream data
///
/// Implementations perform no retries; any error is final for the request.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a metadata payload as text
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Fetches an artifact as raw bytes
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
