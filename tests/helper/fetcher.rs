//! In-memory fetcher

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use aur_updater::fetcher::{FetchError, Fetcher};

/// Serves canned responses keyed by URL; unknown URLs answer 404
#[derive(Default)]
pub struct MockFetcher {
    texts: HashMap<String, String>,
    bytes: HashMap<String, Vec<u8>>,
    failures: HashMap<String, u16>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, url: &str, body: impl Into<String>) -> Self {
        self.texts.insert(url.to_string(), body.into());
        self
    }

    pub fn with_bytes(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bytes.insert(url.to_string(), body.into());
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.failures.insert(url.to_string(), status);
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, url: &str) -> Result<(), FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.failures.get(url) {
            Some(&status) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            None => Ok(()),
        }
    }

    fn not_found(url: &str) -> FetchError {
        FetchError::Status {
            url: url.to_string(),
            status: 404,
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.record(url)?;
        self.texts
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.record(url)?;
        self.bytes
            .get(url)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }
}
