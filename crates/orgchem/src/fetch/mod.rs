//! Fetcher backends for site resources
//!
//! Every fragment, template and data file the client needs is a GET of a
//! site-relative URL. The [`Fetcher`] trait is that single operation; the
//! router decides which answers are required and which are optional.

use crate::error::FetchError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub mod memory;

#[cfg(feature = "native")]
pub mod filesystem;

pub use memory::MemoryFetcher;

#[cfg(feature = "native")]
pub use filesystem::FsFetcher;

/// Answer to a GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body text of a successful answer
    pub fn text(self) -> Result<String, FetchError> {
        if self.is_ok() {
            Ok(self.body)
        } else {
            Err(FetchError::Status {
                url: self.url,
                status: self.status,
            })
        }
    }

    /// Decodes the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// Trait for resource fetchers
///
/// `Err` means the request produced no response at all; HTTP errors come
/// back as an `Ok` response with a non-2xx status.
#[async_trait(?Send)]
pub trait Fetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;

    /// Get fetcher backend name
    fn name(&self) -> &'static str;
}

/// GETs `url` and returns its body, treating non-2xx as an error
pub async fn fetch_text(fetcher: &dyn Fetcher, url: &str) -> Result<String, FetchError> {
    let response = fetcher.get(url).await?;
    tracing::debug!(url, status = response.status, backend = fetcher.name(), "fetched");
    response.text()
}
