//! Filesystem fetcher backend
//!
//! Serves a site directory the way a static host would: the URL path maps
//! onto a file below the root, missing files are 404.

use super::{FetchResponse, Fetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Fetcher reading from a site directory
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
    base_path: String,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_path: String::new(),
        }
    }

    /// Serves the root under `base_path` instead of `/`
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a URL onto a file below the root
    ///
    /// Query strings and fragments are dropped and the path is
    /// percent-decoded. Paths escaping the root yield `None`.
    fn url_to_path(&self, url: &str) -> Option<PathBuf> {
        let path = url.split(['?', '#']).next().unwrap_or("");
        let path = orgchem_router::strip_base(path, &self.base_path);
        let decoded = urlencoding::decode(path).ok()?;

        let mut resolved = self.root.clone();
        for component in Path::new(decoded.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }
}

#[async_trait(?Send)]
impl Fetcher for FsFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let Some(path) = self.url_to_path(url) else {
            tracing::warn!(url, "rejected path outside the site root");
            return Ok(FetchResponse::new(url, 404, "Not Found"));
        };

        match fs::read_to_string(&path).await {
            Ok(body) => Ok(FetchResponse::new(url, 200, body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FetchResponse::new(url, 404, "Not Found")),
            Err(e) if path.is_dir() => {
                tracing::debug!(url, error = %e, "directory requested");
                Ok(FetchResponse::new(url, 404, "Not Found"))
            }
            Err(e) => Err(FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}
