//! In-memory fetcher backend

use super::{FetchResponse, Fetcher};
use crate::error::FetchError;
use crate::timer::Timer;
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

/// In-memory fetcher
///
/// Serves registered bodies with status 200 and everything else as 404.
/// Keeps a log of requested URLs, can simulate network failures and, given
/// a [`Timer`], per-URL latency.
#[derive(Default)]
pub struct MemoryFetcher {
    resources: RefCell<HashMap<String, String>>,
    offline: RefCell<HashSet<String>>,
    latency: RefCell<HashMap<String, Duration>>,
    timer: Option<Rc<dyn Timer>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(self, url: &str, body: &str) -> Self {
        self.insert(url, body);
        self
    }

    /// Uses `timer` to apply latency set with [`delay`](Self::delay)
    pub fn with_timer(mut self, timer: Rc<dyn Timer>) -> Self {
        self.timer = Some(timer);
        self
    }

    pub fn insert(&self, url: &str, body: &str) {
        self.resources
            .borrow_mut()
            .insert(url.to_string(), body.to_string());
    }

    pub fn remove(&self, url: &str) {
        self.resources.borrow_mut().remove(url);
    }

    /// Makes requests for `url` fail without a response
    pub fn fail(&self, url: &str) {
        self.offline.borrow_mut().insert(url.to_string());
    }

    /// Delays answers for `url`
    pub fn delay(&self, url: &str, latency: Duration) {
        self.latency.borrow_mut().insert(url.to_string(), latency);
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Number of requests made for `url`
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }
}

#[async_trait(?Send)]
impl Fetcher for MemoryFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.borrow_mut().push(url.to_string());

        let latency = self.latency.borrow().get(url).copied();
        if let (Some(latency), Some(timer)) = (latency, &self.timer) {
            timer.sleep(latency).await;
        }

        if self.offline.borrow().contains(url) {
            return Err(FetchError::Network {
                url: url.to_string(),
                message: "simulated network failure".to_string(),
            });
        }

        let response = match self.resources.borrow().get(url) {
            Some(body) => FetchResponse::new(url, 200, body.as_str()),
            None => FetchResponse::new(url, 404, "Not Found"),
        };
        Ok(response)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
