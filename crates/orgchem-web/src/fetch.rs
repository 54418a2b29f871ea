//! `window.fetch` backend

use async_trait::async_trait;
use orgchem::fetch::{FetchResponse, Fetcher};
use orgchem::FetchError;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Fetches with the browser's `fetch`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserFetcher;

/// Readable message of a rejected promise
pub(crate) fn js_error_message(error: &JsValue) -> String {
    if let Some(error) = error.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    error.as_string().unwrap_or_else(|| format!("{:?}", error))
}

#[async_trait(?Send)]
impl Fetcher for BrowserFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let network = |error: JsValue| FetchError::Network {
            url: url.to_string(),
            message: js_error_message(&error),
        };

        let window = web_sys::window().ok_or_else(|| network(JsValue::from_str("no window")))?;
        let response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(network)?;
        let response: web_sys::Response = response.dyn_into().map_err(network)?;

        let status = response.status();
        let body = JsFuture::from(response.text().map_err(network)?)
            .await
            .map_err(network)?;

        Ok(FetchResponse::new(url, status, body.as_string().unwrap_or_default()))
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
