//! Organic Chem Resources in the browser
//!
//! Implements the `orgchem` ports on top of `web-sys` and wires the page's
//! events to the application:
//!
//! - clicks on `a[data-link]` become client-side navigations
//! - `popstate` re-routes the new history entry
//! - ArrowLeft/ArrowRight move between lessons
//!
//! The module starts itself on load. A site served under a prefix, or with
//! other fragment locations, sets `window.ORGCHEM_CONFIG` before loading the
//! module:
//!
//! ```javascript
//! window.ORGCHEM_CONFIG = { site: { base_path: "/organic" } };
//! ```

use orgchem::app::render_app_error;
use orgchem::{App, KeyPress, LinkClick, Platform, SiteConfig};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

mod dom;
mod fetch;
mod logging;
mod storage;
mod timer;

pub use dom::{BrowserDocument, BrowserElement, BrowserHistory};
pub use fetch::BrowserFetcher;
pub use storage::LocalStorage;
pub use timer::BrowserTimer;

/// Global a page may set to configure the client
const CONFIG_GLOBAL: &str = "ORGCHEM_CONFIG";

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::INFO);

    let Some(document) = BrowserDocument::new() else {
        web_sys::console::error_1(&"orgchem: no document to run in".into());
        return;
    };
    let document = Rc::new(document);
    let window = document.window().clone();

    let config = match page_config(&window) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid {}, using defaults", CONFIG_GLOBAL);
            SiteConfig::default()
        }
    };

    let platform = Platform {
        document: document.clone(),
        history: Rc::new(BrowserHistory::new(window.clone())),
        fetcher: Rc::new(BrowserFetcher),
        store: Rc::new(LocalStorage::new()),
        timer: Rc::new(BrowserTimer),
    };

    let app = match App::new(platform, config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize application");
            render_app_error(document.as_ref());
            return;
        }
    };

    listen_for_links(&app, document.document());
    listen_for_history(&app, &window);
    listen_for_keys(&app, document.document());

    spawn_local(async move {
        // Failures are already on screen and in the log
        let _ = app.init().await;
    });
}

/// Reads `window.ORGCHEM_CONFIG`, if the page set one
fn page_config(window: &web_sys::Window) -> Result<SiteConfig, String> {
    let value = js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL))
        .map_err(|e| fetch::js_error_message(&e))?;
    if value.is_undefined() || value.is_null() {
        return Ok(SiteConfig::default());
    }

    let config: SiteConfig = serde_wasm_bindgen::from_value(value).map_err(|e| e.to_string())?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn navigate(app: &Rc<App>, path: String) {
    let app = Rc::clone(app);
    spawn_local(async move {
        if let Err(e) = app.router().navigate(&path).await {
            tracing::debug!(%path, error = %e, "navigation did not complete");
        }
    });
}

fn listen(target: &web_sys::EventTarget, event: &'static str, listener: Closure<dyn FnMut(web_sys::Event)>) {
    if let Err(e) = target.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
        tracing::error!(event, error = ?e, "failed to register listener");
    }
    listener.forget();
}

/// Delegated handler for `a[data-link]`
fn listen_for_links(app: &Rc<App>, document: &web_sys::Document) {
    let app = Rc::clone(app);
    let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(mouse) = event.dyn_ref::<web_sys::MouseEvent>() else {
            return;
        };
        let link = event
            .target()
            .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
            .and_then(|element| element.closest("a[data-link]").ok().flatten());
        let Some(link) = link else {
            return;
        };

        let click = LinkClick {
            href: link.get_attribute("href"),
            button: mouse.button(),
            ctrl: mouse.ctrl_key(),
            meta: mouse.meta_key(),
            alt: mouse.alt_key(),
            shift: mouse.shift_key(),
        };
        if let Some(path) = app.router().link_target(&click) {
            event.prevent_default();
            navigate(&app, path);
        }
    });
    listen(document, "click", listener);
}

fn listen_for_history(app: &Rc<App>, window: &web_sys::Window) {
    let app = Rc::clone(app);
    let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        let app = Rc::clone(&app);
        spawn_local(async move {
            if let Err(e) = app.router().handle_popstate().await {
                tracing::debug!(error = %e, "popstate navigation did not complete");
            }
        });
    });
    listen(window, "popstate", listener);
}

/// Arrow keys between lessons, ignored while typing
fn listen_for_keys(app: &Rc<App>, document: &web_sys::Document) {
    let app = Rc::clone(app);
    let page = document.clone();
    let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(keyboard) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
            return;
        };
        if let Some(active) = page.active_element() {
            if matches!(active.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
                || active.has_attribute("contenteditable")
            {
                return;
            }
        }

        let key = KeyPress {
            key: keyboard.key(),
            ctrl: keyboard.ctrl_key(),
            meta: keyboard.meta_key(),
            alt: keyboard.alt_key(),
            shift: keyboard.shift_key(),
        };
        if let Some(path) = app.router().key_target(&key) {
            event.prevent_default();
            navigate(&app, path);
        }
    });
    listen(document, "keydown", listener);
}
