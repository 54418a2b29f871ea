//! Browser document backend over `web-sys`

use orgchem::dom::{ClickHandler, Document, Element, ElementRef, History, InsertPosition};
use orgchem::scripts::Script;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

fn warn_js(action: &'static str, error: JsValue) {
    tracing::warn!(action, error = ?error, "DOM call failed");
}

fn elements(list: web_sys::NodeList) -> Vec<ElementRef> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .map(BrowserElement::wrap)
        .collect()
}

// ============================================================================
// Element
// ============================================================================

pub struct BrowserElement {
    element: web_sys::Element,
}

impl BrowserElement {
    pub fn new(element: web_sys::Element) -> Self {
        Self { element }
    }

    pub fn wrap(element: web_sys::Element) -> ElementRef {
        Rc::new(Self::new(element))
    }

    pub fn inner(&self) -> &web_sys::Element {
        &self.element
    }

    fn html(&self) -> Option<&web_sys::HtmlElement> {
        self.element.dyn_ref::<web_sys::HtmlElement>()
    }
}

impl Element for BrowserElement {
    fn tag_name(&self) -> String {
        self.element.tag_name().to_ascii_lowercase()
    }

    fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    fn set_inner_html(&self, html: &str) {
        self.element.set_inner_html(html);
    }

    fn text_content(&self) -> String {
        self.element.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, text: &str) {
        self.element.set_text_content(Some(text));
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn attribute_names(&self) -> Vec<String> {
        self.element
            .get_attribute_names()
            .iter()
            .filter_map(|name| name.as_string())
            .collect()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if let Err(e) = self.element.set_attribute(name, value) {
            warn_js("setAttribute", e);
        }
    }

    fn remove_attribute(&self, name: &str) {
        if let Err(e) = self.element.remove_attribute(name) {
            warn_js("removeAttribute", e);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn add_class(&self, class: &str) {
        if let Err(e) = self.element.class_list().add_1(class) {
            warn_js("classList.add", e);
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(e) = self.element.class_list().remove_1(class) {
            warn_js("classList.remove", e);
        }
    }

    fn style(&self, property: &str) -> Option<String> {
        self.html()
            .and_then(|html| html.style().get_property_value(property).ok())
            .filter(|value| !value.is_empty())
    }

    fn set_style(&self, property: &str, value: &str) {
        let Some(html) = self.html() else {
            return;
        };
        let style = html.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        if let Err(e) = result {
            warn_js("style", e);
        }
    }

    fn scroll_top(&self) -> i32 {
        self.element.scroll_top()
    }

    fn set_scroll_top(&self, top: i32) {
        self.element.set_scroll_top(top);
    }

    fn query(&self, selector: &str) -> Option<ElementRef> {
        self.element
            .query_selector(selector)
            .ok()
            .flatten()
            .map(BrowserElement::wrap)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementRef> {
        self.element
            .query_selector_all(selector)
            .map(elements)
            .unwrap_or_default()
    }

    fn insert_html(&self, position: InsertPosition, html: &str) {
        if let Err(e) = self.element.insert_adjacent_html(position.as_str(), html) {
            warn_js("insertAdjacentHTML", e);
        }
    }

    fn remove(&self) {
        self.element.remove();
    }

    /// Registers a listener that replaces the default action
    ///
    /// The listener lives as long as the element.
    fn on_click(&self, handler: ClickHandler) {
        let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            event.prevent_default();
            handler();
        });
        if let Err(e) = self
            .element
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
        {
            warn_js("addEventListener", e);
        }
        listener.forget();
    }

    fn click(&self) {
        if let Some(html) = self.html() {
            html.click();
        }
    }
}

// ============================================================================
// Document
// ============================================================================

pub struct BrowserDocument {
    window: web_sys::Window,
    document: web_sys::Document,
    root: web_sys::Element,
    body: web_sys::HtmlElement,
}

impl BrowserDocument {
    /// The current page; `None` outside a browser window
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let root = document.document_element()?;
        let body = document.body()?;
        Some(Self {
            window,
            document,
            root,
            body,
        })
    }

    pub fn window(&self) -> &web_sys::Window {
        &self.window
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }
}

impl Document for BrowserDocument {
    fn root(&self) -> ElementRef {
        BrowserElement::wrap(self.root.clone())
    }

    fn body(&self) -> ElementRef {
        BrowserElement::wrap(self.body.clone().into())
    }

    fn query(&self, selector: &str) -> Option<ElementRef> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .map(BrowserElement::wrap)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementRef> {
        self.document
            .query_selector_all(selector)
            .map(elements)
            .unwrap_or_default()
    }

    fn title(&self) -> String {
        self.document.title()
    }

    fn set_title(&self, title: &str) {
        self.document.set_title(title);
    }

    /// Re-creates the script so the browser runs it
    fn execute_script(&self, script: &Script) {
        let element = match self.document.create_element("script") {
            Ok(element) => element,
            Err(e) => return warn_js("createElement", e),
        };

        for (name, value) in &script.attributes {
            if let Err(e) = element.set_attribute(name, value) {
                warn_js("setAttribute", e);
            }
        }
        if script.is_inline() {
            element.set_text_content(Some(&script.text));
        }

        if let Err(e) = self.body.append_child(&element) {
            warn_js("appendChild", e);
        }
    }

    fn scroll_to(&self, top: i32) {
        self.window.scroll_to_with_x_and_y(0.0, f64::from(top));
    }

    fn scroll_to_anchor(&self, id: &str, offset: i32) -> bool {
        let Some(target) = self.document.get_element_by_id(id) else {
            return false;
        };

        let top = target.get_bounding_client_rect().top() + self.window.scroll_y().unwrap_or(0.0)
            - f64::from(offset);
        let options = web_sys::ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(web_sys::ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
        true
    }

    fn prefers_dark_scheme(&self) -> bool {
        self.window
            .match_media("(prefers-color-scheme: dark)")
            .ok()
            .flatten()
            .is_some_and(|query| query.matches())
    }
}

// ============================================================================
// History
// ============================================================================

pub struct BrowserHistory {
    window: web_sys::Window,
}

impl BrowserHistory {
    pub fn new(window: web_sys::Window) -> Self {
        Self { window }
    }
}

impl History for BrowserHistory {
    fn current_path(&self) -> String {
        self.window
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_string())
    }

    fn push(&self, path: &str) {
        let result = self
            .window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(path)));
        if let Err(e) = result {
            warn_js("history.pushState", e);
        }
    }
}
