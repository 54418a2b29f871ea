// Browser backend tests; run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use orgchem::dom::{Document, Element, History, InsertPosition};
use orgchem::storage::KeyValueStore;
use orgchem_web::{BrowserDocument, BrowserHistory, LocalStorage};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn fixture(document: &BrowserDocument, html: &str) {
    document.body().set_inner_html(html);
}

#[wasm_bindgen_test]
fn test_query_and_splice() {
    let document = BrowserDocument::new().unwrap();
    fixture(&document, r#"<div id="app"><div id="content-container"></div></div>"#);

    let content = document.query("#content-container").unwrap();
    content.set_inner_html(r#"<h1 class="content-title">Loading</h1><div data-include="/partials/card.html"></div>"#);
    content.query(".content-title").unwrap().set_text_content("Alcohols");

    assert_eq!(document.query("h1").unwrap().text_content(), "Alcohols");
    assert_eq!(content.query_all("[data-include]").len(), 1);

    let include = content.query("[data-include]").unwrap();
    include.insert_html(InsertPosition::AfterEnd, r#"<p class="card">card</p>"#);
    include.remove();
    assert!(document.query("[data-include]").is_none());
    assert!(document.query("#content-container .card").is_some());
}

#[wasm_bindgen_test]
fn test_classes_and_styles() {
    let document = BrowserDocument::new().unwrap();
    fixture(&document, r#"<aside class="sidebar"></aside>"#);

    let sidebar = document.query(".sidebar").unwrap();
    sidebar.toggle_class("collapsed", true);
    sidebar.set_style("width", "60px");
    assert!(sidebar.has_class("collapsed"));
    assert_eq!(sidebar.style("width").as_deref(), Some("60px"));

    sidebar.set_style("width", "");
    assert_eq!(sidebar.style("width"), None);
}

#[wasm_bindgen_test]
fn test_click_handler() {
    let document = BrowserDocument::new().unwrap();
    fixture(&document, r#"<button id="sidebar-toggle"></button>"#);

    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    let toggle = document.query("#sidebar-toggle").unwrap();
    toggle.on_click(Rc::new(move || counter.set(counter.get() + 1)));

    toggle.click();
    assert_eq!(clicks.get(), 1);
}

#[wasm_bindgen_test]
fn test_local_storage() {
    let store = LocalStorage::new();
    store.set("sidebarCollapsed", "true");
    assert_eq!(store.get("sidebarCollapsed").as_deref(), Some("true"));

    store.remove("sidebarCollapsed");
    assert_eq!(store.get("sidebarCollapsed"), None);
}

#[wasm_bindgen_test]
fn test_history_push() {
    let document = BrowserDocument::new().unwrap();
    let history = BrowserHistory::new(document.window().clone());
    let original = history.current_path();

    history.push("/lessons/ethers");
    assert_eq!(history.current_path(), "/lessons/ethers");

    history.push(&original);
}
