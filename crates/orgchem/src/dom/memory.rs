//! Headless document backend
//!
//! A small in-memory DOM: parsed element tree, class and inline-style
//! manipulation, selector queries and click handlers. It has no layout, so
//! every element sits at offset zero and scrolling only records positions.
//! Scripts handed to [`Document::execute_script`] are recorded instead of
//! being run.

use super::parse::{self, decode_entities, escape_attribute, escape_text, parse_fragment};
use super::selector::{Selector, SelectorTarget};
use super::{ClickHandler, Document, Element, ElementRef, History, InsertPosition};
use crate::scripts::Script;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

// ============================================================================
// Nodes
// ============================================================================

/// A child of a [`MemoryElement`]
pub(crate) enum Node {
    Element(Rc<MemoryElement>),
    /// Text, stored as markup (entities still encoded)
    Text(String),
    /// Comments and doctypes, serialized verbatim
    Raw(String),
}

/// An element of the headless document
pub struct MemoryElement {
    tag: String,
    attributes: RefCell<Vec<(String, String)>>,
    styles: RefCell<Vec<(String, String)>>,
    children: RefCell<Vec<Node>>,
    parent: RefCell<Weak<MemoryElement>>,
    this: Weak<MemoryElement>,
    scroll_top: Cell<i32>,
    click_handlers: RefCell<Vec<ClickHandler>>,
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes.borrow())
            .finish()
    }
}

impl MemoryElement {
    /// Creates a detached element
    pub fn new(tag: &str) -> Rc<Self> {
        Self::with_attributes(tag, Vec::new())
    }

    pub(crate) fn with_attributes(tag: &str, attributes: Vec<(String, String)>) -> Rc<Self> {
        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut styles = Vec::new();

        for (name, value) in attributes {
            if name == "style" {
                styles = parse_style(&value);
            } else if !attrs.iter().any(|(n, _)| *n == name) {
                attrs.push((name, value));
            }
        }

        Rc::new_cyclic(|this| MemoryElement {
            tag: tag.to_ascii_lowercase(),
            attributes: RefCell::new(attrs),
            styles: RefCell::new(styles),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            this: this.clone(),
            scroll_top: Cell::new(0),
            click_handlers: RefCell::new(Vec::new()),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Parent element, if attached
    pub fn parent(&self) -> Option<Rc<MemoryElement>> {
        self.parent.borrow().upgrade()
    }

    /// Serializes the element and its subtree
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_outer(&mut out);
        out
    }

    pub(crate) fn append_node(&self, node: Node) {
        if let Node::Element(el) = &node {
            *el.parent.borrow_mut() = self.this.clone();
        }
        self.children.borrow_mut().push(node);
    }

    fn replace_children(&self, nodes: Vec<Node>) {
        let old = std::mem::take(&mut *self.children.borrow_mut());
        for node in &old {
            if let Node::Element(el) = node {
                *el.parent.borrow_mut() = Weak::new();
            }
        }
        for node in nodes {
            self.append_node(node);
        }
    }

    fn insert_nodes_at(&self, index: usize, nodes: Vec<Node>) {
        for node in &nodes {
            if let Node::Element(el) = node {
                *el.parent.borrow_mut() = self.this.clone();
            }
        }
        let mut children = self.children.borrow_mut();
        let index = index.min(children.len());
        children.splice(index..index, nodes);
    }

    fn element_children(&self) -> Vec<Rc<MemoryElement>> {
        self.children
            .borrow()
            .iter()
            .filter_map(|node| match node {
                Node::Element(el) => Some(Rc::clone(el)),
                _ => None,
            })
            .collect()
    }

    /// Descendants in document order, excluding `self`
    fn descendants(&self, out: &mut Vec<Rc<MemoryElement>>) {
        for child in self.element_children() {
            out.push(Rc::clone(&child));
            child.descendants(out);
        }
    }

    fn select(&self, selector: &str, first_only: bool) -> Vec<Rc<MemoryElement>> {
        let selector = Selector::parse(selector);
        let mut all = Vec::new();
        self.descendants(&mut all);

        let mut found = Vec::new();
        for el in all {
            if selector.matches(&el) {
                found.push(el);
                if first_only {
                    break;
                }
            }
        }
        found
    }

    fn raw_attribute(&self, name: &str) -> Option<String> {
        if name == "style" {
            let styles = self.styles.borrow();
            return (!styles.is_empty()).then(|| serialize_style(&styles));
        }
        self.attributes
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn classes(&self) -> Vec<String> {
        self.raw_attribute("class")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn collect_text(&self, out: &mut String) {
        let raw = parse::is_raw_text(&self.tag);
        for node in self.children.borrow().iter() {
            match node {
                Node::Element(el) => el.collect_text(out),
                Node::Text(text) if raw => out.push_str(text),
                Node::Text(text) => out.push_str(&decode_entities(text)),
                Node::Raw(_) => {}
            }
        }
    }

    fn write_outer(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in self.attributes.borrow().iter() {
            out.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
        }
        if let Some(style) = self.raw_attribute("style") {
            out.push_str(&format!(" style=\"{}\"", escape_attribute(&style)));
        }
        out.push('>');

        if parse::is_void(&self.tag) {
            return;
        }

        self.write_inner(out);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    fn write_inner(&self, out: &mut String) {
        for node in self.children.borrow().iter() {
            match node {
                Node::Element(el) => el.write_outer(out),
                Node::Text(text) | Node::Raw(text) => out.push_str(text),
            }
        }
    }

    fn child_by_tag(&self, tag: &str) -> Option<Rc<MemoryElement>> {
        self.element_children().into_iter().find(|el| el.tag == tag)
    }
}

impl SelectorTarget for MemoryElement {
    fn selector_tag(&self) -> String {
        self.tag.clone()
    }

    fn selector_attribute(&self, name: &str) -> Option<String> {
        self.raw_attribute(name)
    }

    fn selector_parent(&self) -> Option<Rc<Self>> {
        self.parent()
    }
}

impl Element for MemoryElement {
    fn tag_name(&self) -> String {
        self.tag.clone()
    }

    fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_inner(&mut out);
        out
    }

    fn set_inner_html(&self, html: &str) {
        self.replace_children(parse_fragment(html));
    }

    fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn set_text_content(&self, text: &str) {
        let markup = if parse::is_raw_text(&self.tag) {
            text.to_string()
        } else {
            escape_text(text)
        };
        let nodes = if markup.is_empty() {
            Vec::new()
        } else {
            vec![Node::Text(markup)]
        };
        self.replace_children(nodes);
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.raw_attribute(&name.to_ascii_lowercase())
    }

    fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .attributes
            .borrow()
            .iter()
            .map(|(n, _)| n.clone())
            .collect();
        if !self.styles.borrow().is_empty() {
            names.push("style".to_string());
        }
        names
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "style" {
            *self.styles.borrow_mut() = parse_style(value);
            return;
        }

        let mut attributes = self.attributes.borrow_mut();
        match attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => attributes.push((name, value.to_string())),
        }
    }

    fn remove_attribute(&self, name: &str) {
        let name = name.to_ascii_lowercase();
        if name == "style" {
            self.styles.borrow_mut().clear();
            return;
        }
        self.attributes.borrow_mut().retain(|(n, _)| *n != name);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }

    fn add_class(&self, class: &str) {
        let mut classes = self.classes();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
            self.set_attribute("class", &classes.join(" "));
        }
    }

    fn remove_class(&self, class: &str) {
        let classes = self.classes();
        if classes.iter().any(|c| c == class) {
            let kept: Vec<String> = classes.into_iter().filter(|c| c != class).collect();
            self.set_attribute("class", &kept.join(" "));
        }
    }

    fn style(&self, property: &str) -> Option<String> {
        self.styles
            .borrow()
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.clone())
    }

    fn set_style(&self, property: &str, value: &str) {
        let mut styles = self.styles.borrow_mut();
        if value.is_empty() {
            styles.retain(|(p, _)| p != property);
            return;
        }
        match styles.iter_mut().find(|(p, _)| p == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => styles.push((property.to_string(), value.to_string())),
        }
    }

    fn scroll_top(&self) -> i32 {
        self.scroll_top.get()
    }

    fn set_scroll_top(&self, top: i32) {
        self.scroll_top.set(top);
    }

    fn query(&self, selector: &str) -> Option<ElementRef> {
        self.select(selector, true)
            .into_iter()
            .next()
            .map(|el| el as ElementRef)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementRef> {
        self.select(selector, false)
            .into_iter()
            .map(|el| el as ElementRef)
            .collect()
    }

    fn insert_html(&self, position: InsertPosition, html: &str) {
        let nodes = parse_fragment(html);
        match position {
            InsertPosition::AfterBegin => self.insert_nodes_at(0, nodes),
            InsertPosition::BeforeEnd => {
                for node in nodes {
                    self.append_node(node);
                }
            }
            InsertPosition::AfterEnd => {
                let Some(parent) = self.parent() else {
                    return;
                };
                let index = parent
                    .children
                    .borrow()
                    .iter()
                    .position(|node| matches!(node, Node::Element(el) if std::ptr::eq(Rc::as_ptr(el), self)));
                if let Some(index) = index {
                    parent.insert_nodes_at(index + 1, nodes);
                }
            }
        }
    }

    fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent
            .children
            .borrow_mut()
            .retain(|node| !matches!(node, Node::Element(el) if std::ptr::eq(Rc::as_ptr(el), self)));
        *self.parent.borrow_mut() = Weak::new();
    }

    fn on_click(&self, handler: ClickHandler) {
        self.click_handlers.borrow_mut().push(handler);
    }

    fn click(&self) {
        // Handlers may mutate this element, so run them off a snapshot
        let handlers: Vec<ClickHandler> = self.click_handlers.borrow().clone();
        for handler in handlers {
            handler();
        }
    }
}

fn parse_style(value: &str) -> Vec<(String, String)> {
    value
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            (!property.is_empty() && !value.is_empty())
                .then(|| (property, value.to_string()))
        })
        .collect()
}

fn serialize_style(styles: &[(String, String)]) -> String {
    styles
        .iter()
        .map(|(p, v)| format!("{}: {};", p, v))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Document
// ============================================================================

/// Headless [`Document`] over a [`MemoryElement`] tree
pub struct MemoryDocument {
    root: Rc<MemoryElement>,
    executed: RefCell<Vec<Script>>,
    scroll_y: Cell<i32>,
    last_anchor: RefCell<Option<String>>,
    dark_scheme: Cell<bool>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty page with `<html>`, `<head>` and `<body>`
    pub fn new() -> Self {
        Self::parse("")
    }

    /// Builds a document from page markup
    ///
    /// Missing `<html>`, `<head>` and `<body>` elements are created; loose
    /// top-level content is moved into the body.
    pub fn parse(html: &str) -> Self {
        let nodes = parse_fragment(html);

        let existing = nodes.iter().find_map(|node| match node {
            Node::Element(el) if el.tag == "html" => Some(Rc::clone(el)),
            _ => None,
        });

        let root = match existing {
            Some(root) => root,
            None => {
                let root = MemoryElement::new("html");
                for node in nodes {
                    if !matches!(node, Node::Raw(_)) {
                        root.append_node(node);
                    }
                }
                root
            }
        };

        ensure_structure(&root);

        Self {
            root,
            executed: RefCell::new(Vec::new()),
            scroll_y: Cell::new(0),
            last_anchor: RefCell::new(None),
            dark_scheme: Cell::new(false),
        }
    }

    /// The `<html>` element
    pub fn root_element(&self) -> Rc<MemoryElement> {
        Rc::clone(&self.root)
    }

    /// Serializes the whole page
    pub fn to_html(&self) -> String {
        format!("<!DOCTYPE html>\n{}", self.root.outer_html())
    }

    /// Scripts executed so far, in order
    pub fn executed_scripts(&self) -> Vec<Script> {
        self.executed.borrow().clone()
    }

    /// Current viewport offset
    pub fn scroll_y(&self) -> i32 {
        self.scroll_y.get()
    }

    /// Id of the last element scrolled into view
    pub fn last_anchor(&self) -> Option<String> {
        self.last_anchor.borrow().clone()
    }

    pub fn set_prefers_dark_scheme(&self, dark: bool) {
        self.dark_scheme.set(dark);
    }

    fn head(&self) -> Rc<MemoryElement> {
        self.root
            .child_by_tag("head")
            .unwrap_or_else(|| Rc::clone(&self.root))
    }
}

fn ensure_structure(root: &Rc<MemoryElement>) {
    if root.child_by_tag("body").is_none() {
        let body = MemoryElement::new("body");
        let loose: Vec<Node> = {
            let mut children = root.children.borrow_mut();
            let (head, rest): (Vec<Node>, Vec<Node>) = std::mem::take(&mut *children)
                .into_iter()
                .partition(|node| matches!(node, Node::Element(el) if el.tag == "head"));
            *children = head;
            rest
        };
        for node in loose {
            if matches!(&node, Node::Text(text) if text.trim().is_empty()) {
                continue;
            }
            body.append_node(node);
        }
        root.append_node(Node::Element(body));
    }

    if root.child_by_tag("head").is_none() {
        root.insert_nodes_at(0, vec![Node::Element(MemoryElement::new("head"))]);
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> ElementRef {
        Rc::clone(&self.root) as ElementRef
    }

    fn body(&self) -> ElementRef {
        self.root
            .child_by_tag("body")
            .unwrap_or_else(|| Rc::clone(&self.root)) as ElementRef
    }

    fn query(&self, selector: &str) -> Option<ElementRef> {
        if Selector::parse(selector).matches(&self.root) {
            return Some(self.root());
        }
        self.root.query(selector)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementRef> {
        let mut found = Vec::new();
        if Selector::parse(selector).matches(&self.root) {
            found.push(self.root());
        }
        found.extend(self.root.query_all(selector));
        found
    }

    fn title(&self) -> String {
        self.root
            .query("title")
            .map(|el| el.text_content().trim().to_string())
            .unwrap_or_default()
    }

    fn set_title(&self, title: &str) {
        let element = match self.root.query("title") {
            Some(el) => el,
            None => {
                let el = MemoryElement::new("title");
                self.head().append_node(Node::Element(Rc::clone(&el)));
                el as ElementRef
            }
        };
        element.set_text_content(title);
    }

    fn execute_script(&self, script: &Script) {
        tracing::debug!(src = ?script.src, "recording script execution");
        self.executed.borrow_mut().push(script.clone());
    }

    fn scroll_to(&self, top: i32) {
        self.scroll_y.set(top);
    }

    fn scroll_to_anchor(&self, id: &str, offset: i32) -> bool {
        if self.root.query(&format!("#{}", id)).is_none() {
            return false;
        }
        // No layout: every element sits at the top of the page
        self.scroll_y.set((0 - offset).max(0));
        *self.last_anchor.borrow_mut() = Some(id.to_string());
        true
    }

    fn prefers_dark_scheme(&self) -> bool {
        self.dark_scheme.get()
    }
}

// ============================================================================
// History
// ============================================================================

/// Session history kept in memory, with back/forward traversal
#[derive(Debug)]
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
    index: Cell<usize>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: RefCell::new(vec![initial.to_string()]),
            index: Cell::new(0),
        }
    }

    /// Moves one entry back; false at the oldest entry
    pub fn back(&self) -> bool {
        let index = self.index.get();
        if index == 0 {
            return false;
        }
        self.index.set(index - 1);
        true
    }

    /// Moves one entry forward; false at the newest entry
    pub fn forward(&self) -> bool {
        let index = self.index.get();
        if index + 1 >= self.entries.borrow().len() {
            return false;
        }
        self.index.set(index + 1);
        true
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> String {
        self.entries.borrow()[self.index.get()].clone()
    }

    fn push(&self, path: &str) {
        let mut entries = self.entries.borrow_mut();
        entries.truncate(self.index.get() + 1);
        entries.push(path.to_string());
        self.index.set(entries.len() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page() -> MemoryDocument {
        MemoryDocument::parse(
            r#"<html><head><title>Home</title></head><body><div id="app"><main id="content"></main></div></body></html>"#,
        )
    }

    #[test]
    fn test_parse_wraps_loose_markup() {
        let doc = MemoryDocument::parse(r#"<div id="app"></div>"#);
        assert!(doc.query("html > body #app").is_some());
        assert!(doc.query("head").is_some());
    }

    #[test]
    fn test_inner_html_round_trip() {
        let doc = page();
        let content = doc.query("#content").unwrap();
        content.set_inner_html(r#"<h1 class="content-title">Alcohols</h1><p>R&amp;D</p>"#);

        assert_eq!(
            content.inner_html(),
            r#"<h1 class="content-title">Alcohols</h1><p>R&amp;D</p>"#
        );
        assert_eq!(content.text_content(), "AlcoholsR&D");
    }

    #[test]
    fn test_classes_and_styles() {
        let doc = MemoryDocument::parse(r#"<aside class="sidebar" style="width: 280px"></aside>"#);
        let sidebar = doc.query(".sidebar").unwrap();

        sidebar.add_class("collapsed");
        sidebar.add_class("collapsed");
        assert_eq!(sidebar.attribute("class").as_deref(), Some("sidebar collapsed"));

        sidebar.set_style("width", "60px");
        sidebar.set_style("margin-left", "0");
        assert_eq!(sidebar.style("width").as_deref(), Some("60px"));
        assert_eq!(sidebar.attribute("style").as_deref(), Some("width: 60px; margin-left: 0;"));

        sidebar.set_style("margin-left", "");
        sidebar.remove_class("collapsed");
        assert!(!sidebar.has_class("collapsed"));
        assert_eq!(sidebar.style("margin-left"), None);
    }

    #[test]
    fn test_insert_after_end() {
        let doc = MemoryDocument::parse(r#"<div class="content-navigation"></div><footer></footer>"#);
        let nav = doc.query(".content-navigation").unwrap();
        nav.insert_html(InsertPosition::AfterEnd, r#"<div class="keyboard-hint">hint</div>"#);

        let body = doc.body();
        assert_eq!(
            body.inner_html(),
            r#"<div class="content-navigation"></div><div class="keyboard-hint">hint</div><footer></footer>"#
        );
    }

    #[test]
    fn test_remove_detaches() {
        let doc = MemoryDocument::parse(r#"<div data-include="/partials/card.html"></div><p>after</p>"#);
        let include = doc.query("[data-include]").unwrap();
        include.insert_html(InsertPosition::AfterEnd, "<section>card</section>");
        include.remove();

        assert!(doc.query("[data-include]").is_none());
        assert_eq!(doc.body().inner_html(), "<section>card</section><p>after</p>");
    }

    #[test]
    fn test_click_handlers() {
        let doc = page();
        let content = doc.query("#content").unwrap();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        content.on_click(Rc::new(move || counter.set(counter.get() + 1)));
        content.click();
        content.click();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_title() {
        let doc = page();
        assert_eq!(doc.title(), "Home");
        doc.set_title("Ethers - Organic Chem Resources");
        assert_eq!(doc.title(), "Ethers - Organic Chem Resources");

        let bare = MemoryDocument::new();
        bare.set_title("About");
        assert_eq!(bare.title(), "About");
    }

    #[test]
    fn test_scroll_to_anchor() {
        let doc = MemoryDocument::parse(r#"<h2 id="preparation">Preparation</h2>"#);
        doc.scroll_to(400);
        assert!(doc.scroll_to_anchor("preparation", 100));
        assert_eq!(doc.last_anchor().as_deref(), Some("preparation"));
        assert_eq!(doc.scroll_y(), 0);
        assert!(!doc.scroll_to_anchor("missing", 100));
    }

    #[test]
    fn test_history_back_forward() {
        let history = MemoryHistory::new("/");
        history.push("/about");
        history.push("/contact");
        assert!(history.back());
        assert_eq!(history.current_path(), "/about");

        history.push("/lessons/ethers");
        assert!(!history.forward());
        assert_eq!(history.entries(), vec!["/", "/about", "/lessons/ethers"]);
    }
}
