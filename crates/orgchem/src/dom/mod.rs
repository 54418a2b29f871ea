//! Document ports
//!
//! The router and its widgets never touch a concrete DOM. They talk to the
//! page through [`Document`], [`Element`] and [`History`], implemented by
//! the headless [`memory`] backend here and by the browser backend in
//! `orgchem-web`.

use crate::scripts::Script;
use std::rc::Rc;

pub mod memory;
mod parse;
mod selector;

pub use memory::{MemoryDocument, MemoryElement, MemoryHistory};

/// Shared handle to an element
pub type ElementRef = Rc<dyn Element>;

/// Callback fired when an element is clicked
pub type ClickHandler = Rc<dyn Fn()>;

/// Where [`Element::insert_html`] places new markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before the first child
    AfterBegin,
    /// After the last child
    BeforeEnd,
    /// After the element itself, as its next sibling
    AfterEnd,
}

impl InsertPosition {
    /// Name used by `insertAdjacentHTML`
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertPosition::AfterBegin => "afterbegin",
            InsertPosition::BeforeEnd => "beforeend",
            InsertPosition::AfterEnd => "afterend",
        }
    }
}

/// A single element of the page
///
/// Setting inner HTML never executes embedded scripts; that is the job of
/// [`crate::scripts::Reactivator`].
pub trait Element {
    /// Lowercase tag name
    fn tag_name(&self) -> String;

    fn inner_html(&self) -> String;

    /// Replaces all children with parsed markup
    fn set_inner_html(&self, html: &str);

    fn text_content(&self) -> String;

    fn set_text_content(&self, text: &str);

    fn attribute(&self, name: &str) -> Option<String>;

    /// Names of all attributes present, in source order
    fn attribute_names(&self) -> Vec<String>;

    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);

    fn has_class(&self, class: &str) -> bool;

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    /// Adds the class when `on`, removes it otherwise
    fn toggle_class(&self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    /// Inline style value of a CSS property
    fn style(&self, property: &str) -> Option<String>;

    /// Sets an inline style; an empty value removes the property
    fn set_style(&self, property: &str, value: &str);

    fn scroll_top(&self) -> i32;

    fn set_scroll_top(&self, top: i32);

    /// First descendant matching a CSS selector
    fn query(&self, selector: &str) -> Option<ElementRef>;

    /// All descendants matching a CSS selector, in document order
    fn query_all(&self, selector: &str) -> Vec<ElementRef>;

    /// Parses markup and inserts it relative to this element
    fn insert_html(&self, position: InsertPosition, html: &str);

    /// Detaches the element from its parent
    fn remove(&self);

    /// Registers a click handler
    fn on_click(&self, handler: ClickHandler);

    /// Dispatches a click
    fn click(&self);
}

/// The page as a whole
pub trait Document {
    /// The `<html>` element
    fn root(&self) -> ElementRef;

    fn body(&self) -> ElementRef;

    fn query(&self, selector: &str) -> Option<ElementRef>;

    fn query_all(&self, selector: &str) -> Vec<ElementRef>;

    fn title(&self) -> String;

    fn set_title(&self, title: &str);

    /// Runs a script in page context
    fn execute_script(&self, script: &Script);

    /// Scrolls the viewport to a vertical offset
    fn scroll_to(&self, top: i32);

    /// Scrolls so the element with `id` sits `offset` pixels below the top
    ///
    /// Returns false when no such element exists.
    fn scroll_to_anchor(&self, id: &str, offset: i32) -> bool;

    /// Whether the platform asks for a dark color scheme
    fn prefers_dark_scheme(&self) -> bool {
        false
    }
}

/// Session history of the page
pub trait History {
    /// Current browser pathname (before base stripping and normalization)
    fn current_path(&self) -> String;

    /// Pushes a new entry without reloading
    fn push(&self, path: &str);
}
