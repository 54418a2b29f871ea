//! Script reactivation for freshly spliced markup
//!
//! Markup inserted through `innerHTML` is inert: its `<script>` tags never
//! run and its widgets are not wired. [`Reactivator::activate`] is the one
//! place that brings a container to life: scripts first, in document order,
//! then every registered [`Behavior`].

use crate::dom::{Document, Element};
use std::cell::RefCell;
use std::rc::Rc;

/// A script found in spliced markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    /// External source, when the tag has one
    pub src: Option<String>,
    /// Inline body (empty for external scripts)
    pub text: String,
    /// All attributes of the original tag, `src` included
    pub attributes: Vec<(String, String)>,
}

impl Script {
    /// Copies a `<script>` element
    pub fn from_element(element: &dyn Element) -> Self {
        let attributes: Vec<(String, String)> = SCRIPT_ATTRIBUTES
            .iter()
            .filter_map(|name| element.attribute(name).map(|v| (name.to_string(), v)))
            .collect();

        let src = element.attribute("src").filter(|s| !s.is_empty());
        let text = if src.is_some() {
            String::new()
        } else {
            element.text_content()
        };

        Self {
            src,
            text,
            attributes,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.src.is_none()
    }

    /// Short label for logs
    pub fn label(&self) -> &str {
        self.src.as_deref().unwrap_or("inline")
    }
}

/// Attributes carried over to the re-created script element
const SCRIPT_ATTRIBUTES: &[&str] = &[
    "src",
    "type",
    "async",
    "defer",
    "nomodule",
    "crossorigin",
    "integrity",
    "referrerpolicy",
    "id",
    "class",
];

/// Scripts inside `container`, in document order
pub fn scripts_in(container: &dyn Element) -> Vec<Script> {
    container
        .query_all("script")
        .iter()
        .map(|el| Script::from_element(el.as_ref()))
        .collect()
}

/// Behavior wired onto fresh markup
pub trait Behavior {
    fn name(&self) -> &'static str;

    /// Wires matching elements inside `container`; returns how many
    fn activate(&self, container: &dyn Element) -> usize;
}

/// What one activation did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activation {
    pub scripts: usize,
    pub behaviors: Vec<(&'static str, usize)>,
}

/// Runs scripts and behaviors on spliced containers
pub struct Reactivator {
    document: Rc<dyn Document>,
    behaviors: RefCell<Vec<Rc<dyn Behavior>>>,
}

impl Reactivator {
    pub fn new(document: Rc<dyn Document>) -> Self {
        Self {
            document,
            behaviors: RefCell::new(Vec::new()),
        }
    }

    /// Adds a behavior; behaviors run in registration order
    pub fn register(&self, behavior: Rc<dyn Behavior>) {
        self.behaviors.borrow_mut().push(behavior);
    }

    pub fn behavior_names(&self) -> Vec<&'static str> {
        self.behaviors.borrow().iter().map(|b| b.name()).collect()
    }

    /// Executes every script in `container` in page context
    pub fn execute_scripts(&self, container: &dyn Element) -> usize {
        let scripts = scripts_in(container);
        for script in &scripts {
            self.document.execute_script(script);
            tracing::debug!(script = script.label(), "executed script");
        }
        scripts.len()
    }

    /// Scripts, then behaviors
    pub fn activate(&self, container: &dyn Element) -> Activation {
        let scripts = self.execute_scripts(container);

        let behaviors: Vec<Rc<dyn Behavior>> = self.behaviors.borrow().clone();
        let behaviors = behaviors
            .iter()
            .map(|behavior| (behavior.name(), behavior.activate(container)))
            .collect();

        let activation = Activation { scripts, behaviors };
        tracing::debug!(?activation, "reactivated container");
        activation
    }
}
