//! Lesson sidebar collapse state
//!
//! [`SidebarController`] is the only component that reads or writes the
//! `sidebarCollapsed` flag. The toggle button, the initial restore and any
//! other caller go through [`SidebarController::set_collapsed`], which keeps
//! the sidebar's `collapsed` class, its inline layout and the stored flag
//! in agreement.

use crate::dom::{Document, ElementRef};
use crate::storage::KeyValueStore;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Storage key of the collapse flag
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebarCollapsed";

pub const COLLAPSED_WIDTH_PX: u32 = 60;
pub const EXPANDED_WIDTH_PX: u32 = 280;

/// Marks a toggle button that already has the click handler
const BOUND_ATTRIBUTE: &str = "data-sidebar-bound";

/// Elements the controller styles
#[derive(Clone)]
pub struct SidebarNodes {
    pub sidebar: ElementRef,
    pub toggle: ElementRef,
    /// `.content-area`, offset by the sidebar width
    pub content: Option<ElementRef>,
    pub topic_icon: Option<ElementRef>,
}

impl SidebarNodes {
    /// Finds `.sidebar` and `#sidebar-toggle`; both are required
    pub fn find(document: &dyn Document) -> Option<Self> {
        Some(Self {
            sidebar: document.query(".sidebar")?,
            toggle: document.query("#sidebar-toggle")?,
            content: document.query(".content-area"),
            topic_icon: document.query(".topic-icon"),
        })
    }
}

/// Owner of the sidebar collapse state
pub struct SidebarController {
    store: Rc<dyn KeyValueStore>,
    collapsed: Cell<bool>,
    nodes: RefCell<Option<SidebarNodes>>,
    this: Weak<SidebarController>,
}

impl SidebarController {
    /// Starts from the stored flag, so a sidebar attached before any
    /// [`restore`](Self::restore) still matches it
    pub fn new(store: Rc<dyn KeyValueStore>) -> Rc<Self> {
        let collapsed = store.get(SIDEBAR_COLLAPSED_KEY).as_deref() == Some("true");
        Rc::new_cyclic(|this| Self {
            store,
            collapsed: Cell::new(collapsed),
            nodes: RefCell::new(None),
            this: this.clone(),
        })
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed.get()
    }

    pub fn is_attached(&self) -> bool {
        self.nodes.borrow().is_some()
    }

    /// Stored flag; anything other than `"true"` reads as expanded
    pub fn stored_collapsed(&self) -> bool {
        self.store.get(SIDEBAR_COLLAPSED_KEY).as_deref() == Some("true")
    }

    /// Collapses or expands the sidebar
    ///
    /// The flag is persisted unless `is_initial_load`. Without attached
    /// nodes only the state (and flag) change; the layout follows on
    /// [`attach`](Self::attach).
    pub fn set_collapsed(&self, collapsed: bool, is_initial_load: bool) {
        self.collapsed.set(collapsed);

        if let Some(nodes) = self.nodes.borrow().as_ref() {
            apply(nodes, collapsed);
        }

        if !is_initial_load {
            self.store
                .set(SIDEBAR_COLLAPSED_KEY, if collapsed { "true" } else { "false" });
        }

        tracing::debug!(collapsed, is_initial_load, "sidebar state set");
    }

    pub fn toggle(&self) {
        self.set_collapsed(!self.is_collapsed(), false);
    }

    /// Applies the stored flag without writing it back
    pub fn restore(&self) {
        self.set_collapsed(self.stored_collapsed(), true);
    }

    /// Takes over a freshly rendered sidebar
    ///
    /// Applies the current state and wires the toggle button.
    pub fn attach(&self, nodes: SidebarNodes) {
        apply(&nodes, self.is_collapsed());

        // A toggle outside `.sidebar` survives the template splice
        if nodes.toggle.attribute(BOUND_ATTRIBUTE).is_none() {
            nodes.toggle.set_attribute(BOUND_ATTRIBUTE, "");
            let controller = self.this.clone();
            nodes.toggle.on_click(Rc::new(move || {
                if let Some(controller) = controller.upgrade() {
                    controller.toggle();
                }
            }));
        }

        *self.nodes.borrow_mut() = Some(nodes);
    }

    /// Forgets the current sidebar, e.g. when leaving a lesson
    pub fn detach(&self) {
        self.nodes.borrow_mut().take();
    }
}

fn apply(nodes: &SidebarNodes, collapsed: bool) {
    let width = if collapsed {
        COLLAPSED_WIDTH_PX
    } else {
        EXPANDED_WIDTH_PX
    };

    nodes.sidebar.toggle_class("collapsed", collapsed);
    nodes.sidebar.set_style("width", &format!("{}px", width));

    if let Some(content) = &nodes.content {
        content.set_style("margin-left", &format!("{}px", width));
        content.set_style("width", &format!("calc(100% - {}px)", width));
    }

    let icon = nodes.toggle.query("i");
    let label = nodes.toggle.query("span");

    if collapsed {
        if let Some(icon) = icon {
            icon.set_attribute("class", "fas fa-chevron-right");
        }
        if let Some(label) = label {
            label.set_style("display", "none");
        }

        let toggle = &nodes.toggle;
        toggle.set_style("justify-content", "center");
        toggle.set_style("padding", "10px");
        toggle.set_style("width", "40px");
        toggle.set_style("height", "40px");
        toggle.set_style("margin", "10px auto");
        toggle.set_style("border-radius", "50%");

        if let Some(topic_icon) = &nodes.topic_icon {
            topic_icon.set_style("margin", "20px auto");
            topic_icon.set_style("display", "block");
            topic_icon.set_style("width", "40px");
            topic_icon.set_style("height", "40px");
        }
    } else {
        if let Some(icon) = icon {
            icon.set_attribute("class", "fas fa-chevron-left");
        }
        if let Some(label) = label {
            label.set_style("display", "");
            label.set_text_content("Collapse");
        }

        for property in ["justify-content", "padding", "width", "height", "margin", "border-radius"] {
            nodes.toggle.set_style(property, "");
        }

        if let Some(topic_icon) = &nodes.topic_icon {
            for property in ["margin", "display", "width", "height"] {
                topic_icon.set_style(property, "");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    const LAYOUT: &str = r#"
        <aside class="sidebar">
            <div class="topic-icon" id="topic-icon"></div>
            <button id="sidebar-toggle"><i class="fas fa-chevron-left"></i><span>Collapse</span></button>
        </aside>
        <div class="content-area"></div>
    "#;

    fn setup(store: MemoryStore) -> (MemoryDocument, Rc<MemoryStore>, Rc<SidebarController>) {
        let doc = MemoryDocument::parse(LAYOUT);
        let store = Rc::new(store);
        let controller = SidebarController::new(store.clone());
        controller.attach(SidebarNodes::find(&doc).unwrap());
        (doc, store, controller)
    }

    #[test]
    fn test_collapse_then_expand() {
        let (doc, store, controller) = setup(MemoryStore::new());

        controller.set_collapsed(true, false);
        let sidebar = doc.query(".sidebar").unwrap();
        assert!(sidebar.has_class("collapsed"));
        assert_eq!(sidebar.style("width").as_deref(), Some("60px"));
        assert_eq!(store.get(SIDEBAR_COLLAPSED_KEY).as_deref(), Some("true"));

        controller.set_collapsed(false, false);
        assert!(!sidebar.has_class("collapsed"));
        assert_eq!(sidebar.style("width").as_deref(), Some("280px"));
        assert_eq!(store.get(SIDEBAR_COLLAPSED_KEY).as_deref(), Some("false"));
        assert!(!controller.is_collapsed());
    }

    #[test]
    fn test_initial_load_never_writes() {
        let (_doc, store, controller) = setup(MemoryStore::new().with(SIDEBAR_COLLAPSED_KEY, "true"));

        controller.restore();
        controller.set_collapsed(false, true);
        controller.set_collapsed(true, true);

        assert!(store.writes().is_empty());
        assert_eq!(store.get(SIDEBAR_COLLAPSED_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn test_collapsed_layout() {
        let (doc, _store, controller) = setup(MemoryStore::new());
        controller.set_collapsed(true, false);

        let content = doc.query(".content-area").unwrap();
        assert_eq!(content.style("margin-left").as_deref(), Some("60px"));
        assert_eq!(content.style("width").as_deref(), Some("calc(100% - 60px)"));

        let toggle = doc.query("#sidebar-toggle").unwrap();
        assert_eq!(toggle.style("border-radius").as_deref(), Some("50%"));
        assert_eq!(doc.query("#sidebar-toggle i").unwrap().attribute("class").as_deref(), Some("fas fa-chevron-right"));
        assert_eq!(doc.query("#sidebar-toggle span").unwrap().style("display").as_deref(), Some("none"));
        assert_eq!(doc.query(".topic-icon").unwrap().style("display").as_deref(), Some("block"));

        controller.set_collapsed(false, false);
        assert_eq!(toggle.style("border-radius"), None);
        assert_eq!(doc.query("#sidebar-toggle span").unwrap().style("display"), None);
        assert_eq!(doc.query(".topic-icon").unwrap().style("display"), None);
        assert_eq!(content.style("width").as_deref(), Some("calc(100% - 280px)"));
    }

    #[test]
    fn test_toggle_button_click() {
        let (doc, store, controller) = setup(MemoryStore::new());
        let toggle = doc.query("#sidebar-toggle").unwrap();

        toggle.click();
        assert!(controller.is_collapsed());
        assert!(doc.query(".sidebar.collapsed").is_some());

        toggle.click();
        assert!(!controller.is_collapsed());
        assert_eq!(store.get(SIDEBAR_COLLAPSED_KEY).as_deref(), Some("false"));
    }

    #[test]
    fn test_state_applies_on_attach() {
        let doc = MemoryDocument::parse(LAYOUT);
        let store = Rc::new(MemoryStore::new());
        let controller = SidebarController::new(store.clone());

        controller.set_collapsed(true, false);
        assert!(!controller.is_attached());
        assert_eq!(store.get(SIDEBAR_COLLAPSED_KEY).as_deref(), Some("true"));

        controller.attach(SidebarNodes::find(&doc).unwrap());
        assert!(doc.query(".sidebar").unwrap().has_class("collapsed"));

        controller.detach();
        controller.set_collapsed(false, false);
        assert!(doc.query(".sidebar").unwrap().has_class("collapsed"));
    }

    #[test]
    fn test_reattach_wires_toggle_once() {
        let (doc, _store, controller) = setup(MemoryStore::new());
        controller.attach(SidebarNodes::find(&doc).unwrap());

        doc.query("#sidebar-toggle").unwrap().click();
        assert!(controller.is_collapsed());
    }

    #[test]
    fn test_new_controller_follows_stored_flag() {
        let doc = MemoryDocument::parse(LAYOUT);
        let store = Rc::new(MemoryStore::new().with(SIDEBAR_COLLAPSED_KEY, "true"));
        let controller = SidebarController::new(store.clone());
        assert!(controller.is_collapsed());

        controller.attach(SidebarNodes::find(&doc).unwrap());
        let sidebar = doc.query(".sidebar").unwrap();
        assert!(sidebar.has_class("collapsed"));
        assert_eq!(sidebar.style("width").as_deref(), Some("60px"));
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_find_requires_toggle() {
        let doc = MemoryDocument::parse(r#"<aside class="sidebar"></aside>"#);
        assert!(SidebarNodes::find(&doc).is_none());
    }
}
