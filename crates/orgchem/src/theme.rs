//! Color theme and font size preferences

use crate::dom::{Document, Element};
use crate::storage::KeyValueStore;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Storage key of the theme flag
pub const THEME_KEY: &str = "theme";

/// Storage key of the root font size
pub const FONT_SIZE_KEY: &str = "fontSize";

/// Elements showing the theme icon
pub const THEME_TOGGLE_SELECTOR: &str = "#theme-toggle, .theme-toggle, .theme-toggle-content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon offering the opposite theme
    pub fn icon_class(&self) -> &'static str {
        match self {
            Theme::Dark => "fas fa-sun",
            Theme::Light => "fas fa-moon",
        }
    }

    pub fn aria_label(&self) -> &'static str {
        match self {
            Theme::Dark => "Switch to light mode",
            Theme::Light => "Switch to dark mode",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of the `theme` and `fontSize` flags
pub struct ThemeController {
    document: Rc<dyn Document>,
    store: Rc<dyn KeyValueStore>,
    current: Cell<Theme>,
}

impl ThemeController {
    pub fn new(document: Rc<dyn Document>, store: Rc<dyn KeyValueStore>) -> Self {
        Self {
            document,
            store,
            current: Cell::new(Theme::Light),
        }
    }

    pub fn current(&self) -> Theme {
        self.current.get()
    }

    /// Stored theme, else the platform preference, else light
    pub fn initial_theme(&self) -> Theme {
        if let Some(theme) = self.store.get(THEME_KEY).as_deref().and_then(Theme::parse) {
            return theme;
        }
        if self.document.prefers_dark_scheme() {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Applies the stored preferences without writing them back
    pub fn restore(&self) {
        self.apply(self.initial_theme());

        if let Some(size) = self.store.get(FONT_SIZE_KEY).filter(|s| !s.is_empty()) {
            self.document.root().set_style("font-size", &size);
        }
    }

    /// Switches theme and persists the choice
    pub fn toggle(&self) -> Theme {
        let theme = self.current().toggled();
        self.apply(theme);
        self.store.set(THEME_KEY, theme.as_str());
        tracing::info!(%theme, "theme changed");
        theme
    }

    /// Sets `data-theme` on the root and updates every toggle
    pub fn apply(&self, theme: Theme) {
        self.current.set(theme);
        self.document.root().set_attribute("data-theme", theme.as_str());

        for toggle in self.document.query_all(THEME_TOGGLE_SELECTOR) {
            self.decorate(toggle.as_ref());
        }
    }

    /// Brings one toggle's icon and label in line with the current theme
    pub fn decorate(&self, toggle: &dyn Element) {
        let theme = self.current();
        if let Some(icon) = toggle.query("i") {
            icon.set_attribute("class", theme.icon_class());
        }
        toggle.set_attribute("aria-label", theme.aria_label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<button id="theme-toggle" class="theme-toggle"><i class="fas fa-moon"></i></button>"#;

    #[test]
    fn test_initial_theme_order() {
        let doc = Rc::new(MemoryDocument::parse(PAGE));
        doc.set_prefers_dark_scheme(true);

        let stored = ThemeController::new(doc.clone(), Rc::new(MemoryStore::new().with(THEME_KEY, "light")));
        assert_eq!(stored.initial_theme(), Theme::Light);

        let platform = ThemeController::new(doc.clone(), Rc::new(MemoryStore::new()));
        assert_eq!(platform.initial_theme(), Theme::Dark);

        let garbage = ThemeController::new(doc, Rc::new(MemoryStore::new().with(THEME_KEY, "sepia")));
        assert_eq!(garbage.initial_theme(), Theme::Dark);
    }

    #[test]
    fn test_restore_does_not_persist() {
        let doc = Rc::new(MemoryDocument::parse(PAGE));
        let store = Rc::new(MemoryStore::new().with(THEME_KEY, "dark").with(FONT_SIZE_KEY, "18px"));
        let theme = ThemeController::new(doc.clone(), store.clone());

        theme.restore();

        let root = doc.root();
        assert_eq!(root.attribute("data-theme").as_deref(), Some("dark"));
        assert_eq!(root.style("font-size").as_deref(), Some("18px"));
        assert_eq!(
            doc.query("#theme-toggle i").unwrap().attribute("class").as_deref(),
            Some("fas fa-sun")
        );
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_toggle_persists() {
        let doc = Rc::new(MemoryDocument::parse(PAGE));
        let store = Rc::new(MemoryStore::new());
        let theme = ThemeController::new(doc.clone(), store.clone());
        theme.restore();

        assert_eq!(theme.toggle(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(
            doc.query("#theme-toggle").unwrap().attribute("aria-label").as_deref(),
            Some("Switch to light mode")
        );

        assert_eq!(theme.toggle(), Theme::Light);
        assert_eq!(doc.root().attribute("data-theme").as_deref(), Some("light"));
    }
}
