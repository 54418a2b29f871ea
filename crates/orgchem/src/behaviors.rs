//! Behaviors wired onto freshly spliced markup
//!
//! Registered with the [`Reactivator`](crate::scripts::Reactivator) and run,
//! scoped to the container, after its scripts.

use crate::dom::Element;
use crate::reaction::{render_reaction, ReactionData};
use crate::scripts::Behavior;
use crate::theme::{ThemeController, THEME_TOGGLE_SELECTOR};
use std::rc::Rc;

/// Theme toggle buttons
pub struct ThemeToggles {
    theme: Rc<ThemeController>,
}

impl ThemeToggles {
    pub fn new(theme: Rc<ThemeController>) -> Self {
        Self { theme }
    }
}

impl Behavior for ThemeToggles {
    fn name(&self) -> &'static str {
        "theme-toggles"
    }

    fn activate(&self, container: &dyn Element) -> usize {
        let toggles = container.query_all(THEME_TOGGLE_SELECTOR);
        for toggle in &toggles {
            self.theme.decorate(toggle.as_ref());

            let theme = Rc::downgrade(&self.theme);
            toggle.on_click(Rc::new(move || {
                if let Some(theme) = theme.upgrade() {
                    theme.toggle();
                }
            }));
        }
        toggles.len()
    }
}

/// `.reaction-scheme` blocks
///
/// `data-reaction="A + B -> C"` (with optional `data-conditions`) renders
/// an equation; `data-reaction-json` renders a structured scheme.
#[derive(Debug, Default)]
pub struct ReactionSchemes;

impl Behavior for ReactionSchemes {
    fn name(&self) -> &'static str {
        "reaction-schemes"
    }

    fn activate(&self, container: &dyn Element) -> usize {
        let mut rendered = 0;

        for scheme in container.query_all(".reaction-scheme") {
            let html = if let Some(json) = scheme.attribute("data-reaction-json") {
                match serde_json::from_str::<ReactionData>(&json) {
                    Ok(data) => Some(data.render()),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring malformed reaction data");
                        None
                    }
                }
            } else {
                scheme.attribute("data-reaction").and_then(|reaction| {
                    render_reaction(&reaction, scheme.attribute("data-conditions").as_deref())
                })
            };

            if let Some(html) = html {
                scheme.set_inner_html(&html);
                rendered += 1;
            }
        }

        rendered
    }
}

/// `img[data-src]`: swaps in the real source
#[derive(Debug, Default)]
pub struct LazyImages;

impl Behavior for LazyImages {
    fn name(&self) -> &'static str {
        "lazy-images"
    }

    fn activate(&self, container: &dyn Element) -> usize {
        let images = container.query_all("img[data-src]");
        for img in &images {
            if let Some(src) = img.attribute("data-src").filter(|s| !s.is_empty()) {
                img.set_attribute("src", &src);
            }
            img.remove_attribute("data-src");
            img.add_class("loaded");
        }
        images.len()
    }
}
