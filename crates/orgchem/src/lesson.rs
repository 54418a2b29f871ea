//! Lesson page widgets
//!
//! Table of contents from `sidebar.json`, previous/next topic controls and
//! the progress indicator. Markup builders are pure; the `apply_*`
//! functions write them into the page.

use crate::dom::{Document, Element, InsertPosition};
use crate::topics::{Adjacency, Progress, Topic};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Offset kept above a heading scrolled to from the table of contents
pub const SCROLL_OFFSET_PX: i32 = 100;

/// Contents of `content/lessons/<topic>/sidebar.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarData {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
}

impl SidebarData {
    /// Every anchor id the table of contents links to, in order
    pub fn anchor_ids(&self) -> Vec<&str> {
        self.chapters
            .iter()
            .flat_map(|chapter| {
                std::iter::once(chapter.id.as_str())
                    .chain(chapter.sections.iter().map(|s| s.id.as_str()))
            })
            .collect()
    }
}

// ============================================================================
// Sidebar
// ============================================================================

/// Table of contents markup
pub fn render_toc(data: &SidebarData) -> String {
    let mut html = String::from(r#"<ul class="chapter-list">"#);

    for (index, chapter) in data.chapters.iter().enumerate() {
        html.push_str(&format!(
            r##"<li class="chapter-item"><a href="#{}" class="chapter-link" data-scroll><span class="chapter-number">{}.</span> {}</a>"##,
            chapter.id,
            index + 1,
            chapter.title
        ));

        if !chapter.sections.is_empty() {
            html.push_str(r#"<ul class="sub-chapter-list">"#);
            for section in &chapter.sections {
                html.push_str(&format!(
                    r##"<li class="sub-chapter-item"><a href="#{}" class="sub-chapter-link" data-scroll>{}</a></li>"##,
                    section.id, section.title
                ));
            }
            html.push_str("</ul>");
        }

        html.push_str("</li>");
    }

    html.push_str("</ul>");
    html
}

/// Placeholder shown when a lesson has no `sidebar.json`
pub fn default_sidebar_html() -> &'static str {
    r#"<div class="default-sidebar"><p>Table of contents will be generated from lesson content.</p><p>Create a <code>sidebar.json</code> file for custom navigation.</p></div>"#
}

/// Fills the sidebar header and table of contents
///
/// Returns false when the sidebar has no `#sidebar-nav`.
pub fn apply_sidebar_data(document: &Rc<dyn Document>, sidebar: &dyn Element, data: &SidebarData) -> bool {
    if let (Some(icon), Some(color)) = (sidebar.query("#topic-icon"), data.color.as_deref()) {
        icon.set_style("background-color", color);
        icon.set_text_content(&data.title.chars().take(1).collect::<String>());
    }
    if let Some(title) = sidebar.query("#lesson-title") {
        title.set_text_content(&data.title);
    }
    if let Some(subtitle) = sidebar.query("#lesson-subtitle") {
        subtitle.set_text_content(&data.subtitle);
    }

    let Some(nav) = sidebar.query("#sidebar-nav") else {
        return false;
    };
    nav.set_inner_html(&render_toc(data));
    wire_scroll_links(document, nav.as_ref());
    true
}

/// Puts the default placeholder into `#sidebar-nav`
pub fn apply_default_sidebar(sidebar: &dyn Element) -> bool {
    match sidebar.query("#sidebar-nav") {
        Some(nav) => {
            nav.set_inner_html(default_sidebar_html());
            true
        }
        None => false,
    }
}

/// Makes `[data-scroll]` links scroll to their anchor
pub fn wire_scroll_links(document: &Rc<dyn Document>, container: &dyn Element) -> usize {
    let links = container.query_all("[data-scroll]");
    for link in &links {
        let Some(target) = link
            .attribute("href")
            .and_then(|href| href.strip_prefix('#').map(str::to_string))
        else {
            continue;
        };

        let document = Rc::downgrade(document);
        link.on_click(Rc::new(move || {
            if let Some(document) = document.upgrade() {
                if !document.scroll_to_anchor(&target, SCROLL_OFFSET_PX) {
                    tracing::debug!(anchor = %target, "scroll target missing");
                }
            }
        }));
    }
    links.len()
}

// ============================================================================
// Topic Navigation
// ============================================================================

/// Inner markup of an enabled previous-topic control
pub fn previous_link_html(topic: &Topic) -> String {
    format!(
        r#"<i class="fas fa-arrow-left"></i><span class="nav-topic-name">{}</span><span class="nav-topic-hint">Previous</span>"#,
        topic.title
    )
}

/// Inner markup of an enabled next-topic control
pub fn next_link_html(topic: &Topic) -> String {
    format!(
        r#"<span class="nav-topic-hint">Next</span><span class="nav-topic-name">{}</span><i class="fas fa-arrow-right"></i>"#,
        topic.title
    )
}

/// Progress bar and caption
pub fn progress_html(progress: Progress) -> String {
    format!(
        r#"<div class="progress-bar"><div class="progress-fill" style="width: {}%"></div></div><div class="progress-text">Topic {} of {}</div>"#,
        progress.percent(),
        progress.number,
        progress.count
    )
}

pub const KEYBOARD_HINT_HTML: &str =
    r#"<div class="keyboard-hint">Navigate with <kbd>←</kbd> <kbd>→</kbd> arrow keys</div>"#;

fn enable(control: &dyn Element, topic: &Topic, inner: String) {
    control.set_attribute("href", &topic.path());
    control.set_inner_html(&inner);
    control.remove_class("disabled");
    control.set_style("opacity", "1");
    control.set_style("pointer-events", "auto");
}

fn disable(control: &dyn Element) {
    control.add_class("disabled");
    control.set_style("opacity", "0.5");
    control.set_style("pointer-events", "none");
}

/// Wires `#prev-lesson`, `#next-lesson`, `#lesson-progress` and the
/// keyboard hint for the current topic
pub fn apply_topic_navigation(document: &dyn Document, adjacency: Adjacency<'_>, progress: Option<Progress>) {
    if let Some(prev) = document.query("#prev-lesson") {
        match adjacency.previous {
            Some(topic) => enable(prev.as_ref(), topic, previous_link_html(topic)),
            None => disable(prev.as_ref()),
        }
    }

    if let Some(next) = document.query("#next-lesson") {
        match adjacency.next {
            Some(topic) => enable(next.as_ref(), topic, next_link_html(topic)),
            None => disable(next.as_ref()),
        }
    }

    if let (Some(element), Some(progress)) = (document.query("#lesson-progress"), progress) {
        element.set_inner_html(&progress_html(progress));
    }

    if adjacency.has_neighbour() && document.query(".keyboard-hint").is_none() {
        if let Some(navigation) = document.query(".content-navigation") {
            navigation.insert_html(InsertPosition::AfterEnd, KEYBOARD_HINT_HTML);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use crate::topics::TopicRegistry;
    use pretty_assertions::assert_eq;

    fn sample() -> SidebarData {
        serde_json::from_str(
            r##"{
                "title": "Alcohols",
                "subtitle": "Preparation and properties",
                "color": "#00cec9",
                "chapters": [
                    {"id": "intro", "title": "Introduction"},
                    {"id": "prep", "title": "Preparation", "sections": [
                        {"id": "from-alkenes", "title": "From alkenes"}
                    ]}
                ]
            }"##,
        )
        .unwrap()
    }

    const SIDEBAR: &str = r#"<aside class="sidebar"><div id="topic-icon" class="topic-icon"></div><h3 id="lesson-title"></h3><p id="lesson-subtitle"></p><nav id="sidebar-nav"></nav></aside><h2 id="prep">Preparation</h2>"#;

    #[test]
    fn test_render_toc() {
        let html = render_toc(&sample());
        assert!(html.starts_with(r##"<ul class="chapter-list"><li class="chapter-item"><a href="#intro" class="chapter-link" data-scroll><span class="chapter-number">1.</span> Introduction</a></li>"##));
        assert!(html.contains(r#"<span class="chapter-number">2.</span> Preparation"#));
        assert!(html.contains(r##"<ul class="sub-chapter-list"><li class="sub-chapter-item"><a href="#from-alkenes" class="sub-chapter-link" data-scroll>From alkenes</a></li></ul>"##));
    }

    #[test]
    fn test_anchor_ids() {
        assert_eq!(sample().anchor_ids(), vec!["intro", "prep", "from-alkenes"]);
    }

    #[test]
    fn test_apply_sidebar_data() {
        let memory = Rc::new(MemoryDocument::parse(SIDEBAR));
        let document: Rc<dyn Document> = memory.clone();
        let sidebar = document.query(".sidebar").unwrap();

        assert!(apply_sidebar_data(&document, sidebar.as_ref(), &sample()));

        let icon = document.query("#topic-icon").unwrap();
        assert_eq!(icon.style("background-color").as_deref(), Some("#00cec9"));
        assert_eq!(icon.text_content(), "A");
        assert_eq!(document.query("#lesson-subtitle").unwrap().text_content(), "Preparation and properties");
        assert_eq!(document.query_all("#sidebar-nav [data-scroll]").len(), 3);

        document.query(r##"a[href="#prep"]"##).unwrap().click();
        assert_eq!(memory.last_anchor().as_deref(), Some("prep"));
    }

    #[test]
    fn test_default_sidebar() {
        let doc = MemoryDocument::parse(SIDEBAR);
        let sidebar = doc.query(".sidebar").unwrap();
        assert!(apply_default_sidebar(sidebar.as_ref()));
        assert!(doc.query("#sidebar-nav .default-sidebar").is_some());
    }

    const NAV: &str = r#"<div class="content-navigation"><a id="prev-lesson" data-link></a><a id="next-lesson" data-link></a></div><div id="lesson-progress"></div>"#;

    #[test]
    fn test_topic_navigation_middle() {
        let registry = TopicRegistry::builtin();
        let doc = MemoryDocument::parse(NAV);
        apply_topic_navigation(&doc, registry.adjacency("alcohols"), registry.progress("alcohols"));

        let prev = doc.query("#prev-lesson").unwrap();
        assert_eq!(prev.attribute("href").as_deref(), Some("/lessons/haloarenes"));
        assert_eq!(doc.query("#prev-lesson .nav-topic-name").unwrap().text_content(), "HaloArenes");
        assert_eq!(prev.style("pointer-events").as_deref(), Some("auto"));

        let next = doc.query("#next-lesson").unwrap();
        assert_eq!(next.attribute("href").as_deref(), Some("/lessons/phenols"));
        assert_eq!(doc.query("#next-lesson .nav-topic-hint").unwrap().text_content(), "Next");

        assert_eq!(doc.query(".progress-text").unwrap().text_content(), "Topic 3 of 9");
        assert_eq!(doc.query_all(".keyboard-hint").len(), 1);

        apply_topic_navigation(&doc, registry.adjacency("phenols"), registry.progress("phenols"));
        assert_eq!(doc.query_all(".keyboard-hint").len(), 1);
    }

    #[test]
    fn test_topic_navigation_edges() {
        let registry = TopicRegistry::builtin();
        let doc = MemoryDocument::parse(NAV);
        apply_topic_navigation(&doc, registry.adjacency("haloalkanes"), registry.progress("haloalkanes"));

        let prev = doc.query("#prev-lesson").unwrap();
        assert!(prev.has_class("disabled"));
        assert_eq!(prev.style("opacity").as_deref(), Some("0.5"));
        assert_eq!(prev.style("pointer-events").as_deref(), Some("none"));
        assert_eq!(
            doc.query("#next-lesson").unwrap().attribute("href").as_deref(),
            Some("/lessons/haloarenes")
        );
    }

    #[test]
    fn test_unknown_topic_disables_both() {
        let registry = TopicRegistry::builtin();
        let doc = MemoryDocument::parse(NAV);
        apply_topic_navigation(&doc, registry.adjacency("nitriles"), registry.progress("nitriles"));

        assert!(doc.query("#prev-lesson").unwrap().has_class("disabled"));
        assert!(doc.query("#next-lesson").unwrap().has_class("disabled"));
        assert_eq!(doc.query("#lesson-progress").unwrap().inner_html(), "");
        assert!(doc.query(".keyboard-hint").is_none());
    }

    #[test]
    fn test_progress_width() {
        let html = progress_html(Progress { number: 9, count: 9 });
        assert!(html.contains("width: 100%"));
    }
}
