//! Router core
//!
//! Decides what occupies the content region for the current pathname and
//! drives the route-handling sequence:
//!
//! 1. Hide the initial loading placeholder
//! 2. Fetch and splice the page fragment (or, for lessons, the layout,
//!    sidebar, lesson content, table of contents and topic navigation)
//! 3. Load the footer
//! 4. Mark the active `[data-link]` elements
//!
//! Any failure of a required step replaces the content region with the
//! fixed "Page Not Found" fragment.
//!
//! ## Overlapping navigations
//!
//! Every navigation takes a new generation number. After each suspension
//! point the sequence checks that its generation is still the latest; a
//! stale sequence stops with [`RouteError::Superseded`] without touching
//! the page, so the last navigation wins.

use crate::app::Platform;
use crate::config::SiteConfig;
use crate::dom::{Document, Element, ElementRef, History};
use crate::error::RouteError;
use crate::fetch::{fetch_text, FetchResponse, Fetcher};
use crate::lesson::{apply_default_sidebar, apply_sidebar_data, apply_topic_navigation, SidebarData};
use crate::scripts::Reactivator;
use crate::sidebar::{SidebarController, SidebarNodes};
use crate::template::Partials;
use crate::timer::Timer;
use crate::topics::TopicRegistry;
use orgchem_router::{Page, RouteMatch, RouteTable};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Fixed markup shown when a route fails, linking back to `home`
pub fn error_page_html(home: &str) -> String {
    format!(
        r#"<div class="error-state"><h2>Page Not Found</h2><p>The requested content could not be loaded.</p><a href="{}" data-link class="error-link">Return to Homepage</a></div>"#,
        home
    )
}

/// Candidates for the on-page lesson heading, in order
pub const TITLE_SELECTORS: [&str; 5] = [
    ".content-title",
    "#content-title",
    "h1.content-title",
    ".lesson-content h1",
    "h1",
];

const LESSON_LAYOUT_TEMPLATE: &str = "lesson-layout";
const SIDEBAR_TEMPLATE: &str = "sidebar-template";
const FOOTER_TEMPLATE: &str = "footer";

// ============================================================================
// State
// ============================================================================

/// Phase of the latest navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// What the router currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationState {
    pub current_path: String,
    pub current_topic: Option<String>,
    pub phase: Phase,
    pub generation: u64,
}

/// Regions of `#app` the router writes to
#[derive(Clone)]
pub struct Regions {
    pub content: ElementRef,
    pub footer: ElementRef,
}

/// A key press, as far as navigation cares
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyPress {
    /// A key pressed without modifiers
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn has_modifier(&self) -> bool {
        self.ctrl || self.meta || self.alt || self.shift
    }
}

/// A click on an `a[data-link]` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClick {
    pub href: Option<String>,
    /// Mouse button; 0 is the primary button
    pub button: i16,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl LinkClick {
    /// A plain primary-button click
    pub fn primary(href: &str) -> Self {
        Self {
            href: Some(href.to_string()),
            ..Self::default()
        }
    }
}

/// Ties a route-handling sequence to its generation
struct Guard<'a> {
    current: &'a Cell<u64>,
    generation: u64,
}

impl Guard<'_> {
    fn is_current(&self) -> bool {
        self.current.get() == self.generation
    }

    fn check(&self) -> Result<(), RouteError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(RouteError::Superseded)
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub struct Router {
    document: Rc<dyn Document>,
    history: Rc<dyn History>,
    fetcher: Rc<dyn Fetcher>,
    timer: Rc<dyn Timer>,
    reactivator: Rc<Reactivator>,
    partials: Partials,
    sidebar: Rc<SidebarController>,
    topics: TopicRegistry,
    table: RouteTable,
    config: Rc<SiteConfig>,
    regions: Regions,
    generation: Cell<u64>,
    state: RefCell<NavigationState>,
}

impl Router {
    pub fn new(
        platform: &Platform,
        config: Rc<SiteConfig>,
        regions: Regions,
        reactivator: Rc<Reactivator>,
        sidebar: Rc<SidebarController>,
    ) -> Self {
        Self {
            document: Rc::clone(&platform.document),
            history: Rc::clone(&platform.history),
            fetcher: Rc::clone(&platform.fetcher),
            timer: Rc::clone(&platform.timer),
            reactivator,
            partials: Partials::new(Rc::clone(&platform.fetcher), Rc::clone(&config)),
            sidebar,
            topics: config.topic_registry(),
            table: RouteTable::with_base_path(config.site.base_path.clone()),
            config,
            regions,
            generation: Cell::new(0),
            state: RefCell::new(NavigationState::default()),
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub fn topics(&self) -> &TopicRegistry {
        &self.topics
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Route of the current history entry
    pub fn current_route(&self) -> RouteMatch {
        self.table.resolve(&self.history.current_path())
    }

    /// Routes the current path; called once at startup
    pub async fn start(&self) -> Result<(), RouteError> {
        tracing::info!("router starting");
        self.handle_route().await
    }

    /// Pushes `path` and routes it, then scrolls to the top
    pub async fn navigate(&self, path: &str) -> Result<(), RouteError> {
        self.history.push(&self.history_path(path));
        let result = self.handle_route().await;
        self.document.scroll_to(0);
        result
    }

    /// Back/forward: re-route whatever history now points at
    pub async fn handle_popstate(&self) -> Result<(), RouteError> {
        self.handle_route().await
    }

    /// Path a link click should navigate to, if the router takes it
    pub fn link_target(&self, click: &LinkClick) -> Option<String> {
        if click.button != 0 || click.ctrl || click.meta || click.alt || click.shift {
            return None;
        }
        let href = click.href.as_deref()?;
        if href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//") {
            return None;
        }
        Some(href.to_string())
    }

    /// Lesson a key press moves to, if any
    ///
    /// Only plain ArrowLeft/ArrowRight on a lesson route count; at the
    /// first or last topic there is nowhere to go.
    pub fn key_target(&self, key: &KeyPress) -> Option<String> {
        if key.has_modifier() {
            return None;
        }

        let route = self.current_route();
        let topic = route.page.topic()?;
        let adjacency = self.topics.adjacency(topic);

        let target = match key.key.as_str() {
            "ArrowLeft" => adjacency.previous,
            "ArrowRight" => adjacency.next,
            _ => None,
        }?;
        Some(target.path())
    }

    /// Navigates for a key press; returns whether it was handled
    pub async fn handle_key(&self, key: &KeyPress) -> Result<bool, RouteError> {
        match self.key_target(key) {
            Some(path) => {
                tracing::debug!(key = %key.key, %path, "keyboard navigation");
                self.navigate(&path).await.map(|_| true)
            }
            None => Ok(false),
        }
    }

    /// Runs the route-handling sequence for the current history entry
    pub async fn handle_route(&self) -> Result<(), RouteError> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        let guard = Guard {
            current: &self.generation,
            generation,
        };

        let route = self.current_route();
        *self.state.borrow_mut() = NavigationState {
            current_path: route.path.clone(),
            current_topic: route.page.topic().map(str::to_string),
            phase: Phase::Loading,
            generation,
        };
        tracing::info!(path = %route.path, kind = %route.kind(), generation, "routing");

        self.clear_loading_state();

        match self.render(&route, &guard).await {
            Ok(()) => {
                self.update_active_nav(&route.path);
                self.set_phase(Phase::Ready);
                Ok(())
            }
            Err(RouteError::Superseded) => {
                tracing::debug!(path = %route.path, generation, "navigation superseded");
                Err(RouteError::Superseded)
            }
            Err(e) => {
                tracing::error!(path = %route.path, error = %e, "routing error");
                self.show_error_page();
                self.set_phase(Phase::Error);
                Err(e)
            }
        }
    }

    fn set_phase(&self, phase: Phase) {
        self.state.borrow_mut().phase = phase;
    }

    /// Adds the deployment base to app paths that lack it
    fn history_path(&self, path: &str) -> String {
        let base = self.table.base_path();
        if base.is_empty() || path == base || path.starts_with(&format!("{}/", base)) {
            path.to_string()
        } else {
            self.config.site_url(path)
        }
    }

    fn template_url(&self, name: &str) -> String {
        self.config.site_url(&self.config.paths.template_url(name))
    }

    // ------------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------------

    /// A resource the route cannot do without
    async fn fetch_required(&self, url: &str, guard: &Guard<'_>) -> Result<String, RouteError> {
        let result = fetch_text(self.fetcher.as_ref(), url).await;
        guard.check()?;
        Ok(result?)
    }

    /// A resource with a default; `None` when no response arrived
    async fn fetch_optional(&self, url: &str, guard: &Guard<'_>) -> Result<Option<FetchResponse>, RouteError> {
        let result = self.fetcher.get(url).await;
        guard.check()?;
        match result {
            Ok(response) => Ok(Some(response)),
            Err(e) => {
                tracing::warn!(url, error = %e, "optional resource unavailable");
                Ok(None)
            }
        }
    }

    /// Splices markup, resolves its partials and reactivates it
    async fn splice(&self, container: &dyn Element, html: &str, guard: &Guard<'_>) -> Result<(), RouteError> {
        container.set_inner_html(html);
        self.partials.load(container, &|| guard.is_current()).await?;
        self.reactivator.activate(container);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------------

    async fn render(&self, route: &RouteMatch, guard: &Guard<'_>) -> Result<(), RouteError> {
        match &route.page {
            Page::Lesson { topic } => self.render_lesson(topic, guard).await,
            Page::Home => self.render_page(&self.config.paths.home_page, guard).await,
            Page::About => self.render_page("about", guard).await,
            Page::Contact => self.render_page("contact", guard).await,
            Page::Generic { page_name } => self.render_page(page_name, guard).await,
        }
    }

    async fn render_page(&self, page: &str, guard: &Guard<'_>) -> Result<(), RouteError> {
        self.sidebar.detach();

        let url = self.config.site_url(&self.config.paths.page_url(page));
        let html = self.fetch_required(&url, guard).await?;
        self.splice(self.regions.content.as_ref(), &html, guard).await?;

        self.load_footer(guard).await
    }

    async fn render_lesson(&self, topic: &str, guard: &Guard<'_>) -> Result<(), RouteError> {
        self.sidebar.detach();

        let layout = self
            .fetch_required(&self.template_url(LESSON_LAYOUT_TEMPLATE), guard)
            .await?;
        self.splice(self.regions.content.as_ref(), &layout, guard).await?;

        match self.init_sidebar(guard).await {
            Ok(()) => {}
            Err(RouteError::Superseded) => return Err(RouteError::Superseded),
            Err(e) => tracing::warn!(error = %e, "sidebar not initialized"),
        }

        let content_url = self
            .config
            .site_url(&self.config.paths.lesson_content_url(topic));
        let content = self.fetch_required(&content_url, guard).await?;

        let container = self
            .regions
            .content
            .query(".lesson-content")
            .or_else(|| self.regions.content.query(".content-area"))
            .ok_or_else(|| RouteError::NoLessonContainer {
                topic: topic.to_string(),
            })?;
        self.splice(container.as_ref(), &content, guard).await?;

        self.set_lesson_title(topic);
        self.load_lesson_sidebar(topic, guard).await?;

        apply_topic_navigation(
            self.document.as_ref(),
            self.topics.adjacency(topic),
            self.topics.progress(topic),
        );

        self.load_footer(guard).await?;
        tracing::info!(topic, "lesson loaded");
        Ok(())
    }

    /// Waits for the layout's sidebar, then hands it to the controller
    async fn init_sidebar(&self, guard: &Guard<'_>) -> Result<(), RouteError> {
        let interval = Duration::from_millis(self.config.timing.sidebar_poll_interval_ms);
        let attempts = self.config.timing.sidebar_poll_max_attempts.max(1);

        for attempt in 1..=attempts {
            if let Some(nodes) = SidebarNodes::find(self.document.as_ref()) {
                self.sidebar.attach(nodes);
                self.sidebar.restore();
                tracing::debug!(attempt, "sidebar initialized");
                return Ok(());
            }

            if attempt < attempts {
                self.timer.sleep(interval).await;
                guard.check()?;
            }
        }

        Err(RouteError::NodeMissing {
            selector: ".sidebar, #sidebar-toggle".to_string(),
            attempts,
        })
    }

    fn set_lesson_title(&self, topic: &str) {
        let title = self.topics.title(topic);

        let heading = TITLE_SELECTORS
            .iter()
            .find_map(|selector| self.regions.content.query(selector));
        match heading {
            Some(heading) => heading.set_text_content(&title),
            None => tracing::warn!(topic, "no heading to put the lesson title in"),
        }

        self.document
            .set_title(&format!("{} - {}", title, self.config.site.title_suffix));
    }

    /// Sidebar template plus table of contents; failures are not fatal
    async fn load_lesson_sidebar(&self, topic: &str, guard: &Guard<'_>) -> Result<(), RouteError> {
        let template = match self
            .fetch_optional(&self.template_url(SIDEBAR_TEMPLATE), guard)
            .await?
        {
            Some(response) if response.is_ok() => response.body,
            Some(response) => {
                tracing::warn!(status = response.status, "sidebar template not found, skipping");
                return Ok(());
            }
            None => return Ok(()),
        };

        let Some(sidebar) = self.regions.content.query(".sidebar") else {
            tracing::warn!(topic, "layout has no sidebar");
            return Ok(());
        };
        sidebar.set_inner_html(&template);

        // The template replaced the toggle button and topic icon
        if let Some(nodes) = SidebarNodes::find(self.document.as_ref()) {
            self.sidebar.attach(nodes);
            self.sidebar.restore();
        }

        let data_url = self
            .config
            .site_url(&self.config.paths.lesson_sidebar_url(topic));
        let data = match self.fetch_optional(&data_url, guard).await? {
            Some(response) if response.is_ok() => match response.json::<SidebarData>() {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::warn!(topic, error = %e, "unreadable sidebar.json, using default");
                    None
                }
            },
            _ => {
                tracing::warn!(topic, "no sidebar.json found, using default");
                None
            }
        };

        match data {
            Some(data) => apply_sidebar_data(&self.document, sidebar.as_ref(), &data),
            None => apply_default_sidebar(sidebar.as_ref()),
        };
        Ok(())
    }

    /// Loads the footer template; without one the footer stays empty
    async fn load_footer(&self, guard: &Guard<'_>) -> Result<(), RouteError> {
        let footer = self.regions.footer.as_ref();
        match self
            .fetch_optional(&self.template_url(FOOTER_TEMPLATE), guard)
            .await?
        {
            Some(response) if response.is_ok() => {
                footer.set_inner_html(&response.body);
                self.reactivator.activate(footer);
            }
            Some(response) => {
                tracing::warn!(status = response.status, "could not load footer");
                footer.set_inner_html("");
            }
            None => footer.set_inner_html(""),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Page chrome
    // ------------------------------------------------------------------------

    fn clear_loading_state(&self) {
        if let Some(loading) = self.document.query(".initial-loading") {
            loading.set_style("display", "none");
        }
    }

    fn update_active_nav(&self, path: &str) {
        let prefixed = self.config.site_url(path);
        for link in self.document.query_all("[data-link]") {
            let active = link
                .attribute("href")
                .is_some_and(|href| href == path || href == prefixed);
            link.toggle_class("active", active);
        }
    }

    fn show_error_page(&self) {
        self.sidebar.detach();
        self.regions
            .content
            .set_inner_html(&error_page_html(&self.config.site_url("/")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_modifiers() {
        assert!(!KeyPress::plain("ArrowLeft").has_modifier());
        let shifted = KeyPress {
            shift: true,
            ..KeyPress::plain("ArrowLeft")
        };
        assert!(shifted.has_modifier());
    }

    #[test]
    fn test_error_page_links_home() {
        let html = error_page_html("/chem/");
        assert!(html.contains(r#"<a href="/chem/" data-link class="error-link">Return to Homepage</a>"#));
        assert!(html.contains("Page Not Found"));
    }

    #[test]
    fn test_guard() {
        let current = Cell::new(3);
        let guard = Guard {
            current: &current,
            generation: 3,
        };
        assert!(guard.check().is_ok());
        current.set(4);
        assert_eq!(guard.check(), Err(RouteError::Superseded));
    }
}
