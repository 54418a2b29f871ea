// File: src/app.rs
// Purpose: Application context owning the router, controllers and regions

use crate::behaviors::{LazyImages, ReactionSchemes, ThemeToggles};
use crate::config::SiteConfig;
use crate::dom::{Document, Element, ElementRef, History, InsertPosition};
use crate::error::{AppError, RouteError};
use crate::fetch::Fetcher;
use crate::router::{Regions, Router};
use crate::scripts::Reactivator;
use crate::sidebar::SidebarController;
use crate::storage::KeyValueStore;
use crate::template::{TemplateLoader, TemplateVars};
use crate::theme::ThemeController;
use crate::timer::Timer;
use std::cell::Cell;
use std::rc::Rc;

/// Markup shown in `#app` when initialization fails
pub const APP_ERROR_HTML: &str = r#"<div class="error-state"><h2>Application Error</h2><p>Failed to initialize the application. Please refresh the page.</p></div>"#;

/// The platform services the application runs on
#[derive(Clone)]
pub struct Platform {
    pub document: Rc<dyn Document>,
    pub history: Rc<dyn History>,
    pub fetcher: Rc<dyn Fetcher>,
    pub store: Rc<dyn KeyValueStore>,
    pub timer: Rc<dyn Timer>,
}

/// The single application context
///
/// Owns the router, the sidebar and theme controllers and the reactivator.
/// Regions of `#app` are created here once and handed to the router.
pub struct App {
    platform: Platform,
    config: Rc<SiteConfig>,
    header: ElementRef,
    templates: TemplateLoader,
    theme: Rc<ThemeController>,
    sidebar: Rc<SidebarController>,
    reactivator: Rc<Reactivator>,
    router: Router,
    initialized: Cell<bool>,
}

impl App {
    pub fn new(platform: Platform, config: SiteConfig) -> Result<Rc<Self>, AppError> {
        let config = Rc::new(config);
        let document = Rc::clone(&platform.document);

        let app = document.query("#app").ok_or(AppError::AppContainerMissing)?;
        let header = region(app.as_ref(), "header-container", InsertPosition::AfterBegin)?;
        let content = region(app.as_ref(), "content-container", InsertPosition::BeforeEnd)?;
        let footer = region(app.as_ref(), "footer-container", InsertPosition::BeforeEnd)?;

        let theme = Rc::new(ThemeController::new(
            Rc::clone(&document),
            Rc::clone(&platform.store),
        ));
        let sidebar = SidebarController::new(Rc::clone(&platform.store));

        let reactivator = Rc::new(Reactivator::new(Rc::clone(&document)));
        reactivator.register(Rc::new(ThemeToggles::new(Rc::clone(&theme))));
        reactivator.register(Rc::new(ReactionSchemes));
        reactivator.register(Rc::new(LazyImages));

        let templates = TemplateLoader::new(
            Rc::clone(&platform.fetcher),
            Rc::clone(&platform.timer),
            Rc::clone(&reactivator),
            Rc::clone(&config),
        );

        let router = Router::new(
            &platform,
            Rc::clone(&config),
            Regions { content, footer },
            Rc::clone(&reactivator),
            Rc::clone(&sidebar),
        );

        Ok(Rc::new(Self {
            platform,
            config,
            header,
            templates,
            theme,
            sidebar,
            reactivator,
            router,
            initialized: Cell::new(false),
        }))
    }

    /// Loads the header, routes the current path and restores preferences
    ///
    /// Runs once; later calls return immediately.
    pub async fn init(&self) -> Result<(), AppError> {
        if self.initialized.replace(true) {
            return Ok(());
        }

        tracing::info!(
            base_path = %self.config.site.base_path,
            fetcher = self.platform.fetcher.name(),
            store = self.platform.store.name(),
            "initializing application"
        );

        match self.try_init().await {
            Ok(()) => {
                tracing::info!("application initialized");
                Ok(())
            }
            Err(AppError::Route(RouteError::Superseded)) => Ok(()),
            Err(AppError::Route(e)) => {
                // The router already showed its error page
                tracing::error!(error = %e, "initial route failed");
                Err(AppError::Route(e))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize application");
                render_app_error(self.platform.document.as_ref());
                Err(e)
            }
        }
    }

    async fn try_init(&self) -> Result<(), AppError> {
        if let Some(loading) = self.platform.document.query(".initial-loading") {
            loading.set_style("display", "none");
        }

        if let Err(e) = self
            .templates
            .load("header", self.header.as_ref(), &TemplateVars::new())
            .await
        {
            tracing::warn!(error = %e, "using fallback header");
        }

        let routed = self.router.start().await;
        self.theme.restore();
        Ok(routed?)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn theme(&self) -> &Rc<ThemeController> {
        &self.theme
    }

    pub fn sidebar(&self) -> &Rc<SidebarController> {
        &self.sidebar
    }

    pub fn reactivator(&self) -> &Rc<Reactivator> {
        &self.reactivator
    }

    pub fn templates(&self) -> &TemplateLoader {
        &self.templates
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn header(&self) -> &ElementRef {
        &self.header
    }
}

/// Finds `#id` inside `app`, creating it at `position` if missing
fn region(app: &dyn Element, id: &'static str, position: InsertPosition) -> Result<ElementRef, AppError> {
    let selector = format!("#{}", id);
    if let Some(existing) = app.query(&selector) {
        return Ok(existing);
    }

    app.insert_html(position, &format!(r#"<div id="{}"></div>"#, id));
    app.query(&selector).ok_or(AppError::Region(id))
}

/// Puts the "Application Error" state into `#app`, or the body without one
pub fn render_app_error(document: &dyn Document) {
    let target = document.query("#app").unwrap_or_else(|| document.body());
    target.set_inner_html(APP_ERROR_HTML);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, MemoryHistory};
    use crate::fetch::MemoryFetcher;
    use crate::storage::MemoryStore;
    use crate::timer::ImmediateTimer;
    use pretty_assertions::assert_eq;

    fn platform(document: Rc<MemoryDocument>, fetcher: MemoryFetcher) -> Platform {
        Platform {
            document,
            history: Rc::new(MemoryHistory::new("/")),
            fetcher: Rc::new(fetcher),
            store: Rc::new(MemoryStore::new()),
            timer: Rc::new(ImmediateTimer),
        }
    }

    #[test]
    fn test_new_requires_app() {
        let doc = Rc::new(MemoryDocument::parse("<main></main>"));
        let result = App::new(platform(doc, MemoryFetcher::new()), SiteConfig::default());
        assert!(matches!(result, Err(AppError::AppContainerMissing)));
    }

    #[test]
    fn test_regions_created_in_order() {
        let doc = Rc::new(MemoryDocument::parse(r#"<div id="app"><p class="initial-loading">Loading</p></div>"#));
        let _app = App::new(platform(doc.clone(), MemoryFetcher::new()), SiteConfig::default()).unwrap();

        let ids: Vec<String> = doc
            .query_all("#app > div")
            .iter()
            .filter_map(|el| el.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["header-container", "content-container", "footer-container"]);
    }

    #[test]
    fn test_render_app_error() {
        let doc = MemoryDocument::parse(r#"<div id="app"><p>old</p></div>"#);
        render_app_error(&doc);
        assert_eq!(doc.query("#app h2").unwrap().text_content(), "Application Error");

        let bare = MemoryDocument::parse("<main></main>");
        render_app_error(&bare);
        assert!(bare.query("main").is_none());
        assert!(bare.body().inner_html().contains("Application Error"));
    }

    #[test]
    fn test_existing_regions_reused() {
        let doc = Rc::new(MemoryDocument::parse(r#"<div id="app"><div id="content-container">x</div></div>"#));
        let _app = App::new(platform(doc.clone(), MemoryFetcher::new()), SiteConfig::default()).unwrap();
        assert_eq!(doc.query_all("#content-container").len(), 1);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let doc = Rc::new(MemoryDocument::parse(r#"<div id="app"></div>"#));
        let fetcher = MemoryFetcher::new()
            .with("/templates/header.html", "<header>H</header>")
            .with("/content/pages/home-content.html", "<h1>Home</h1>");
        let platform = platform(doc.clone(), fetcher);
        let app = App::new(platform.clone(), SiteConfig::default()).unwrap();

        app.init().await.unwrap();
        app.init().await.unwrap();
        assert!(app.is_initialized());
        assert_eq!(doc.query_all("#header-container header").len(), 1);
    }
}
