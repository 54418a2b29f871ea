//! Organic Chem Resources site client
//!
//! A client-side router and template engine for a static chemistry lesson
//! site. Every page is assembled from fragments fetched at runtime:
//!
//! - `templates/<name>.html` for the header, footer, lesson layout and
//!   sidebar skeleton
//! - `content/pages/<name>.html` for home, about, contact and generic pages
//! - `content/lessons/<topic>/content.html` and `sidebar.json` for lessons
//!
//! The browser is reached only through ports ([`dom::Document`],
//! [`dom::History`], [`fetch::Fetcher`], [`storage::KeyValueStore`],
//! [`timer::Timer`]), so the same application runs in the browser and
//! headlessly against the in-memory backends.
//!
//! ```no_run
//! use orgchem::{App, Platform, SiteConfig};
//! use orgchem::dom::{MemoryDocument, MemoryHistory};
//! use orgchem::fetch::FsFetcher;
//! use orgchem::storage::MemoryStore;
//! use orgchem::timer::TokioTimer;
//! use std::rc::Rc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let platform = Platform {
//!     document: Rc::new(MemoryDocument::parse(r#"<div id="app"></div>"#)),
//!     history: Rc::new(MemoryHistory::new("/lessons/alcohols")),
//!     fetcher: Rc::new(FsFetcher::new("site")),
//!     store: Rc::new(MemoryStore::new()),
//!     timer: Rc::new(TokioTimer),
//! };
//! let app = App::new(platform, SiteConfig::default())?;
//! app.init().await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod behaviors;
pub mod config;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod lesson;
pub mod reaction;
pub mod router;
pub mod scripts;
pub mod sidebar;
pub mod storage;
pub mod template;
pub mod theme;
pub mod timer;
pub mod topics;

pub use app::{App, Platform};
pub use config::SiteConfig;
pub use error::{AppError, ConfigError, FetchError, RouteError};
pub use router::{KeyPress, LinkClick, NavigationState, Phase, Router};
pub use topics::{Topic, TopicRegistry};

pub use orgchem_router as routes;
