//! # Organic Chem Router
//!
//! A zero-dependency route table for the lesson site's client. A browser
//! pathname resolves to exactly one page kind:
//!
//! - Home (`/`)
//! - Lesson (`/lessons/:topic`)
//! - About (`/about`)
//! - Contact (`/contact`)
//! - Generic page (`/:page`, any other path)
//!
//! ## Path Normalization
//!
//! - Deployment base prefix: `/site/about` → `/about`
//! - Static-host suffix: `/about.html` → `/about`
//! - Trailing slashes: `/about/` → `/about`
//! - Empty paths: `""` → `/`
//!
//! Resolution is a pure function of the pathname, so
//! `resolve(&normalize_path(p)) == resolve(p)` for every `p`.
//!
//! ## Example
//!
//! ```
//! use orgchem_router::{resolve, Page, RouteKind};
//!
//! let route_match = resolve("/lessons/alcohols/");
//! assert_eq!(route_match.kind(), RouteKind::Lesson);
//! assert_eq!(route_match.param("topic"), Some("alcohols"));
//! assert_eq!(route_match.page, Page::Lesson { topic: "alcohols".to_string() });
//! ```

use std::collections::HashMap;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod path;

pub use path::{is_normalized, normalize_path, strip_base};

/// Path prefix shared by every lesson route
pub const LESSONS_PREFIX: &str = "/lessons/";

// ============================================================================
// Core Types
// ============================================================================

/// Closed set of page categories the router dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Home,
    Lesson,
    About,
    Contact,
    Generic,
}

impl RouteKind {
    /// Stable lowercase name, used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Home => "home",
            RouteKind::Lesson => "lesson",
            RouteKind::About => "about",
            RouteKind::Contact => "contact",
            RouteKind::Generic => "page",
        }
    }
}

impl std::fmt::Display for RouteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A static route: its pattern and the page kind it yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// URL pattern like "/lessons/:topic"
    pub pattern: &'static str,
    /// Page kind produced by this route
    pub kind: RouteKind,
}

/// The site's routes in precedence order
///
/// Generic is the catch-all and must stay last.
pub static ROUTES: [Route; 5] = [
    Route { pattern: "/", kind: RouteKind::Home },
    Route { pattern: "/lessons/:topic", kind: RouteKind::Lesson },
    Route { pattern: "/about", kind: RouteKind::About },
    Route { pattern: "/contact", kind: RouteKind::Contact },
    Route { pattern: "/:page", kind: RouteKind::Generic },
];

/// A resolved page together with the data its kind carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Home,
    Lesson { topic: String },
    About,
    Contact,
    Generic { page_name: String },
}

impl Page {
    /// The kind tag of this page
    pub fn kind(&self) -> RouteKind {
        match self {
            Page::Home => RouteKind::Home,
            Page::Lesson { .. } => RouteKind::Lesson,
            Page::About => RouteKind::About,
            Page::Contact => RouteKind::Contact,
            Page::Generic { .. } => RouteKind::Generic,
        }
    }

    /// Topic id for lesson pages
    pub fn topic(&self) -> Option<&str> {
        match self {
            Page::Lesson { topic } => Some(topic),
            _ => None,
        }
    }
}

/// Result of resolving a pathname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Normalized application path
    pub path: String,
    /// The resolved page
    pub page: Page,
    /// Extracted parameters (`topic` for lessons, `page` for generic pages)
    pub params: HashMap<String, String>,
}

impl RouteMatch {
    /// Page kind of this match
    pub fn kind(&self) -> RouteKind {
        self.page.kind()
    }

    /// The static route that produced this match
    pub fn route(&self) -> &'static Route {
        let kind = self.kind();
        ROUTES
            .iter()
            .find(|route| route.kind == kind)
            .unwrap_or(&ROUTES[ROUTES.len() - 1])
    }

    /// Looks up an extracted parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Whether this match is a lesson page
    pub fn is_lesson(&self) -> bool {
        self.kind() == RouteKind::Lesson
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolves an application path (no deployment base) to its page
///
/// Checked in precedence order: exact `/`, prefix `/lessons/`, exact
/// `/about`, exact `/contact`, then generic. A lesson path with an empty
/// topic segment (`/lessons//x`) falls through to generic.
///
/// # Examples
///
/// ```
/// use orgchem_router::{resolve, RouteKind};
///
/// assert_eq!(resolve("/").kind(), RouteKind::Home);
/// assert_eq!(resolve("/about.html").kind(), RouteKind::About);
///
/// let m = resolve("/privacy/policy");
/// assert_eq!(m.kind(), RouteKind::Generic);
/// assert_eq!(m.param("page"), Some("privacy/policy"));
/// ```
pub fn resolve(path: &str) -> RouteMatch {
    let path = normalize_path(path).into_owned();
    let mut params = HashMap::new();

    let page = if path == "/" {
        Page::Home
    } else if let Some(topic) = lesson_topic(&path) {
        params.insert("topic".to_string(), topic.to_string());
        Page::Lesson {
            topic: topic.to_string(),
        }
    } else if path == "/about" {
        Page::About
    } else if path == "/contact" {
        Page::Contact
    } else {
        let page_name = path.trim_start_matches('/').to_string();
        params.insert("page".to_string(), page_name.clone());
        Page::Generic { page_name }
    };

    RouteMatch { path, page, params }
}

/// Segment following `/lessons/`, if non-empty
fn lesson_topic(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(LESSONS_PREFIX)?;
    let topic = rest.split('/').next().unwrap_or("");
    (!topic.is_empty()).then_some(topic)
}

/// Builds the application path of a lesson
///
/// ```
/// assert_eq!(orgchem_router::lesson_path("ethers"), "/lessons/ethers");
/// ```
pub fn lesson_path(topic: &str) -> String {
    format!("{}{}", LESSONS_PREFIX, topic)
}

// ============================================================================
// Route Table
// ============================================================================

/// Route table bound to a deployment base path
///
/// The table itself is immutable; it only adds base-prefix handling on top
/// of [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    base_path: String,
}

impl RouteTable {
    /// Creates a table for a site served at the host root
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table for a site served under `base_path`
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// The configured base prefix
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// The static routes, in precedence order
    pub fn routes(&self) -> &'static [Route] {
        &ROUTES
    }

    /// Converts a browser pathname into a normalized application path
    ///
    /// ```
    /// use orgchem_router::RouteTable;
    ///
    /// let table = RouteTable::with_base_path("/chem");
    /// assert_eq!(table.app_path("/chem/lessons/ketones.html"), "/lessons/ketones");
    /// assert_eq!(table.app_path("/chem/"), "/");
    /// ```
    pub fn app_path(&self, pathname: &str) -> String {
        normalize_path(strip_base(pathname, &self.base_path)).into_owned()
    }

    /// Resolves a browser pathname
    pub fn resolve(&self, pathname: &str) -> RouteMatch {
        resolve(&self.app_path(pathname))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_topic_segment() {
        assert_eq!(lesson_topic("/lessons/alcohols"), Some("alcohols"));
        assert_eq!(lesson_topic("/lessons/alcohols/extra"), Some("alcohols"));
        assert_eq!(lesson_topic("/lessons/"), None);
        assert_eq!(lesson_topic("/lessons"), None);
    }

    #[test]
    fn test_route_lookup_by_kind() {
        assert_eq!(resolve("/").route().pattern, "/");
        assert_eq!(resolve("/lessons/amines").route().pattern, "/lessons/:topic");
        assert_eq!(resolve("/faq").route().pattern, "/:page");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RouteKind::Generic.to_string(), "page");
        assert_eq!(RouteKind::Lesson.as_str(), "lesson");
    }
}
