/// Path utilities for the site's URL surface
///
/// All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

/// Suffix served by static hosts for page files
const HTML_SUFFIX: &str = ".html";

/// Checks if a path is already in application form
///
/// **Pure function**: No side effects, deterministic output.
///
/// # Rules
///
/// - Must not be empty
/// - Must not end with `.html`
/// - Must not end with `/` (except root `/`)
///
/// # Examples
///
/// ```
/// use orgchem_router::path::is_normalized;
///
/// assert!(is_normalized("/"));
/// assert!(is_normalized("/about"));
/// assert!(is_normalized("/lessons/alcohols"));
///
/// assert!(!is_normalized(""));
/// assert!(!is_normalized("/about/"));
/// assert!(!is_normalized("/about.html"));
/// ```
pub fn is_normalized(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }

    if path == "/" {
        return true;
    }

    !path.ends_with('/') && !path.ends_with(HTML_SUFFIX)
}

/// Normalize a pathname to application form
///
/// Returns `Cow::Borrowed` when the input is already normalized.
///
/// # Rules
///
/// - Trailing `.html`: `/about.html` → `/about`
/// - Trailing slash: `/about/` → `/about`
/// - Empty result: `""` → `/`
///
/// Suffix stripping repeats until the path is stable, so the function is
/// idempotent: `normalize_path(&normalize_path(p)) == normalize_path(p)`.
///
/// # Examples
///
/// ```
/// use orgchem_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// let path = normalize_path("/about");
/// assert!(matches!(path, Cow::Borrowed("/about")));
///
/// assert_eq!(normalize_path("/about.html"), "/about");
/// assert_eq!(normalize_path("/lessons/alcohols/"), "/lessons/alcohols");
/// assert_eq!(normalize_path("/index.html/"), "/index");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_normalized(path) {
        return Cow::Borrowed(path);
    }

    let mut current = path;
    loop {
        let stripped = current
            .strip_suffix(HTML_SUFFIX)
            .or_else(|| current.strip_suffix('/'));

        match stripped {
            Some(rest) => current = rest,
            None => break,
        }
    }

    if current.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Borrowed(current)
    }
}

/// Remove a deployment base prefix from a browser pathname
///
/// The prefix only matches on a segment boundary, so `/site` strips from
/// `/site/about` but not from `/sitemap`. An empty base is a no-op.
///
/// # Examples
///
/// ```
/// use orgchem_router::path::strip_base;
///
/// assert_eq!(strip_base("/site/about", "/site"), "/about");
/// assert_eq!(strip_base("/site", "/site"), "");
/// assert_eq!(strip_base("/sitemap", "/site"), "/sitemap");
/// assert_eq!(strip_base("/about", ""), "/about");
/// ```
pub fn strip_base<'a>(path: &'a str, base: &str) -> &'a str {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return path;
    }

    match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}
