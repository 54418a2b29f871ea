// File: src/template.rs
// Purpose: Fetches named templates and partials and splices them into the page

use crate::config::SiteConfig;
use crate::dom::{Element, InsertPosition};
use crate::error::{FetchError, RouteError};
use crate::fetch::{fetch_text, Fetcher};
use crate::scripts::Reactivator;
use crate::timer::Timer;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// Substitution variables for a template
pub type TemplateVars = HashMap<String, String>;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

/// Replaces `{{key}}` tokens with their values
///
/// Unknown keys are left exactly as written; substitution never fails.
///
/// # Examples
///
/// ```
/// use orgchem::template::{substitute, TemplateVars};
///
/// let mut vars = TemplateVars::new();
/// vars.insert("a".to_string(), "X".to_string());
/// assert_eq!(substitute("{{a}} {{b}}", &vars), "X {{b}}");
/// ```
pub fn substitute(html: &str, vars: &TemplateVars) -> String {
    if vars.is_empty() {
        return html.to_string();
    }

    PLACEHOLDER
        .replace_all(html, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Markup shown in place of a template that failed to load
pub fn fallback_template(name: &str) -> String {
    match name {
        "header" => FALLBACK_HEADER.to_string(),
        "footer" => FALLBACK_FOOTER.to_string(),
        _ => format!(
            r#"<div class="template-error"><p><strong>Template Error:</strong> Failed to load "{}"</p><p>Please check the console for details.</p></div>"#,
            name
        ),
    }
}

pub const FALLBACK_HEADER: &str = r#"<div class="fallback-header"><div class="fallback-header-inner"><h2 class="fallback-brand"><a href="/" data-link>Organic Chem Resources</a></h2><nav class="fallback-nav"><a href="/" data-link>Home</a><a href="/lessons/alcohols" data-link>Alcohols</a></nav></div></div>"#;

pub const FALLBACK_FOOTER: &str = r#"<footer class="fallback-footer"><p>© 2025 Organic Chemistry Resources</p><p>License: GPL v3</p></footer>"#;

// ============================================================================
// Template Loader
// ============================================================================

/// Loads `templates/<name>.html` into containers
pub struct TemplateLoader {
    fetcher: Rc<dyn Fetcher>,
    timer: Rc<dyn Timer>,
    reactivator: Rc<Reactivator>,
    config: Rc<SiteConfig>,
}

impl TemplateLoader {
    pub fn new(
        fetcher: Rc<dyn Fetcher>,
        timer: Rc<dyn Timer>,
        reactivator: Rc<Reactivator>,
        config: Rc<SiteConfig>,
    ) -> Self {
        Self {
            fetcher,
            timer,
            reactivator,
            config,
        }
    }

    /// URL a template name is fetched from
    pub fn template_url(&self, name: &str) -> String {
        self.config.site_url(&self.config.paths.template_url(name))
    }

    /// Fetches a template and substitutes `vars`, without touching the page
    pub async fn fetch(&self, name: &str, vars: &TemplateVars) -> Result<String, FetchError> {
        let html = fetch_text(self.fetcher.as_ref(), &self.template_url(name)).await?;
        tracing::debug!(template = name, chars = html.len(), "template loaded");
        Ok(substitute(&html, vars))
    }

    /// Loads a template into `container`
    ///
    /// On success the container's scroll offset is kept, the substituted
    /// markup is returned and, after the settle delay, the container is
    /// reactivated. On failure the container gets the named fallback and
    /// the error is returned.
    pub async fn load(
        &self,
        name: &str,
        container: &dyn Element,
        vars: &TemplateVars,
    ) -> Result<String, FetchError> {
        let html = match self.fetch(name, vars).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(template = name, error = %e, "failed to load template");
                container.set_inner_html(&fallback_template(name));
                return Err(e);
            }
        };

        let scroll_top = container.scroll_top();
        container.set_inner_html(&html);
        container.set_scroll_top(scroll_top);

        let settle = self.config.timing.settle_delay_ms;
        if settle > 0 {
            self.timer.sleep(Duration::from_millis(settle)).await;
        }
        self.reactivator.activate(container);

        Ok(html)
    }
}

// ============================================================================
// Partials
// ============================================================================

/// Resolves `[data-include]` placeholders
///
/// ```html
/// <div data-include="/partials/topic-card.html" data-title="Ethers"></div>
/// ```
///
/// The element is replaced by the fetched file, with its other `data-*`
/// attributes as substitution variables (`data-topic-id` → `{{topicId}}`).
pub struct Partials {
    fetcher: Rc<dyn Fetcher>,
    config: Rc<SiteConfig>,
}

impl Partials {
    pub fn new(fetcher: Rc<dyn Fetcher>, config: Rc<SiteConfig>) -> Self {
        Self { fetcher, config }
    }

    /// Replaces every include inside `container`; returns how many loaded
    ///
    /// `is_current` is checked after each fetch; once it turns false the
    /// remaining includes are left alone and `Superseded` is returned.
    pub async fn load(
        &self,
        container: &dyn Element,
        is_current: &dyn Fn() -> bool,
    ) -> Result<usize, RouteError> {
        let mut loaded = 0;

        for element in container.query_all("[data-include]") {
            let Some(file) = element.attribute("data-include") else {
                continue;
            };
            let url = if file.starts_with('/') {
                self.config.site_url(&file)
            } else {
                self.config.site_url(&format!("/{}", file))
            };

            let result = fetch_text(self.fetcher.as_ref(), &url).await;
            if !is_current() {
                return Err(RouteError::Superseded);
            }

            match result {
                Ok(html) => {
                    let html = substitute(&html, &dataset(element.as_ref()));
                    element.insert_html(InsertPosition::AfterEnd, &html);
                    element.remove();
                    loaded += 1;
                }
                Err(e) => {
                    tracing::error!(partial = %file, error = %e, "failed to load partial");
                    element.set_inner_html(&format!(
                        r#"<div class="partial-error">Failed to load: {}</div>"#,
                        file
                    ));
                }
            }
        }

        Ok(loaded)
    }
}

/// `data-*` attributes keyed the way `HTMLElement.dataset` names them
fn dataset(element: &dyn Element) -> TemplateVars {
    element
        .attribute_names()
        .into_iter()
        .filter_map(|name| {
            let key = name.strip_prefix("data-")?;
            if key == "include" {
                return None;
            }
            let value = element.attribute(&name)?;
            Some((camel_case(key), value))
        })
        .collect()
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
