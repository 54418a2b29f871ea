use super::load_config;
use anyhow::Result;
use colored::Colorize;
use orgchem::SiteConfig;
use orgchem_router::{Page, RouteMatch, RouteTable};
use std::path::Path;

pub fn execute(paths: &[String], config: Option<&Path>) -> Result<()> {
    let config = load_config(config, None)?;
    let table = RouteTable::with_base_path(config.site.base_path.clone());

    for path in paths {
        let route = table.resolve(path);
        println!(
            "{}  {} {}  {}",
            path,
            "→".dimmed(),
            route.kind().to_string().cyan().bold(),
            fragment_url(&route, &config).dimmed()
        );
    }

    Ok(())
}

/// The fragment a route puts into the content region
pub fn fragment_url(route: &RouteMatch, config: &SiteConfig) -> String {
    let paths = &config.paths;
    let url = match &route.page {
        Page::Home => paths.page_url(&paths.home_page),
        Page::Lesson { topic } => paths.lesson_content_url(topic),
        Page::About => paths.page_url("about"),
        Page::Contact => paths.page_url("contact"),
        Page::Generic { page_name } => paths.page_url(page_name),
    };
    config.site_url(&url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("/", "/content/pages/home-content.html")]
    #[case("/index.html", "/content/pages/index.html")]
    #[case("/lessons/ketones.html", "/content/lessons/ketones/content.html")]
    #[case("/about/", "/content/pages/about.html")]
    #[case("/contact", "/content/pages/contact.html")]
    #[case("/privacy", "/content/pages/privacy.html")]
    fn test_fragment_url(#[case] path: &str, #[case] expected: &str) {
        let config = SiteConfig::default();
        let route = RouteTable::new().resolve(path);
        assert_eq!(fragment_url(&route, &config), expected);
    }

    #[test]
    fn test_fragment_url_under_base() {
        let config = SiteConfig::from_toml_str("[site]\nbase_path = \"/chem\"").unwrap();
        let route = RouteTable::with_base_path("/chem").resolve("/chem/lessons/amines");
        assert_eq!(fragment_url(&route, &config), "/chem/content/lessons/amines/content.html");
    }
}
