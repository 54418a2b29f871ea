use super::load_config;
use anyhow::{Context, Result};
use colored::Colorize;
use orgchem::dom::{MemoryDocument, MemoryHistory};
use orgchem::fetch::FsFetcher;
use orgchem::storage::{FileStore, KeyValueStore, MemoryStore};
use orgchem::timer::TokioTimer;
use orgchem::{App, NavigationState, Platform, SiteConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Shell used when the site has no index.html
pub const DEFAULT_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Organic Chem Resources</title></head>
<body><div id="app"><div class="initial-loading">Loading...</div></div></body>
</html>"#;

pub struct RenderOptions {
    pub path: String,
    pub site: PathBuf,
    pub shell: Option<PathBuf>,
    pub prefs: Option<PathBuf>,
}

/// Outcome of a headless render
pub struct Rendered {
    pub html: String,
    pub state: NavigationState,
    pub scripts: usize,
    pub error: Option<String>,
}

pub async fn execute(options: &RenderOptions, config: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let config = load_config(config, Some(&options.site))?;
    tracing::info!(path = %options.path, site = %options.site.display(), "rendering");
    let rendered = render(options, config).await?;

    if let Some(error) = &rendered.error {
        eprintln!("{} {}: {}", "⚠".yellow(), options.path, error);
    }

    match output {
        Some(output) => {
            fs::write(output, &rendered.html)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            eprintln!(
                "{} {} → {} ({:?}, {} scripts)",
                "✓".green(),
                rendered.state.current_path.cyan(),
                output.display(),
                rendered.state.phase,
                rendered.scripts
            );
        }
        None => println!("{}", rendered.html),
    }

    Ok(())
}

/// Renders `options.path` against the site directory
pub async fn render(options: &RenderOptions, config: SiteConfig) -> Result<Rendered> {
    let shell = read_shell(options)?;
    let document = Rc::new(MemoryDocument::parse(&shell));

    let store: Rc<dyn KeyValueStore> = match &options.prefs {
        Some(path) => Rc::new(FileStore::open(path)?),
        None => Rc::new(MemoryStore::new()),
    };

    let platform = Platform {
        document: document.clone(),
        history: Rc::new(MemoryHistory::new(&options.path)),
        fetcher: Rc::new(FsFetcher::new(&options.site).with_base_path(config.site.base_path.clone())),
        store,
        timer: Rc::new(TokioTimer),
    };

    let app = App::new(platform, config).context("Failed to set up the application")?;
    let error = app.init().await.err().map(|e| e.to_string());

    Ok(Rendered {
        html: document.to_html(),
        state: app.router().state(),
        scripts: document.executed_scripts().len(),
        error,
    })
}

fn read_shell(options: &RenderOptions) -> Result<String> {
    if let Some(shell) = &options.shell {
        return fs::read_to_string(shell)
            .with_context(|| format!("Failed to read shell: {}", shell.display()));
    }

    let index = options.site.join("index.html");
    if index.exists() {
        return fs::read_to_string(&index)
            .with_context(|| format!("Failed to read shell: {}", index.display()));
    }

    Ok(DEFAULT_SHELL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgchem::Phase;
    use pretty_assertions::assert_eq;

    fn site(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("orgchem-render-{}-{}", name, std::process::id()));
        for sub in ["templates", "content/pages", "content/lessons/ethers"] {
            fs::create_dir_all(dir.join(sub)).unwrap();
        }
        fs::write(dir.join("templates/header.html"), r#"<nav><a href="/" data-link>Home</a></nav>"#).unwrap();
        fs::write(dir.join("templates/footer.html"), "<footer>GPL v3</footer>").unwrap();
        fs::write(
            dir.join("templates/lesson-layout.html"),
            r#"<aside class="sidebar"><button id="sidebar-toggle"><i></i></button></aside><main class="content-area"><h1 class="content-title"></h1><div class="lesson-content"></div></main>"#,
        )
        .unwrap();
        fs::write(dir.join("content/pages/home-content.html"), "<h1>Welcome</h1><script>window.ready = true;</script>").unwrap();
        fs::write(dir.join("content/lessons/ethers/content.html"), "<p>Ethers have an oxygen bridge.</p>").unwrap();
        dir
    }

    fn options(site: PathBuf, path: &str) -> RenderOptions {
        RenderOptions {
            path: path.to_string(),
            site,
            shell: None,
            prefs: None,
        }
    }

    #[tokio::test]
    async fn test_render_home() {
        let rendered = render(&options(site("home"), "/"), SiteConfig::default()).await.unwrap();

        assert_eq!(rendered.state.phase, Phase::Ready);
        assert_eq!(rendered.scripts, 1);
        assert!(rendered.html.starts_with("<!DOCTYPE html>"));
        assert!(rendered.html.contains("<h1>Welcome</h1>"));
        assert!(rendered.html.contains("<footer>GPL v3</footer>"));
        assert!(rendered.error.is_none());
    }

    #[tokio::test]
    async fn test_render_lesson() {
        let rendered = render(&options(site("lesson"), "/lessons/ethers"), SiteConfig::default()).await.unwrap();

        assert!(rendered.html.contains("<title>Ethers - Organic Chem Resources</title>"));
        assert!(rendered.html.contains(r#"<h1 class="content-title">Ethers</h1>"#));
        assert!(rendered.html.contains("oxygen bridge"));
        assert_eq!(rendered.state.current_topic.as_deref(), Some("ethers"));
    }

    #[tokio::test]
    async fn test_render_missing_page() {
        let rendered = render(&options(site("missing"), "/glossary"), SiteConfig::default()).await.unwrap();

        assert_eq!(rendered.state.phase, Phase::Error);
        assert!(rendered.html.contains("Page Not Found"));
        assert!(rendered.error.is_some());
    }
}
