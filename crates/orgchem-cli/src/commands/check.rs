use super::load_config;
use anyhow::{bail, Result};
use colored::Colorize;
use orgchem::dom::{Document, MemoryDocument};
use orgchem::fetch::{fetch_text, Fetcher, FsFetcher};
use orgchem::lesson::SidebarData;
use orgchem::SiteConfig;
use std::path::Path;

/// Templates every site needs, and whether a missing one breaks routing
const TEMPLATES: &[(&str, bool)] = &[
    ("lesson-layout", true),
    ("header", false),
    ("footer", false),
    ("sidebar-template", false),
];

/// Findings for one topic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicReport {
    pub topic: String,
    /// Whether the topic has a `sidebar.json`
    pub has_sidebar: bool,
    /// Anchors the table of contents links to
    pub anchors: usize,
    pub problems: Vec<String>,
}

/// Findings for a whole site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    pub missing_templates: Vec<String>,
    pub warnings: Vec<String>,
    pub topics: Vec<TopicReport>,
}

impl SiteReport {
    pub fn problem_count(&self) -> usize {
        self.missing_templates.len() + self.topics.iter().map(|t| t.problems.len()).sum::<usize>()
    }
}

pub async fn execute(site: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config, Some(site))?;
    let fetcher = FsFetcher::new(site).with_base_path(config.site.base_path.clone());

    println!("{} {}", "Checking".green().bold(), site.display());
    println!();

    let report = check_site(&fetcher, &config).await;

    for template in &report.missing_templates {
        println!("{} template {} is missing", "✗".red(), template.cyan());
    }
    for warning in &report.warnings {
        println!("{} {}", "⚠".yellow(), warning);
    }

    for topic in &report.topics {
        if topic.problems.is_empty() {
            let sidebar = if topic.has_sidebar {
                format!("{} anchors", topic.anchors)
            } else {
                "default sidebar".to_string()
            };
            println!("{} {} ({})", "✓".green(), topic.topic.cyan(), sidebar.dimmed());
        } else {
            println!("{} {}", "✗".red(), topic.topic.cyan());
            for problem in &topic.problems {
                println!("    {}", problem);
            }
        }
    }

    println!();
    match report.problem_count() {
        0 => {
            println!("{}", "All lessons look good".green().bold());
            Ok(())
        }
        n => bail!("{} problem(s) found", n),
    }
}

/// Checks templates and every topic's content and sidebar data
pub async fn check_site(fetcher: &dyn Fetcher, config: &SiteConfig) -> SiteReport {
    let mut report = SiteReport::default();

    for (name, required) in TEMPLATES {
        let url = config.site_url(&config.paths.template_url(name));
        if fetch_text(fetcher, &url).await.is_err() {
            if *required {
                report.missing_templates.push(name.to_string());
            } else {
                report.warnings.push(format!("optional template {} is missing", name));
            }
        }
    }

    for topic in config.topic_registry().topics() {
        report.topics.push(check_topic(fetcher, config, &topic.id).await);
    }

    report
}

async fn check_topic(fetcher: &dyn Fetcher, config: &SiteConfig, topic: &str) -> TopicReport {
    let mut report = TopicReport {
        topic: topic.to_string(),
        ..TopicReport::default()
    };

    let content_url = config.site_url(&config.paths.lesson_content_url(topic));
    let content = match fetch_text(fetcher, &content_url).await {
        Ok(content) => Some(MemoryDocument::parse(&content)),
        Err(e) => {
            report.problems.push(format!("content.html: {}", e));
            None
        }
    };

    let sidebar_url = config.site_url(&config.paths.lesson_sidebar_url(topic));
    let sidebar = match fetcher.get(&sidebar_url).await {
        Ok(response) if response.is_ok() => Some(response),
        _ => None,
    };
    let Some(sidebar) = sidebar else {
        return report;
    };
    report.has_sidebar = true;

    let data: SidebarData = match sidebar.json() {
        Ok(data) => data,
        Err(e) => {
            report.problems.push(format!("sidebar.json: {}", e));
            return report;
        }
    };

    let anchors = data.anchor_ids();
    report.anchors = anchors.len();

    if let Some(content) = &content {
        for anchor in anchors {
            if content.query(&format!("#{}", anchor)).is_none() {
                report
                    .problems
                    .push(format!("sidebar.json links to #{} which content.html lacks", anchor));
            }
        }
    }

    report
}
