// File: src/config.rs
// Purpose: Site configuration parsing from orgchem.toml

use crate::error::ConfigError;
use crate::topics::{Topic, TopicRegistry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up by [`SiteConfig::load_default`]
pub const CONFIG_FILE: &str = "orgchem.toml";

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    /// Replaces the built-in topic list when non-empty
    #[serde(default)]
    pub topics: Vec<TopicConfig>,
}

/// Deployment and branding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteSection {
    /// Prefix the site is served under (e.g., "/organic"); empty for the root
    #[serde(default)]
    pub base_path: String,

    /// Appended to lesson titles in the document title
    #[serde(default = "default_title_suffix")]
    pub title_suffix: String,

    /// Accent color for topics without one
    #[serde(default = "default_topic_color")]
    pub default_topic_color: String,
}

/// Where fragments live, relative to the site root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    #[serde(default = "default_lessons_dir")]
    pub lessons_dir: String,

    /// Fragment name of the home page inside `pages_dir`
    #[serde(default = "default_home_page")]
    pub home_page: String,
}

/// Delays, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    /// Pause between splicing a template and reactivating it
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_sidebar_poll_interval_ms")]
    pub sidebar_poll_interval_ms: u64,

    #[serde(default = "default_sidebar_poll_max_attempts")]
    pub sidebar_poll_max_attempts: u32,
}

/// One `[[topics]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
}

// Default values
fn default_title_suffix() -> String {
    "Organic Chem Resources".to_string()
}

fn default_topic_color() -> String {
    crate::topics::DEFAULT_TOPIC_COLOR.to_string()
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_pages_dir() -> String {
    "content/pages".to_string()
}

fn default_lessons_dir() -> String {
    "content/lessons".to_string()
}

fn default_home_page() -> String {
    "home-content".to_string()
}

fn default_settle_delay_ms() -> u64 {
    50
}

fn default_sidebar_poll_interval_ms() -> u64 {
    100
}

fn default_sidebar_poll_max_attempts() -> u32 {
    50
}

// Default implementations
impl Default for SiteSection {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            title_suffix: default_title_suffix(),
            default_topic_color: default_topic_color(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            pages_dir: default_pages_dir(),
            lessons_dir: default_lessons_dir(),
            home_page: default_home_page(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            sidebar_poll_interval_ms: default_sidebar_poll_interval_ms(),
            sidebar_poll_max_attempts: default_sidebar_poll_max_attempts(),
        }
    }
}

impl PathsConfig {
    /// URL of a named template
    pub fn template_url(&self, name: &str) -> String {
        format!("/{}/{}.html", trim_dir(&self.templates_dir), name)
    }

    /// URL of a page fragment
    pub fn page_url(&self, page: &str) -> String {
        format!("/{}/{}.html", trim_dir(&self.pages_dir), page)
    }

    /// URL of a lesson's content fragment
    pub fn lesson_content_url(&self, topic: &str) -> String {
        format!("/{}/{}/content.html", trim_dir(&self.lessons_dir), topic)
    }

    /// URL of a lesson's sidebar data
    pub fn lesson_sidebar_url(&self, topic: &str) -> String {
        format!("/{}/{}/sidebar.json", trim_dir(&self.lessons_dir), topic)
    }
}

fn trim_dir(dir: &str) -> &str {
    dir.trim_matches('/')
}

impl SiteConfig {
    /// Load configuration from orgchem.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Load configuration from default path (./orgchem.toml)
    pub fn load_default() -> Result<Self> {
        Self::load(CONFIG_FILE)
    }

    /// Parses and validates TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: SiteConfig = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.site.base_path;
        if !base.is_empty() && (!base.starts_with('/') || base.ends_with('/')) {
            return Err(ConfigError::BasePath(base.clone()));
        }

        if self.timing.sidebar_poll_max_attempts == 0 {
            return Err(ConfigError::PollAttempts);
        }

        let mut seen = HashSet::new();
        for topic in &self.topics {
            if topic.id.is_empty() || topic.id.contains('/') {
                return Err(ConfigError::TopicId(topic.id.clone()));
            }
            if !seen.insert(topic.id.as_str()) {
                return Err(ConfigError::DuplicateTopic(topic.id.clone()));
            }
        }

        Ok(())
    }

    /// Prefixes a site-relative URL with the deployment base
    pub fn site_url(&self, url: &str) -> String {
        format!("{}{}", self.site.base_path, url)
    }

    /// Topic registry described by this configuration
    pub fn topic_registry(&self) -> TopicRegistry {
        if self.topics.is_empty() {
            return TopicRegistry::builtin().with_default_color(&self.site.default_topic_color);
        }

        let topics = self
            .topics
            .iter()
            .map(|t| Topic {
                id: t.id.clone(),
                title: t.title.clone(),
                color: t
                    .color
                    .clone()
                    .unwrap_or_else(|| self.site.default_topic_color.clone()),
            })
            .collect();

        TopicRegistry::new(topics).with_default_color(&self.site.default_topic_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.site.title_suffix, "Organic Chem Resources");
        assert_eq!(config.site.default_topic_color, "#667eea");
        assert_eq!(config.paths.templates_dir, "templates");
        assert_eq!(config.timing.settle_delay_ms, 50);
        assert_eq!(config.timing.sidebar_poll_interval_ms, 100);
        assert_eq!(config.timing.sidebar_poll_max_attempts, 50);
    }

    #[test]
    fn test_empty_config() {
        let config = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn test_fragment_urls() {
        let paths = PathsConfig::default();
        assert_eq!(paths.template_url("lesson-layout"), "/templates/lesson-layout.html");
        assert_eq!(paths.page_url("home-content"), "/content/pages/home-content.html");
        assert_eq!(paths.lesson_content_url("ethers"), "/content/lessons/ethers/content.html");
        assert_eq!(paths.lesson_sidebar_url("ethers"), "/content/lessons/ethers/sidebar.json");
    }

    #[test]
    fn test_custom_sections() {
        let toml = r##"
            [site]
            base_path = "/organic"

            [timing]
            settle_delay_ms = 0

            [[topics]]
            id = "alkenes"
            title = "Alkenes"
            color = "#000000"

            [[topics]]
            id = "alkynes"
            title = "Alkynes"
        "##;
        let config = SiteConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.site.base_path, "/organic");
        assert_eq!(config.timing.settle_delay_ms, 0);
        assert_eq!(config.paths.lessons_dir, "content/lessons");

        let registry = config.topic_registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.color("alkynes"), "#667eea");
    }

    #[test]
    fn test_validation_errors() {
        let bad_base = SiteConfig::from_toml_str("[site]\nbase_path = \"organic/\"");
        assert!(bad_base.is_err());

        let zero_attempts = SiteConfig::from_toml_str("[timing]\nsidebar_poll_max_attempts = 0");
        assert!(zero_attempts.is_err());

        let mut config = SiteConfig::default();
        config.topics = vec![
            TopicConfig { id: "ethers".into(), title: "Ethers".into(), color: None },
            TopicConfig { id: "ethers".into(), title: "Ethers".into(), color: None },
        ];
        assert_eq!(config.validate(), Err(ConfigError::DuplicateTopic("ethers".into())));
    }
}
