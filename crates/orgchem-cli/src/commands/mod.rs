pub mod check;
pub mod render;
pub mod resolve;
pub mod topics;

use anyhow::{bail, Result};
use orgchem::config::CONFIG_FILE;
use orgchem::SiteConfig;
use std::path::Path;

/// Loads the explicit config file, else `<site>/orgchem.toml`, else defaults
pub fn load_config(explicit: Option<&Path>, site: Option<&Path>) -> Result<SiteConfig> {
    match (explicit, site) {
        (Some(path), _) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            SiteConfig::load(path)
        }
        (None, Some(site)) => SiteConfig::load(site.join(CONFIG_FILE)),
        (None, None) => SiteConfig::load_default(),
    }
}
