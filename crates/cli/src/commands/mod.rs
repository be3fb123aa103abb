pub mod catalog;
pub mod init;
pub mod match_cmd;
pub mod run;
pub mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use skillforge_config::AppConfig;
use skillforge_core::skill::SkillCatalog;

/// Resolve the catalog directory: CLI flag beats config, relative paths
/// fall back to the config dir when missing from the working directory.
pub(crate) fn catalog_dir(config: &AppConfig, flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    let configured = &config.skills.catalog_dir;
    if configured.is_relative() && !configured.is_dir() {
        let fallback = AppConfig::config_dir().join(configured);
        if fallback.is_dir() {
            return fallback;
        }
    }
    configured.clone()
}

pub(crate) fn load_catalog(dir: &Path) -> Result<Arc<SkillCatalog>, Box<dyn std::error::Error>> {
    let catalog = SkillCatalog::load_dir(dir)
        .map_err(|e| format!("Failed to load skill catalog from {}: {e}", dir.display()))?;
    if catalog.is_empty() {
        eprintln!(
            "  ⚠️  No skill documents found in {} — the agent will run without tool guidance",
            dir.display()
        );
    }
    Ok(Arc::new(catalog))
}
