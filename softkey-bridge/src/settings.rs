//! Where the bridge finds its configuration.
//!
//! Lookup order:
//! 1. an explicit path (first CLI argument)
//! 2. `<config dir>/softkey/config.json`
//! 3. built-in defaults

use anyhow::{Context, Result};
use directories::ProjectDirs;
use softkey_core::config::AppConfig;
use std::path::{Path, PathBuf};

/// `config.json` inside the platform's config directory for softkey.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "softkey", "softkey").map(|dirs| dirs.config_dir().join("config.json"))
}

pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return AppConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            tracing::info!("Loading config from {}", path.display());
            AppConfig::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        _ => Ok(AppConfig::default()),
    }
}
