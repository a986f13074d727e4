//! App-wide configuration.
//!
//! Every flag is optional: an absent flag means "use the platform default",
//! which is decided by the caller at lookup time.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Fallback delay before deferred startup work runs.
pub const DEFAULT_IDLE_DELAY_MS: u64 = 32;

/// Visual mode; also applied to the root as a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Ios,
    Md,
}

impl Mode {
    pub fn as_class(self) -> &'static str {
        match self {
            Mode::Ios => "ios",
            Mode::Md => "md",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub mode: Option<Mode>,
    /// Set by test harnesses; disables tap-click.
    #[serde(rename = "_testing")]
    pub testing: Option<bool>,
    #[serde(rename = "_forceStatusbarPadding")]
    pub force_statusbar_padding: Option<bool>,
    pub status_tap: Option<bool>,
    pub input_shims: Option<bool>,
    pub hardware_back_button: Option<bool>,
    pub experimental_close_watcher: Option<bool>,
    pub idle_delay_ms: Option<u64>,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn is_testing(&self) -> bool {
        self.testing.unwrap_or(false)
    }

    pub fn force_statusbar_padding(&self) -> bool {
        self.force_statusbar_padding.unwrap_or(false)
    }

    pub fn status_tap_or(&self, default: bool) -> bool {
        self.status_tap.unwrap_or(default)
    }

    pub fn input_shims_or(&self, default: bool) -> bool {
        self.input_shims.unwrap_or(default)
    }

    pub fn hardware_back_button_or(&self, default: bool) -> bool {
        self.hardware_back_button.unwrap_or(default)
    }

    pub fn experimental_close_watcher(&self) -> bool {
        self.experimental_close_watcher.unwrap_or(false)
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms.unwrap_or(DEFAULT_IDLE_DELAY_MS))
    }
}
