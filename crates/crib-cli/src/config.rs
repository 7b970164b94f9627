//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Name recorded as verifier when a borrow or return does not give one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Rows shown by `crib due` when no limit is passed.
    pub due_soon_limit: usize,
    /// Rows shown by `crib logs` when no limit is passed.
    pub recent_logs_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("crib.db"),
            operator: None,
            due_soon_limit: 5,
            recent_logs_limit: 50,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // CRIB_DATABASE_PATH, CRIB_OPERATOR, ...
        figment = figment.merge(Env::prefixed("CRIB_"));

        figment.extract()
    }

    /// Operator name to record, if configured and non-blank.
    pub fn operator(&self) -> Option<&str> {
        crib_core::types::non_blank(self.operator.as_deref())
    }
}

/// Returns the platform-specific config directory for crib.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("crib"))
}

/// Returns the platform-specific data directory for crib.
///
/// On Linux: `~/.local/share/crib`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("crib"))
}
