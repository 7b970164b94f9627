//! CLI subcommand implementations.

pub mod borrow;
pub mod due;
pub mod employee;
pub mod holding;
pub mod import;
pub mod logs;
pub mod returns;
pub mod status;
pub mod tool;

use anyhow::{Context, Result};

use crib_core::CalendarDate;
use crib_db::Database;

use crate::Config;

/// Opens the configured database, creating its directory on first use.
pub fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("failed to create database directory")?;
        }
    }
    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

/// Calibration dates are shown as `NA` when not tracked.
fn due_label(due: Option<&CalendarDate>) -> &str {
    due.map_or("NA", CalendarDate::as_str)
}

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use crib_core::Timestamp;

    use crate::Config;

    /// A config pointing at a fresh database inside a temp directory.
    pub fn temp_config() -> (TempDir, Config) {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("crib.db"),
            ..Config::default()
        };
        (temp, config)
    }

    pub fn ts(s: &str) -> Timestamp {
        Timestamp::new(s).unwrap()
    }

    pub fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}
