//! Application Configuration
//!
//! Where the workspace lives on disk and how chatty the log is.

use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Overrides the data directory
pub const HOME_ENV: &str = "TASKLISTS_HOME";
/// Log level filter (`error`, `warn`, `info`, `debug`, `trace`, `off`)
pub const LOG_ENV: &str = "TASKLISTS_LOG";

pub const APP_NAME: &str = "TaskLists";
const STORAGE_FILE: &str = "local_storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub app_name: String,
    pub log_level: log::LevelFilter,
}

impl AppConfig {
    /// Everything under `home`, logs in `home/logs`
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let data_dir = home.into();
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            app_name: APP_NAME.to_string(),
            log_level: log::LevelFilter::Info,
        }
    }

    pub fn from_env() -> Self {
        let home = std::env::var_os(HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|dir| dir.join("tasklists")))
            .unwrap_or_else(|| PathBuf::from(".tasklists"));

        let mut config = Self::with_home(home);
        if let Some(level) = std::env::var(LOG_ENV)
            .ok()
            .and_then(|raw| log::LevelFilter::from_str(raw.trim()).ok())
        {
            config.log_level = level;
        }
        config
    }

    /// File holding the local storage map
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_home_layout() {
        let config = AppConfig::with_home("/tmp/tl");
        assert_eq!(config.data_dir(), Path::new("/tmp/tl"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/tl/logs"));
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/tl/local_storage.json"));
        assert_eq!(config.app_name, APP_NAME);
        assert_eq!(config.log_level, log::LevelFilter::Info);
    }

    // Only test that touches the environment
    #[test]
    fn test_from_env() {
        let home = tempfile::tempdir().unwrap();
        std::env::set_var(HOME_ENV, home.path());
        std::env::set_var(LOG_ENV, " debug ");

        let config = AppConfig::from_env();
        assert_eq!(config.data_dir(), home.path());
        assert_eq!(config.log_dir, home.path().join("logs"));
        assert_eq!(config.log_level, log::LevelFilter::Debug);

        // Unparsable level keeps the default, empty home falls back
        std::env::set_var(LOG_ENV, "chatty");
        std::env::set_var(HOME_ENV, "");
        let config = AppConfig::from_env();
        assert_eq!(config.log_level, log::LevelFilter::Info);
        let expected = dirs::data_dir()
            .map(|dir| dir.join("tasklists"))
            .unwrap_or_else(|| PathBuf::from(".tasklists"));
        assert_eq!(config.data_dir, expected);

        std::env::remove_var(HOME_ENV);
        std::env::remove_var(LOG_ENV);
    }
}
