mod file_config;

pub use file_config::FileConfig;

use crate::song_bank::DEFAULT_TOP_ALBUMS_LIMIT;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub top_albums_limit: usize,
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            top_albums_limit: DEFAULT_TOP_ALBUMS_LIMIT,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file. Without one, records only live for the run.
    pub db_path: Option<PathBuf>,
    pub top_albums_limit: usize,
    pub log_level: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone());
        if let Some(path) = &db_path {
            if path.is_dir() {
                bail!("db_path is a directory: {:?}", path);
            }
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.is_dir() {
                    bail!("Database directory does not exist: {:?}", parent);
                }
            }
        }

        let top_albums_limit = file.top_albums_limit.unwrap_or(cli.top_albums_limit);
        if top_albums_limit == 0 {
            bail!("top_albums_limit must be at least 1");
        }

        let log_level = file.log_level.unwrap_or_else(|| cli.log_level.clone());

        Ok(Self {
            db_path,
            top_albums_limit,
            log_level,
        })
    }
}
