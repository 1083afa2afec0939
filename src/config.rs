use std::path::PathBuf;
use thiserror::Error;

use crate::sheets::DEFAULT_EXPORT_BASE_URL;

pub const DEFAULT_INDEX_TAB: &str = "TabsToExport";
pub const DEFAULT_BASE_NAME: &str = "GameText";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} cannot be empty")]
    Blank(&'static str),
    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
    #[error("Failed to get home directory")]
    NoHomeDirectory,
}

/// Per-run import configuration
///
/// Passed into the importer at run start; nothing about a run is kept in
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    /// Spreadsheet document id
    pub document_id: String,
    /// Tab listing the other tabs to import
    pub index_tab: String,
    /// Prefix for every destination table name
    pub base_name: String,
    /// How many tab fetches may be in flight at once (1 = strictly sequential)
    pub max_concurrent_fetches: usize,
}

impl ImportSettings {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            index_tab: DEFAULT_INDEX_TAB.to_string(),
            base_name: DEFAULT_BASE_NAME.to_string(),
            max_concurrent_fetches: 1,
        }
    }

    /// Reject blank required fields before a run starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document_id.trim().is_empty() {
            return Err(ConfigError::Blank("Document ID"));
        }
        if self.index_tab.trim().is_empty() {
            return Err(ConfigError::Blank("Index tab name"));
        }
        if self.base_name.trim().is_empty() {
            return Err(ConfigError::Blank("String table base name"));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid {
                name: "max concurrent fetches",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Application configuration
///
/// Loaded from `SHEETLOC_*` environment variables, after reading a `.env`
/// file if one is present.
#[derive(Clone, Debug)]
pub struct Config {
    pub document_id: String,
    pub index_tab: String,
    pub base_name: String,
    pub database_path: PathBuf,
    pub export_base_url: String,
    pub max_concurrent_fetches: usize,
}

impl Config {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            tracing::debug!("Config: loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_path = match non_blank("SHEETLOC_DATABASE_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        let max_concurrent_fetches = match non_blank("SHEETLOC_MAX_CONCURRENT_FETCHES") {
            Some(value) => parse_concurrency(&value)?,
            None => 1,
        };

        Ok(Self {
            document_id: lookup("SHEETLOC_DOCUMENT_ID").unwrap_or_default(),
            index_tab: non_blank("SHEETLOC_INDEX_TAB")
                .unwrap_or_else(|| DEFAULT_INDEX_TAB.to_string()),
            base_name: non_blank("SHEETLOC_BASE_NAME")
                .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string()),
            database_path,
            export_base_url: non_blank("SHEETLOC_EXPORT_BASE_URL")
                .unwrap_or_else(|| DEFAULT_EXPORT_BASE_URL.to_string()),
            max_concurrent_fetches,
        })
    }

    /// Settings for one import run, trimmed of surrounding whitespace
    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            document_id: self.document_id.trim().to_string(),
            index_tab: self.index_tab.trim().to_string(),
            base_name: self.base_name.trim().to_string(),
            max_concurrent_fetches: self.max_concurrent_fetches,
        }
    }
}

/// Parse a fetch concurrency value, which must be at least 1
pub fn parse_concurrency(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ConfigError::Invalid {
            name: "max concurrent fetches",
            value: value.to_string(),
        }),
    }
}

/// Production default: ~/.sheetloc/strings.db
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home_dir.join(".sheetloc").join("strings.db"))
}
