//! Application settings loading from ledger.toml
//!
//! Every field has a default, so the file is optional and may set only what it
//! needs. `DATABASE_URL` from the environment (or `.env`) overrides the
//! configured database location.

use crate::{
    config::database::DEFAULT_DATABASE_URL,
    core::calendar::DayDefaults,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default settings file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "ledger.toml";

/// Configuration structure representing the entire ledger.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where and under which keys the ledger state is stored
    pub storage: StorageSettings,
    /// Amounts assumed for show and travel days without explicit figures
    pub defaults: DayDefaults,
}

/// Storage location and key names
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `SeaORM` connection URL
    pub database_url: String,
    /// Key holding the JSON array of runs
    pub runs_key: String,
    /// Key holding the bare selected run id
    pub selected_run_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            runs_key: "runs".to_string(),
            selected_run_key: "selectedRunId".to_string(),
        }
    }
}

impl StorageSettings {
    /// Key that keeps a copy of run data that failed to decode on load.
    #[must_use]
    pub fn corrupt_runs_key(&self) -> String {
        format!("{}.corrupt", self.runs_key)
    }
}

impl Settings {
    /// Replaces the database URL when an override is present.
    pub fn apply_database_url_override(&mut self, database_url: Option<String>) {
        if let Some(url) = database_url.filter(|url| !url.trim().is_empty()) {
            debug!("Overriding database URL from environment");
            self.storage.database_url = url;
        }
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse ledger settings: {e}"),
    })
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid settings TOML.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    debug!("Attempting to load settings from: {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path.display()),
    })?;
    parse_settings(&contents)
}

/// Loads `.env`, then the settings file, then applies environment overrides.
///
/// The settings file is `RUN_LEDGER_CONFIG` when set, otherwise `ledger.toml`.
/// A missing default file is not an error; built-in defaults are used instead.
pub fn load_app_configuration() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let explicit = std::env::var("RUN_LEDGER_CONFIG").ok().map(PathBuf::from);
    let mut settings = match explicit {
        Some(path) => load_settings(&path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_settings(DEFAULT_CONFIG_PATH)?,
        None => {
            info!("No {} found, using default settings", DEFAULT_CONFIG_PATH);
            Settings::default()
        }
    };

    settings.apply_database_url_override(std::env::var("DATABASE_URL").ok());
    Ok(settings)
}
