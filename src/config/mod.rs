/// Database connection and table creation
pub mod database;

/// Application settings loaded from ledger.toml
pub mod settings;

pub use settings::{Settings, StorageSettings, load_app_configuration};
