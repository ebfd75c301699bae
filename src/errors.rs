//! Unified error type for the run ledger.
//!
//! Validation failures are distinct variants so a presentation layer can tell the
//! user what was wrong instead of silently ignoring the input.

use chrono::NaiveDate;
use thiserror::Error;

/// Everything that can go wrong in the ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings file missing, unreadable or malformed
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The run collection could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A run was created with a blank title
    #[error("Run title must not be empty")]
    EmptyTitle,

    /// A transaction was entered with a blank description
    #[error("Transaction description must not be empty")]
    EmptyDescription,

    /// A transaction amount that is not a finite, non-zero number
    #[error("Invalid amount '{input}': must be a non-zero number")]
    InvalidAmount { input: String },

    /// A per-day value was entered for a date the run does not cover
    #[error("{date} is outside the run ({start} to {end})")]
    DateOutsideRun {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// A change needs a selected run and there is none
    #[error("No run is selected")]
    NoRunSelected,

    /// The selected or requested run id is not in the store
    #[error("Run not found: {id}")]
    RunNotFound { id: String },
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
