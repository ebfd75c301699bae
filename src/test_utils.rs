//! Shared test utilities for the run ledger.
//!
//! Helpers for setting up an in-memory database and building runs and stores
//! with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        model::{DayType, Run, TransactionKind},
        store::RunStore,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly tracing subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with the storage table initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a `YYYY-MM-DD` literal.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A bare run over the given range with id `"1"`.
pub fn sample_run(start: &str, end: &str) -> Run {
    Run::new("1".to_string(), "Sample".to_string(), date(start), date(end))
}

/// A store holding one selected run from 2025-06-01 to 2025-06-03.
/// Returns (store, run id).
pub fn store_with_run() -> (RunStore, String) {
    let mut store = RunStore::new();
    let id = store
        .create_run("Summer Run", date("2025-06-01"), date("2025-06-03"))
        .unwrap()
        .id
        .clone();
    (store, id)
}

/// The reference scenario: a show on 2025-06-02 paying 300 and a 10 dollar
/// snack expense attributed to the same day.
pub fn scenario_store() -> RunStore {
    let (mut store, _) = store_with_run();
    store.set_day_type(date("2025-06-02"), DayType::Show).unwrap();
    store.set_show_pay(date("2025-06-02"), "300").unwrap();
    store
        .add_transaction(TransactionKind::Expense, "2025-06-02: snacks", "10")
        .unwrap();
    store
}
