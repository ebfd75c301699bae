//! Ledger session - a run store bound to its storage.
//!
//! Every successful mutation is followed by a full save. A failed save is logged
//! and does not undo the in-memory change; the next successful save catches up.

use crate::{
    config::Settings,
    core::{
        calendar::DayDefaults,
        persistence::{load_store, save_store},
        store::RunStore,
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::{error, info};

/// One user session: the database connection, settings, and the live store.
pub struct LedgerSession {
    db: DatabaseConnection,
    settings: Settings,
    store: RunStore,
}

impl LedgerSession {
    /// Restores the saved store and starts a session over it.
    pub async fn open(db: DatabaseConnection, settings: Settings) -> Result<Self> {
        let store = load_store(&db, &settings.storage).await?;
        info!(
            "Opened ledger with {} runs (selected: {})",
            store.runs().len(),
            store.selected_run_id().unwrap_or("none")
        );
        Ok(Self {
            db,
            settings,
            store,
        })
    }

    /// The live run store.
    #[must_use]
    pub const fn store(&self) -> &RunStore {
        &self.store
    }

    /// Show pay and gas amounts used when a day has none entered.
    #[must_use]
    pub const fn defaults(&self) -> &DayDefaults {
        &self.settings.defaults
    }

    /// Settings the session was opened with.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies a mutation to the store and saves when it succeeds.
    ///
    /// A rejected mutation is returned as-is and nothing is written.
    pub async fn update<T>(
        &mut self,
        mutation: impl FnOnce(&mut RunStore) -> Result<T>,
    ) -> Result<T> {
        let value = mutation(&mut self.store)?;
        self.persist().await;
        Ok(value)
    }

    /// Creates a run and returns its id.
    pub async fn create_run(
        &mut self,
        title: &str,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    ) -> Result<String> {
        self.update(|store| {
            store
                .create_run(title, start_date, end_date)
                .map(|run| run.id.clone())
        })
        .await
    }

    /// Selects a run by id and saves the selection.
    pub async fn select_run(&mut self, id: &str) {
        self.store.select_run(id);
        self.persist().await;
    }

    async fn persist(&self) {
        if let Err(e) = save_store(&self.db, &self.settings.storage, &self.store).await {
            error!("Failed to save ledger state: {}", e);
        }
    }
}
