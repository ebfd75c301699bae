//! Ledger persistence - reads and writes the run store through the key-value table.
//!
//! The whole run collection is written as a JSON array under one key and the
//! selected run id as a bare string under another. Restoring never fails on bad
//! stored data: run records that do not decode are skipped, and the original
//! blob is copied to a backup key before the next save replaces it.

use crate::{
    config::StorageSettings,
    core::{model::Run, store::RunStore},
    entities::{StorageEntry, storage_entry},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{debug, warn};

/// Retrieves a value from the key-value table.
///
/// # Returns
/// * `Ok(Some(value))` - The key exists
/// * `Ok(None)` - The key has never been written
pub async fn read_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let entry = StorageEntry::find()
        .filter(storage_entry::Column::Key.eq(key))
        .one(db)
        .await?;
    Ok(entry.map(|entry| entry.value))
}

/// Sets or updates a value in the key-value table.
pub async fn write_value<C>(db: &C, key: &str, value: String) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let existing = StorageEntry::find()
        .filter(storage_entry::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(entry) = existing {
        let mut active_model: storage_entry::ActiveModel = entry.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_entry = storage_entry::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        };
        new_entry.insert(db).await?;
    }

    Ok(())
}

/// Removes a key from the key-value table. Removing a missing key is not an error.
pub async fn remove_value<C>(db: &C, key: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    StorageEntry::delete_many()
        .filter(storage_entry::Column::Key.eq(key))
        .exec(db)
        .await?;
    Ok(())
}

/// Serializes the run collection to its stored JSON form.
pub fn encode_runs(runs: &[Run]) -> Result<String> {
    serde_json::to_string(runs).map_err(Into::into)
}

/// Runs recovered from a stored blob.
#[derive(Debug, Default, PartialEq)]
pub struct DecodedRuns {
    /// Every record that decoded, in stored order
    pub runs: Vec<Run>,
    /// Set when some or all of the blob had to be discarded
    pub lossy: bool,
}

/// Decodes a stored run collection one record at a time.
///
/// A record that does not decode is skipped with a warning; a blob that is not
/// a JSON array yields no runs. Either way the result is marked lossy.
/// Transactions saved before dates became their own field get their
/// `YYYY-MM-DD:` description prefix lifted into the date.
#[must_use]
pub fn decode_runs(blob: &str) -> DecodedRuns {
    let records = match serde_json::from_str::<Vec<serde_json::Value>>(blob) {
        Ok(records) => records,
        Err(e) => {
            warn!("Stored runs could not be decoded, starting empty: {}", e);
            return DecodedRuns {
                runs: Vec::new(),
                lossy: true,
            };
        }
    };

    let stored = records.len();
    let mut runs: Vec<Run> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            serde_json::from_value::<Run>(record)
                .inspect_err(|e| warn!("Skipping stored run #{}: {}", index, e))
                .ok()
        })
        .collect();

    for transaction in runs.iter_mut().flat_map(|run| run.transactions.iter_mut()) {
        transaction.lift_date_prefix();
    }

    DecodedRuns {
        lossy: runs.len() < stored,
        runs,
    }
}

/// Writes the full store: the run blob and the selected run id.
///
/// Both keys are written in one database transaction. With no selection the
/// selection key is removed.
pub async fn save_store(
    db: &DatabaseConnection,
    storage: &StorageSettings,
    store: &RunStore,
) -> Result<()> {
    let blob = encode_runs(store.runs())?;

    let txn = db.begin().await?;
    write_value(&txn, &storage.runs_key, blob).await?;
    match store.selected_run_id() {
        Some(id) => write_value(&txn, &storage.selected_run_key, id.to_string()).await?,
        None => remove_value(&txn, &storage.selected_run_key).await?,
    }
    txn.commit().await?;

    debug!("Saved {} runs", store.runs().len());
    Ok(())
}

/// Restores the store saved by [`save_store`]; empty when nothing was saved.
///
/// When the stored blob did not decode cleanly it is copied, untouched, to
/// [`StorageSettings::corrupt_runs_key`] so the next save cannot destroy it.
pub async fn load_store(db: &DatabaseConnection, storage: &StorageSettings) -> Result<RunStore> {
    let runs = match read_value(db, &storage.runs_key).await? {
        Some(blob) => {
            let decoded = decode_runs(&blob);
            if decoded.lossy {
                let backup_key = storage.corrupt_runs_key();
                warn!(
                    "Stored runs were partly unreadable, original kept under '{}'",
                    backup_key
                );
                write_value(db, &backup_key, blob).await?;
            }
            decoded.runs
        }
        None => Vec::new(),
    };
    let selected_run_id = read_value(db, &storage.selected_run_key).await?;

    debug!(
        "Loaded {} runs, selected: {:?}",
        runs.len(),
        selected_run_id
    );
    Ok(RunStore::from_parts(runs, selected_run_id))
}
