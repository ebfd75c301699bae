//! Run store - owns every run and the current selection.
//!
//! All mutations go through [`RunStore`]. A rejected mutation returns an error and
//! leaves the store exactly as it was. Field setters act on the selected run and
//! store raw strings; numeric fields are only parsed when totals are computed.

use crate::{
    core::model::{DateMap, DayType, LodgingEntry, Run, Transaction, TransactionKind},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

/// Ordered collection of runs (newest first) plus the selected run id.
#[derive(Debug, Clone, Default)]
pub struct RunStore {
    runs: Vec<Run>,
    selected_run_id: Option<String>,
    last_issued_id: i64,
}

impl RunStore {
    /// An empty store with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from restored state.
    #[must_use]
    pub fn from_parts(runs: Vec<Run>, selected_run_id: Option<String>) -> Self {
        Self {
            runs,
            selected_run_id,
            last_issued_id: 0,
        }
    }

    /// All runs, most recently created first.
    #[must_use]
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Id of the selected run. It may name a run that no longer exists.
    #[must_use]
    pub fn selected_run_id(&self) -> Option<&str> {
        self.selected_run_id.as_deref()
    }

    /// The selected run, `None` when nothing is selected or the id is stale.
    #[must_use]
    pub fn selected_run(&self) -> Option<&Run> {
        self.selected_run_id().and_then(|id| self.run(id))
    }

    /// Looks up a run by id.
    #[must_use]
    pub fn run(&self, id: &str) -> Option<&Run> {
        self.runs.iter().find(|run| run.id == id)
    }

    /// Creates a run, puts it first in the collection and selects it.
    ///
    /// The title is trimmed and must not be empty. The id is the creation time in
    /// milliseconds, bumped as needed so no two runs share one.
    ///
    /// # Arguments
    /// * `title` - Run title as typed
    /// * `start_date` - First day of the run
    /// * `end_date` - Last day of the run, inclusive
    ///
    /// # Returns
    /// The new run, or [`Error::EmptyTitle`] with the store unchanged
    pub fn create_run(
        &mut self,
        title: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<&Run> {
        let title = title.trim();
        if title.is_empty() {
            warn!("Rejected run with empty title");
            return Err(Error::EmptyTitle);
        }

        let id = self.next_run_id(Utc::now().timestamp_millis());
        info!(
            "Creating run '{}' ({} to {}) with id {}",
            title, start_date, end_date, id
        );

        let run = Run::new(id.clone(), title.to_string(), start_date, end_date);
        self.runs.insert(0, run);
        self.selected_run_id = Some(id);
        Ok(&self.runs[0])
    }

    fn next_run_id(&mut self, now_millis: i64) -> String {
        let mut candidate = now_millis.max(self.last_issued_id + 1);
        while self.runs.iter().any(|run| run.id == candidate.to_string()) {
            candidate += 1;
        }
        self.last_issued_id = candidate;
        candidate.to_string()
    }

    /// Selects a run by id. The id is not checked against the collection.
    pub fn select_run(&mut self, id: impl Into<String>) {
        let id = id.into();
        debug!("Selecting run {}", id);
        self.selected_run_id = Some(id);
    }

    /// Adds a transaction to the selected run.
    ///
    /// A leading `YYYY-MM-DD:` in the description becomes the transaction's date.
    ///
    /// # Arguments
    /// * `kind` - Income or expense
    /// * `description` - Free text, must not be blank
    /// * `amount` - Amount as typed; the sign is ignored
    ///
    /// # Returns
    /// The updated run, or a validation error with the store unchanged
    pub fn add_transaction(
        &mut self,
        kind: TransactionKind,
        description: &str,
        amount: &str,
    ) -> Result<&Run> {
        let run_id = self.require_selection()?;
        self.add_transaction_to(&run_id, kind, description, amount)
    }

    /// Adds a transaction to the run with the given id.
    pub fn add_transaction_to(
        &mut self,
        run_id: &str,
        kind: TransactionKind,
        description: &str,
        amount: &str,
    ) -> Result<&Run> {
        let mut transaction = build_transaction(kind, description, amount)?;
        transaction.lift_date_prefix();
        self.push_transaction(run_id, transaction)
    }

    /// Adds a transaction attributed to `date` on the selected run.
    pub fn add_dated_transaction(
        &mut self,
        date: NaiveDate,
        kind: TransactionKind,
        description: &str,
        amount: &str,
    ) -> Result<&Run> {
        let run_id = self.require_selection()?;
        let mut transaction = build_transaction(kind, description, amount)?;
        transaction.date = Some(date);
        self.push_transaction(&run_id, transaction)
    }

    fn push_transaction(&mut self, run_id: &str, transaction: Transaction) -> Result<&Run> {
        let run = self.run_mut(run_id)?;
        debug!(
            "Adding {} of ${:.2} to run {}",
            transaction.kind, transaction.amount, run.id
        );
        run.transactions.insert(0, transaction);
        Ok(run)
    }

    /// Sets the day type for `date` on the selected run.
    pub fn set_day_type(&mut self, date: NaiveDate, day_type: DayType) -> Result<&Run> {
        let run = self.selected_run_mut()?;
        run.day_types.insert(date, day_type);
        Ok(run)
    }

    /// Sets the start time for `date`, stored as typed.
    pub fn set_day_time(&mut self, date: NaiveDate, time: impl Into<String>) -> Result<&Run> {
        self.upsert_text(|run| &mut run.day_times, date, time.into())
    }

    /// Sets the show pay for `date`. Parsed only when totals are computed.
    pub fn set_show_pay(&mut self, date: NaiveDate, pay: impl Into<String>) -> Result<&Run> {
        self.upsert_text(|run| &mut run.show_pays, date, pay.into())
    }

    /// Sets the gas estimate for `date`. Parsed only when totals are computed.
    pub fn set_gas_estimate(&mut self, date: NaiveDate, gas: impl Into<String>) -> Result<&Run> {
        self.upsert_text(|run| &mut run.gas_estimates, date, gas.into())
    }

    /// Sets the venue for `date`.
    pub fn set_venue(&mut self, date: NaiveDate, venue: impl Into<String>) -> Result<&Run> {
        self.upsert_text(|run| &mut run.venues, date, venue.into())
    }

    /// Sets where travel on `date` starts.
    pub fn set_travel_from(&mut self, date: NaiveDate, from: impl Into<String>) -> Result<&Run> {
        self.upsert_text(|run| &mut run.travel_from, date, from.into())
    }

    /// Sets where travel on `date` ends.
    pub fn set_travel_to(&mut self, date: NaiveDate, to: impl Into<String>) -> Result<&Run> {
        self.upsert_text(|run| &mut run.travel_to, date, to.into())
    }

    /// Sets the lodging location for `date`.
    ///
    /// # Returns
    /// The updated run, or [`Error::DateOutsideRun`] when `date` is not one of
    /// the run's days
    pub fn set_lodging_location(
        &mut self,
        date: NaiveDate,
        location: impl Into<String>,
    ) -> Result<&Run> {
        let location = location.into();
        self.update_lodging(date, |entry| entry.location = location)
    }

    /// Sets the lodging cost for `date`, stored as typed.
    ///
    /// # Returns
    /// The updated run, or [`Error::DateOutsideRun`] when `date` is not one of
    /// the run's days
    pub fn set_lodging_cost(&mut self, date: NaiveDate, cost: impl Into<String>) -> Result<&Run> {
        let cost = cost.into();
        self.update_lodging(date, |entry| entry.cost = cost)
    }

    fn update_lodging(
        &mut self,
        date: NaiveDate,
        apply: impl FnOnce(&mut LodgingEntry),
    ) -> Result<&Run> {
        let run = self.selected_run_mut()?;
        let (start, end) = (run.start_date, run.end_date);
        let Some(entry) = run.lodging_entry_mut(date) else {
            warn!(
                "Rejected lodging for {}: run {} covers {} to {}",
                date, run.id, start, end
            );
            return Err(Error::DateOutsideRun { date, start, end });
        };
        apply(entry);
        Ok(run)
    }

    fn upsert_text(
        &mut self,
        field: impl FnOnce(&mut Run) -> &mut DateMap<String>,
        date: NaiveDate,
        value: String,
    ) -> Result<&Run> {
        let run = self.selected_run_mut()?;
        field(&mut *run).insert(date, value);
        Ok(run)
    }

    fn require_selection(&self) -> Result<String> {
        self.selected_run_id.clone().ok_or_else(|| {
            warn!("Rejected change: no run selected");
            Error::NoRunSelected
        })
    }

    fn selected_run_mut(&mut self) -> Result<&mut Run> {
        let run_id = self.require_selection()?;
        self.run_mut(&run_id)
    }

    fn run_mut(&mut self, run_id: &str) -> Result<&mut Run> {
        self.runs
            .iter_mut()
            .find(|run| run.id == run_id)
            .ok_or_else(|| {
                warn!("Rejected change: run {} not found", run_id);
                Error::RunNotFound {
                    id: run_id.to_string(),
                }
            })
    }
}

/// Validates form input into a transaction. The amount's sign is dropped; `kind`
/// alone decides direction.
fn build_transaction(
    kind: TransactionKind,
    description: &str,
    amount: &str,
) -> Result<Transaction> {
    let description = description.trim();
    if description.is_empty() {
        warn!("Rejected transaction with empty description");
        return Err(Error::EmptyDescription);
    }

    let amount = parse_amount(amount)?;
    Ok(Transaction {
        kind,
        description: description.to_string(),
        amount,
        date: None,
    })
}

fn parse_amount(input: &str) -> Result<f64> {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value != 0.0 => Ok(value.abs()),
        _ => {
            warn!("Rejected transaction amount '{}'", input);
            Err(Error::InvalidAmount {
                input: input.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{calendar::DayDefaults, totals::totals};
    use crate::test_utils::{date, store_with_run};

    #[test]
    fn test_create_run_prepends_and_selects() {
        let mut store = RunStore::new();
        let first_id = store
            .create_run("Spring", date("2025-03-01"), date("2025-03-05"))
            .unwrap()
            .id
            .clone();
        let second_id = store
            .create_run("  Summer  ", date("2025-06-01"), date("2025-06-03"))
            .unwrap()
            .id
            .clone();

        assert_ne!(first_id, second_id);
        assert_eq!(store.runs().len(), 2);
        assert_eq!(store.runs()[0].id, second_id);
        assert_eq!(store.runs()[0].title, "Summer");
        assert_eq!(store.selected_run_id(), Some(second_id.as_str()));
        assert_eq!(store.runs()[0].lodging.len(), 3);
    }

    #[test]
    fn test_create_run_empty_title_rejected() {
        let (mut store, run_id) = store_with_run();

        let result = store.create_run("   ", date("2025-07-01"), date("2025-07-02"));

        assert!(matches!(result, Err(Error::EmptyTitle)));
        assert_eq!(store.runs().len(), 1);
        assert_eq!(store.selected_run_id(), Some(run_id.as_str()));
    }

    #[test]
    fn test_run_ids_unique_for_same_instant() {
        let mut store = RunStore::new();
        let a = store.next_run_id(1_000);
        let b = store.next_run_id(1_000);
        let c = store.next_run_id(999);
        assert_eq!(a, "1000");
        assert_eq!(b, "1001");
        assert_eq!(c, "1002");
    }

    #[test]
    fn test_run_id_skips_restored_ids() {
        let mut store = RunStore::from_parts(
            vec![Run::new(
                "5000".to_string(),
                "Restored".to_string(),
                date("2025-01-01"),
                date("2025-01-01"),
            )],
            None,
        );
        assert_eq!(store.next_run_id(5_000), "5001");
    }

    #[test]
    fn test_select_run_does_not_validate() {
        let mut store = RunStore::new();
        store.select_run("missing");
        assert_eq!(store.selected_run_id(), Some("missing"));
        assert!(store.selected_run().is_none());
    }

    #[test]
    fn test_add_transaction_newest_first_with_date() {
        let (mut store, _) = store_with_run();
        store
            .add_transaction(TransactionKind::Income, "merch table", "150")
            .unwrap();
        let run = store
            .add_transaction(TransactionKind::Expense, "2025-06-02: snacks", "10")
            .unwrap();

        assert_eq!(run.transactions.len(), 2);
        let newest = &run.transactions[0];
        assert_eq!(newest.description, "snacks");
        assert_eq!(newest.date, Some(date("2025-06-02")));
        assert_eq!(newest.amount, 10.0);
        assert_eq!(run.transactions[1].description, "merch table");
        assert_eq!(run.transactions[1].date, None);
    }

    #[test]
    fn test_add_transaction_rejections_leave_run_unchanged() {
        let (mut store, run_id) = store_with_run();
        store
            .add_transaction(TransactionKind::Expense, "fuel", "40")
            .unwrap();
        let before = store.run(&run_id).unwrap().clone();

        assert!(matches!(
            store.add_transaction(TransactionKind::Expense, "  ", "10"),
            Err(Error::EmptyDescription)
        ));
        for bad in ["", "ten", "NaN", "inf", "0", "1.2.3"] {
            assert!(
                matches!(
                    store.add_transaction(TransactionKind::Expense, "snacks", bad),
                    Err(Error::InvalidAmount { .. })
                ),
                "amount {bad:?} should be rejected"
            );
        }

        assert_eq!(store.run(&run_id).unwrap(), &before);
    }

    #[test]
    fn test_add_transaction_without_selection() {
        let mut store = RunStore::new();
        assert!(matches!(
            store.add_transaction(TransactionKind::Income, "tips", "5"),
            Err(Error::NoRunSelected)
        ));

        store.select_run("ghost");
        assert!(matches!(
            store.add_transaction(TransactionKind::Income, "tips", "5"),
            Err(Error::RunNotFound { .. })
        ));
    }

    #[test]
    fn test_negative_amount_stored_as_magnitude() {
        let (mut store, _) = store_with_run();
        let run = store
            .add_transaction(TransactionKind::Expense, "refund gone wrong", "-5")
            .unwrap();
        assert_eq!(run.transactions[0].amount, 5.0);
        assert_eq!(run.transactions[0].signed_amount(), -5.0);
    }

    #[test]
    fn test_add_transaction_to_specific_run() {
        let (mut store, first_id) = store_with_run();
        store
            .create_run("Other", date("2025-08-01"), date("2025-08-02"))
            .unwrap();

        store
            .add_transaction_to(&first_id, TransactionKind::Income, "guarantee", "500")
            .unwrap();

        assert_eq!(store.run(&first_id).unwrap().transactions.len(), 1);
        assert!(store.selected_run().unwrap().transactions.is_empty());
    }

    #[test]
    fn test_add_dated_transaction() {
        let (mut store, _) = store_with_run();
        let run = store
            .add_dated_transaction(
                date("2025-06-03"),
                TransactionKind::Expense,
                "2025-06-01: tolls",
                "12.40",
            )
            .unwrap();
        // Explicit date wins; the description is kept as typed
        assert_eq!(run.transactions[0].date, Some(date("2025-06-03")));
        assert_eq!(run.transactions[0].description, "2025-06-01: tolls");
    }

    #[test]
    fn test_field_setters_upsert() {
        let (mut store, _) = store_with_run();
        let day = date("2025-06-02");

        store.set_day_type(day, DayType::Show).unwrap();
        store.set_day_type(day, DayType::TravelShow).unwrap();
        store.set_day_time(day, "19:30").unwrap();
        store.set_show_pay(day, "300").unwrap();
        store.set_gas_estimate(day, "abc").unwrap();
        store.set_venue(day, "The Roxy").unwrap();
        store.set_travel_from(day, "Denver").unwrap();
        store.set_travel_to(day, "Boulder").unwrap();
        store.set_lodging_location(day, "Hotel").unwrap();
        let run = store.set_lodging_cost(day, "110").unwrap();

        assert_eq!(run.day_type(day), DayType::TravelShow);
        assert_eq!(run.day_times[&day], "19:30");
        assert_eq!(run.show_pays[&day], "300");
        assert_eq!(run.gas_estimates[&day], "abc");
        assert_eq!(run.venues[&day], "The Roxy");
        assert_eq!(run.travel_from[&day], "Denver");
        assert_eq!(run.travel_to[&day], "Boulder");
        let lodging = run.lodging_for(day).unwrap();
        assert_eq!(lodging.location, "Hotel");
        assert_eq!(lodging.cost, "110");
        assert_eq!(run.lodging.len(), 3);
    }

    #[test]
    fn test_lodging_outside_run_rejected() {
        let (mut store, run_id) = store_with_run();
        let before = store.run(&run_id).unwrap().clone();

        assert!(matches!(
            store.set_lodging_cost(date("2025-07-01"), "500"),
            Err(Error::DateOutsideRun { .. })
        ));
        assert!(matches!(
            store.set_lodging_location(date("2025-05-31"), "Motel"),
            Err(Error::DateOutsideRun { .. })
        ));

        let run = store.run(&run_id).unwrap();
        assert_eq!(run, &before);
        assert_eq!(run.lodging.len(), 3);
        let summary = totals(run, &DayDefaults::default());
        assert_eq!(summary.lodging, 0.0);
    }

    #[test]
    fn test_setters_require_selection() {
        let mut store = RunStore::new();
        assert!(matches!(
            store.set_venue(date("2025-06-01"), "Roxy"),
            Err(Error::NoRunSelected)
        ));
    }
}
