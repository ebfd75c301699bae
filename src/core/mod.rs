//! Core ledger logic - framework-agnostic run model, aggregation, totals and storage.

/// Per-day view of a run: date sequence, derived lines, transaction grouping
pub mod calendar;
/// Run, transaction, day type and lodging types
pub mod model;
/// Saving and restoring the store through the key-value table
pub mod persistence;
/// Plain-text rendering of runs
pub mod report;
/// Store bound to a database connection, saved after every change
pub mod session;
/// Run collection, selection and all mutations
pub mod store;
/// Income, expense and net totals
pub mod totals;

pub use calendar::{CalendarDay, DayDefaults, DerivedLine, calendar, run_dates};
pub use model::{DayType, LodgingEntry, Run, Transaction, TransactionKind};
pub use session::LedgerSession;
pub use store::RunStore;
pub use totals::{Totals, net_total, totals};
