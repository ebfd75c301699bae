//! Totals calculation - folds derived day lines and transactions into a summary.
//!
//! Totals are recomputed from the run on every call; nothing is cached. Amounts
//! are summed in whole cents so the result does not depend on entry order.

use crate::core::{
    calendar::{DateRange, DayDefaults, derived_line},
    model::{Run, parse_decimal},
};

/// Income, expense and net for a run, in dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    /// Show pay plus income transactions
    pub income: f64,
    /// Gas estimates plus expense transactions, as a positive number
    pub expense: f64,
    /// `income - expense`
    pub net: f64,
    /// Sum of lodging costs, reported separately and not part of `net`
    pub lodging: f64,
}

/// Dollars to whole cents, rounded to the nearest cent.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Whole cents back to dollars.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Sum of signed amounts, added up in cents.
#[must_use]
pub fn sum_amounts(amounts: impl IntoIterator<Item = f64>) -> f64 {
    to_dollars(amounts.into_iter().map(to_cents).sum())
}

#[derive(Default)]
struct CentTotals {
    income: i64,
    expense: i64,
}

impl CentTotals {
    fn add(&mut self, signed_amount: f64) {
        let cents = to_cents(signed_amount);
        if cents >= 0 {
            self.income += cents;
        } else {
            self.expense -= cents;
        }
    }
}

/// Computes the totals of a run.
#[must_use]
pub fn totals(run: &Run, defaults: &DayDefaults) -> Totals {
    let mut cents = CentTotals::default();

    for date in DateRange::new(run.start_date, run.end_date) {
        if let Some(line) = derived_line(run, date, defaults) {
            cents.add(line.amount);
        }
    }

    for transaction in &run.transactions {
        cents.add(transaction.signed_amount());
    }

    Totals {
        income: to_dollars(cents.income),
        expense: to_dollars(cents.expense),
        net: to_dollars(cents.income - cents.expense),
        lodging: sum_amounts(
            run.lodging
                .iter()
                .map(|entry| parse_decimal(&entry.cost).abs()),
        ),
    }
}

/// Net total of a run: derived day lines plus signed transactions.
#[must_use]
pub fn net_total(run: &Run, defaults: &DayDefaults) -> f64 {
    totals(run, defaults).net
}
