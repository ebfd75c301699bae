//! Day aggregation - the per-day view of a run.
//!
//! Walks a run's date range one calendar day at a time and, for every day,
//! works out the line its day type implies (show pay or a gas estimate) and
//! which transactions belong to it. Everything here is a pure read of the run.

use crate::core::model::{
    DateMap, DayType, DerivedKind, LodgingEntry, Run, Transaction, parse_decimal,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Amounts used when a show or travel day has no explicit figure.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DayDefaults {
    /// Show pay for a show day without an entry
    pub show_pay: f64,
    /// Gas estimate for a travel day without an entry
    pub gas_estimate: f64,
}

impl Default for DayDefaults {
    fn default() -> Self {
        Self {
            show_pay: 200.0,
            gas_estimate: 75.0,
        }
    }
}

/// Inclusive iterator over calendar days.
///
/// Empty when `start > end`, and stops at the last representable date.
#[derive(Debug, Clone)]
pub struct DateRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DateRange {
    /// Days from `start` through `end`, both included.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            next: (start <= end).then_some(start),
            end,
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = current.succ_opt().filter(|date| *date <= self.end);
        Some(current)
    }
}

/// Every day of the run, first to last.
#[must_use]
pub fn run_dates(run: &Run) -> Vec<NaiveDate> {
    DateRange::new(run.start_date, run.end_date).collect()
}

/// The income or expense a day's type implies.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedLine {
    /// Show pay or gas estimate
    pub kind: DerivedKind,
    /// Signed: show pay is positive, gas is negative
    pub amount: f64,
    /// Venue for show pay, `"from to to"` for gas
    pub label: Option<String>,
}

fn non_empty(map: &DateMap<String>, date: NaiveDate) -> Option<&str> {
    map.get(&date)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

/// Derived line for `date`, or `None` for OFF and unset days.
#[must_use]
pub fn derived_line(run: &Run, date: NaiveDate, defaults: &DayDefaults) -> Option<DerivedLine> {
    let kind = run.day_type(date).derived_kind()?;
    let line = match kind {
        DerivedKind::ShowPay => {
            let pay = run
                .show_pays
                .get(&date)
                .map_or(defaults.show_pay, |raw| parse_decimal(raw));
            DerivedLine {
                kind,
                amount: pay.abs(),
                label: non_empty(&run.venues, date).map(str::to_string),
            }
        }
        DerivedKind::GasEstimate => {
            let gas = run
                .gas_estimates
                .get(&date)
                .map_or(defaults.gas_estimate, |raw| parse_decimal(raw));
            let from = non_empty(&run.travel_from, date);
            let to = non_empty(&run.travel_to, date);
            let label = (from.is_some() || to.is_some()).then(|| {
                format!("{} to {}", from.unwrap_or_default(), to.unwrap_or_default())
            });
            DerivedLine {
                kind,
                amount: -gas.abs(),
                label,
            }
        }
    };
    Some(line)
}

/// Transactions split by the day they belong to.
#[derive(Debug, Default)]
pub struct TransactionGroups<'a> {
    /// Dated transactions, newest first within each day
    pub by_date: BTreeMap<NaiveDate, Vec<&'a Transaction>>,
    /// Transactions with no date; these never appear in a calendar cell
    pub other: Vec<&'a Transaction>,
}

impl<'a> TransactionGroups<'a> {
    /// Transactions dated `date`; empty when there are none.
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> &[&'a Transaction] {
        self.by_date
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Groups transactions by date, keeping their relative order.
#[must_use]
pub fn group_transactions(transactions: &[Transaction]) -> TransactionGroups<'_> {
    let mut groups = TransactionGroups::default();
    for transaction in transactions {
        match transaction.date {
            Some(date) => groups.by_date.entry(date).or_default().push(transaction),
            None => groups.other.push(transaction),
        }
    }
    groups
}

/// Everything shown in one calendar cell.
#[derive(Debug)]
pub struct CalendarDay<'a> {
    /// Day of the run
    pub date: NaiveDate,
    /// [`DayType::Unset`] when none was chosen
    pub day_type: DayType,
    /// Entered start time, if any
    pub start_time: Option<&'a str>,
    /// Venue, when entered and not blank
    pub venue: Option<&'a str>,
    /// Travel origin, when entered
    pub travel_from: Option<&'a str>,
    /// Travel destination, when entered
    pub travel_to: Option<&'a str>,
    /// The lodging row for this day
    pub lodging: Option<&'a LodgingEntry>,
    /// Show pay or gas estimate implied by the day type
    pub line: Option<DerivedLine>,
    /// Transactions dated this day, newest first
    pub transactions: Vec<&'a Transaction>,
}

/// Builds the calendar grid of a run, one cell per day in range.
#[must_use]
pub fn calendar<'a>(run: &'a Run, defaults: &DayDefaults) -> Vec<CalendarDay<'a>> {
    let groups = group_transactions(&run.transactions);
    DateRange::new(run.start_date, run.end_date)
        .map(|date| CalendarDay {
            date,
            day_type: run.day_type(date),
            start_time: non_empty(&run.day_times, date),
            venue: non_empty(&run.venues, date),
            travel_from: non_empty(&run.travel_from, date),
            travel_to: non_empty(&run.travel_to, date),
            lodging: run.lodging_for(date),
            line: derived_line(run, date, defaults),
            transactions: groups.for_date(date).to_vec(),
        })
        .collect()
}
