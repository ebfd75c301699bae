//! Run data model - runs, transactions, day types and lodging.
//!
//! These types are the persisted shape of the ledger. Field names serialize in
//! camelCase and every collection defaults to empty, so records written before a
//! field existed still load.

use crate::core::calendar::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Per-date values of a run, ordered by date.
pub type DateMap<T> = BTreeMap<NaiveDate, T>;

/// Direction of a transaction. The stored amount is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
}

impl TransactionKind {
    /// `1.0` for income, `-1.0` for expenses.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Income => 1.0,
            Self::Expense => -1.0,
        }
    }

    /// Lowercase name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which derived line a day type produces on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedKind {
    /// Income from playing a show
    ShowPay,
    /// Estimated fuel expense for a driving day
    GasEstimate,
}

/// Classification of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DayType {
    /// No type chosen yet
    #[default]
    #[serde(rename = "")]
    Unset,
    /// Driving day
    Travel,
    /// Show day
    Show,
    /// Day off
    #[serde(rename = "OFF")]
    Off,
    /// Driving to a show played the same day
    #[serde(rename = "Travel/Show")]
    TravelShow,
}

impl DayType {
    /// Name as stored and displayed; empty for [`DayType::Unset`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Travel => "Travel",
            Self::Show => "Show",
            Self::Off => "OFF",
            Self::TravelShow => "Travel/Show",
        }
    }

    /// The derived line this day type puts on the calendar, if any.
    ///
    /// Travel/Show days earn show pay only; no gas estimate is derived for them.
    #[must_use]
    pub const fn derived_kind(self) -> Option<DerivedKind> {
        match self {
            Self::Show | Self::TravelShow => Some(DerivedKind::ShowPay),
            Self::Travel => Some(DerivedKind::GasEstimate),
            Self::Off | Self::Unset => None,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Free-form description
    pub description: String,
    /// Positive amount in dollars
    pub amount: f64,
    /// Calendar day this transaction belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Transaction {
    /// Amount with the direction applied: positive for income, negative for expenses.
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount.abs()
    }

    /// Moves a leading `YYYY-MM-DD:` token out of the description into `date`.
    ///
    /// Does nothing when the transaction already has a date or the description
    /// carries no such token.
    pub fn lift_date_prefix(&mut self) {
        if self.date.is_some() {
            return;
        }
        if let Some((date, rest)) = split_date_prefix(&self.description) {
            self.description = rest.to_string();
            self.date = Some(date);
        }
    }
}

/// Accommodation for one night of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodgingEntry {
    /// Night this entry covers
    pub date: NaiveDate,
    /// Hotel, host or venue name
    #[serde(default)]
    pub location: String,
    /// Raw decimal cost as entered
    #[serde(default)]
    pub cost: String,
}

impl LodgingEntry {
    /// An empty lodging row for `date`.
    #[must_use]
    pub const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            location: String::new(),
            cost: String::new(),
        }
    }
}

/// One road trip with a bounded date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Opaque identifier, unique within the store
    pub id: String,
    /// Display title
    pub title: String,
    /// First day of the run
    pub start_date: NaiveDate,
    /// Last day of the run, inclusive
    pub end_date: NaiveDate,
    /// Transactions, newest first
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Day type chosen per date; absent means [`DayType::Unset`]
    #[serde(default)]
    pub day_types: DateMap<DayType>,
    /// Start time of the day's main event, as entered (e.g. `"19:30"`)
    #[serde(default)]
    pub day_times: DateMap<String>,
    /// Raw show pay per date
    #[serde(default)]
    pub show_pays: DateMap<String>,
    /// Raw gas estimate per date
    #[serde(default)]
    pub gas_estimates: DateMap<String>,
    /// Venue name per show date
    #[serde(default)]
    pub venues: DateMap<String>,
    /// Departure place per travel date
    #[serde(default)]
    pub travel_from: DateMap<String>,
    /// Destination per travel date
    #[serde(default)]
    pub travel_to: DateMap<String>,
    /// One entry per day in range, in date order
    #[serde(default)]
    pub lodging: Vec<LodgingEntry>,
}

impl Run {
    /// Creates an empty run with one blank lodging row per day in range.
    #[must_use]
    pub fn new(id: String, title: String, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id,
            title,
            start_date,
            end_date,
            transactions: Vec::new(),
            day_types: DateMap::new(),
            day_times: DateMap::new(),
            show_pays: DateMap::new(),
            gas_estimates: DateMap::new(),
            venues: DateMap::new(),
            travel_from: DateMap::new(),
            travel_to: DateMap::new(),
            lodging: DateRange::new(start_date, end_date)
                .map(LodgingEntry::empty)
                .collect(),
        }
    }

    /// Effective day type for `date`, [`DayType::Unset`] when none was chosen.
    #[must_use]
    pub fn day_type(&self, date: NaiveDate) -> DayType {
        self.day_types.get(&date).copied().unwrap_or_default()
    }

    /// Whether `date` falls within `start_date..=end_date`.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// The lodging row for `date`, if the run has one.
    #[must_use]
    pub fn lodging_for(&self, date: NaiveDate) -> Option<&LodgingEntry> {
        self.lodging.iter().find(|entry| entry.date == date)
    }

    /// Lodging row for `date`, inserted in date order when missing.
    ///
    /// Returns `None` for a date outside the run; no row is created for it.
    pub fn lodging_entry_mut(&mut self, date: NaiveDate) -> Option<&mut LodgingEntry> {
        if !self.contains_date(date) {
            return None;
        }
        let index = match self.lodging.binary_search_by_key(&date, |entry| entry.date) {
            Ok(index) => index,
            Err(index) => {
                self.lodging.insert(index, LodgingEntry::empty(date));
                index
            }
        };
        self.lodging.get_mut(index)
    }
}

/// Splits `"2025-06-02: snacks"` into the date and the remaining text.
///
/// Requires exactly four digits, dash, two digits, dash, two digits and a colon
/// at the very start. A token that is not a real calendar date is not a match.
#[must_use]
pub fn split_date_prefix(description: &str) -> Option<(NaiveDate, &str)> {
    let bytes = description.as_bytes();
    if bytes.len() < 11 || bytes[10] != b':' {
        return None;
    }
    let shape_ok = bytes[..10].iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }
    let date = NaiveDate::parse_from_str(&description[..10], "%Y-%m-%d").ok()?;
    Some((date, description[11..].trim_start()))
}

/// Parses a stored decimal string. Anything that is not a finite number counts as zero.
#[must_use]
pub fn parse_decimal(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}
