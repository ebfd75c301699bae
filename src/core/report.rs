//! Report generation - plain-text views of a run.
//!
//! Everything here is a stateless rendering of the model: amounts, calendar
//! cells, the transaction list, and the per-day summary table with totals.

use crate::core::{
    calendar::{CalendarDay, DayDefaults, DerivedLine, calendar, group_transactions},
    model::{DerivedKind, Run, Transaction, parse_decimal},
    totals::{sum_amounts, totals},
};

/// Formats a signed amount with currency.
///
/// # Returns
/// Formatted string like "+$50.00" or "-$25.50"
#[must_use]
pub fn format_amount(amount: f64) -> String {
    if amount >= 0.0 {
        format!("+${amount:.2}")
    } else {
        format!("-${:.2}", amount.abs())
    }
}

/// One transaction as `"-$10.00 snacks"`.
#[must_use]
pub fn format_transaction(transaction: &Transaction) -> String {
    format!(
        "{} {}",
        format_amount(transaction.signed_amount()),
        transaction.description
    )
}

/// A derived day line, e.g. `"+$300.00 Show Pay @ The Roxy"`.
#[must_use]
pub fn format_derived_line(line: &DerivedLine) -> String {
    let amount = format_amount(line.amount);
    match (line.kind, line.label.as_deref()) {
        (DerivedKind::ShowPay, Some(venue)) => format!("{amount} Show Pay @ {venue}"),
        (DerivedKind::ShowPay, None) => format!("{amount} Show Pay"),
        (DerivedKind::GasEstimate, Some(route)) => format!("{amount} Estimated Gas {route}"),
        (DerivedKind::GasEstimate, None) => format!("{amount} Estimated Gas"),
    }
}

/// Text of one calendar cell: a header line followed by indented items.
#[must_use]
pub fn render_day(day: &CalendarDay<'_>) -> String {
    let mut header = day.date.to_string();
    if !day.day_type.as_str().is_empty() {
        header.push_str("  ");
        header.push_str(day.day_type.as_str());
    }
    if let Some(time) = day.start_time {
        header.push_str("  Start: ");
        header.push_str(time);
    }

    let mut lines = vec![header];
    if let Some(line) = &day.line {
        lines.push(format!("  {}", format_derived_line(line)));
    }
    lines.extend(
        day.transactions
            .iter()
            .map(|transaction| format!("  {}", format_transaction(transaction))),
    );
    if let Some(lodging) = day.lodging.filter(|entry| !entry.location.trim().is_empty()) {
        let cost = parse_decimal(&lodging.cost);
        lines.push(format!("  Lodging: {} (${cost:.2})", lodging.location.trim()));
    }
    lines.join("\n")
}

/// The calendar of a run, one cell per day, cells separated by blank lines.
#[must_use]
pub fn render_calendar(run: &Run, defaults: &DayDefaults) -> String {
    calendar(run, defaults)
        .iter()
        .map(render_day)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// All transactions, newest first, with the undated ones marked.
#[must_use]
pub fn render_transactions(run: &Run) -> String {
    if run.transactions.is_empty() {
        return "No transactions yet.".to_string();
    }
    run.transactions
        .iter()
        .map(|transaction| match transaction.date {
            Some(date) => format!("{date}  {}", format_transaction(transaction)),
            None => format!("{:<10}  {}", "other", format_transaction(transaction)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary table: one row per day with its derived line, lodging and
/// transaction subtotal, followed by the run totals.
#[must_use]
pub fn render_summary(run: &Run, defaults: &DayDefaults) -> String {
    let mut lines = vec![
        format!("{} ({} to {})", run.title, run.start_date, run.end_date),
        format!(
            "{:<10}  {:<11}  {:>10}  {:>10}  {:>12}",
            "Date", "Type", "Day", "Lodging", "Transactions"
        ),
    ];

    for day in calendar(run, defaults) {
        let derived = day
            .line
            .as_ref()
            .map_or_else(String::new, |line| format_amount(line.amount));
        let lodging = day
            .lodging
            .map(|entry| parse_decimal(&entry.cost))
            .filter(|cost| *cost != 0.0)
            .map_or_else(String::new, |cost| format!("${:.2}", cost.abs()));
        let day_transactions = sum_amounts(
            day.transactions
                .iter()
                .map(|transaction| transaction.signed_amount()),
        );
        let transactions = if day.transactions.is_empty() {
            String::new()
        } else {
            format_amount(day_transactions)
        };
        lines.push(format!(
            "{:<10}  {:<11}  {:>10}  {:>10}  {:>12}",
            day.date.to_string(),
            day.day_type.as_str(),
            derived,
            lodging,
            transactions
        ));
    }

    let undated = group_transactions(&run.transactions).other;
    if !undated.is_empty() {
        let other = sum_amounts(
            undated
                .iter()
                .map(|transaction| transaction.signed_amount()),
        );
        lines.push(format!(
            "{:<10}  {:<11}  {:>10}  {:>10}  {:>12}",
            "other",
            "",
            "",
            "",
            format_amount(other)
        ));
    }

    let summary = totals(run, defaults);
    lines.push(String::new());
    lines.push(format!("Income:   ${:.2}", summary.income));
    lines.push(format!("Expenses: ${:.2}", summary.expense));
    lines.push(format!("Net:      {}", format_amount(summary.net)));
    if summary.lodging > 0.0 {
        lines.push(format!("Lodging:  ${:.2}", summary.lodging));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::model::{DayType, TransactionKind};
    use crate::test_utils::{date, sample_run, scenario_store};

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(50.0), "+$50.00");
        assert_eq!(format_amount(123.456), "+$123.46");
        assert_eq!(format_amount(-25.5), "-$25.50");
        assert_eq!(format_amount(0.0), "+$0.00");
    }

    #[test]
    fn test_format_derived_line() {
        let show = DerivedLine {
            kind: DerivedKind::ShowPay,
            amount: 300.0,
            label: Some("The Roxy".to_string()),
        };
        assert_eq!(format_derived_line(&show), "+$300.00 Show Pay @ The Roxy");

        let gas = DerivedLine {
            kind: DerivedKind::GasEstimate,
            amount: -75.0,
            label: Some("Denver to Boulder".to_string()),
        };
        assert_eq!(
            format_derived_line(&gas),
            "-$75.00 Estimated Gas Denver to Boulder"
        );
    }

    #[test]
    fn test_scenario_calendar_cell() {
        let store = scenario_store();
        let run = store.selected_run().unwrap();
        let cells = calendar(run, &DayDefaults::default());

        let cell = render_day(&cells[1]);
        assert_eq!(
            cell,
            "2025-06-02  Show\n  +$300.00 Show Pay\n  -$10.00 snacks"
        );
        assert_eq!(render_day(&cells[0]), "2025-06-01");
    }

    #[test]
    fn test_scenario_summary_net() {
        let store = scenario_store();
        let run = store.selected_run().unwrap();
        let summary = render_summary(run, &DayDefaults::default());

        assert!(summary.starts_with("Summer Run (2025-06-01 to 2025-06-03)"));
        assert!(summary.contains("Income:   $300.00"));
        assert!(summary.contains("Expenses: $10.00"));
        assert!(summary.contains("Net:      +$290.00"));
        assert!(!summary.contains("Lodging:"));
    }

    #[test]
    fn test_travel_default_in_summary() {
        let mut run = sample_run("2025-06-01", "2025-06-01");
        run.day_types.insert(date("2025-06-01"), DayType::Travel);

        let summary = render_summary(&run, &DayDefaults::default());
        assert!(summary.contains("-$75.00"));
        assert!(summary.contains("Net:      -$75.00"));
    }

    #[test]
    fn test_render_day_with_details() {
        let mut run = sample_run("2025-06-01", "2025-06-01");
        let day = date("2025-06-01");
        run.day_types.insert(day, DayType::Travel);
        run.day_times.insert(day, "09:00".to_string());
        run.travel_from.insert(day, "Denver".to_string());
        run.travel_to.insert(day, "Boulder".to_string());
        run.gas_estimates.insert(day, "42".to_string());
        let lodging = run.lodging_entry_mut(day).unwrap();
        lodging.location = "Hostel".to_string();
        lodging.cost = "35".to_string();

        let cells = calendar(&run, &DayDefaults::default());
        assert_eq!(
            render_day(&cells[0]),
            "2025-06-01  Travel  Start: 09:00\n  -$42.00 Estimated Gas Denver to Boulder\n  Lodging: Hostel ($35.00)"
        );
    }

    #[test]
    fn test_render_transactions() {
        let mut run = sample_run("2025-06-01", "2025-06-02");
        assert_eq!(render_transactions(&run), "No transactions yet.");

        run.transactions = vec![
            Transaction {
                kind: TransactionKind::Income,
                description: "merch".to_string(),
                amount: 60.0,
                date: None,
            },
            Transaction {
                kind: TransactionKind::Expense,
                description: "tolls".to_string(),
                amount: 8.25,
                date: Some(date("2025-06-01")),
            },
        ];
        assert_eq!(
            render_transactions(&run),
            "other       +$60.00 merch\n2025-06-01  -$8.25 tolls"
        );
    }

    #[test]
    fn test_summary_lists_undated_and_lodging() {
        let mut run = sample_run("2025-06-01", "2025-06-01");
        run.transactions.push(Transaction {
            kind: TransactionKind::Income,
            description: "merch".to_string(),
            amount: 60.0,
            date: None,
        });
        run.lodging_entry_mut(date("2025-06-01")).unwrap().cost = "80".to_string();

        let summary = render_summary(&run, &DayDefaults::default());
        assert!(summary.contains("other"));
        assert!(summary.contains("$80.00"));
        assert!(summary.contains("Lodging:  $80.00"));
        assert!(summary.contains("Net:      +$60.00"));
    }
}
