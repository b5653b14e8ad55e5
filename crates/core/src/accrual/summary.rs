//! Accrual summaries.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use dernek_shared::types::AccrualId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{AccrualEntry, AccrualKind};

/// Active accruals belonging to one later year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualYearSummary {
    /// Year the money belongs to.
    pub year: i32,
    /// Number of entries.
    pub count: u32,
    /// Sum of income accruals.
    pub income_amount: Decimal,
    /// Sum of expense accruals.
    pub expense_amount: Decimal,
    /// Sum of all entries.
    pub total_amount: Decimal,
}

/// Accrued amounts split by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccruedTotals {
    /// Income collected for later years.
    pub income: Decimal,
    /// Expense paid for later years.
    pub expense: Decimal,
}

fn outstanding(entry: &AccrualEntry, as_of: NaiveDate) -> bool {
    entry.is_active() && entry.belongs_to_year > as_of.year()
}

/// Groups active entries belonging to a year after `as_of`, ascending by year.
#[must_use]
pub fn summarize(entries: &[AccrualEntry], as_of: NaiveDate) -> Vec<AccrualYearSummary> {
    let mut years: BTreeMap<i32, AccrualYearSummary> = BTreeMap::new();

    for entry in entries.iter().filter(|e| outstanding(e, as_of)) {
        let summary = years
            .entry(entry.belongs_to_year)
            .or_insert_with(|| AccrualYearSummary {
                year: entry.belongs_to_year,
                count: 0,
                income_amount: Decimal::ZERO,
                expense_amount: Decimal::ZERO,
                total_amount: Decimal::ZERO,
            });
        summary.count += 1;
        summary.total_amount += entry.amount;
        match entry.kind {
            AccrualKind::Income => summary.income_amount += entry.amount,
            AccrualKind::Expense => summary.expense_amount += entry.amount,
        }
    }

    years.into_values().collect()
}

/// Totals of the outstanding entries by kind.
#[must_use]
pub fn totals_by_kind(entries: &[AccrualEntry], as_of: NaiveDate) -> AccruedTotals {
    entries
        .iter()
        .filter(|e| outstanding(e, as_of))
        .fold(AccruedTotals::default(), |mut totals, entry| {
            match entry.kind {
                AccrualKind::Income => totals.income += entry.amount,
                AccrualKind::Expense => totals.expense += entry.amount,
            }
            totals
        })
}

/// Active entries whose year is realised once `year` is closed.
#[must_use]
pub fn consumable(entries: &[AccrualEntry], year: i32) -> Vec<AccrualId> {
    entries
        .iter()
        .filter(|e| e.is_active() && e.belongs_to_year <= year)
        .map(|e| e.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accrual::AccrualState;
    use rust_decimal_macros::dec;

    fn entry(
        id: i32,
        kind: AccrualKind,
        year: i32,
        amount: Decimal,
        state: AccrualState,
    ) -> AccrualEntry {
        AccrualEntry {
            id: AccrualId(id),
            kind,
            source_id: id,
            collection_year: 2025,
            belongs_to_year: year,
            amount,
            state,
        }
    }

    fn sample() -> Vec<AccrualEntry> {
        vec![
            entry(1, AccrualKind::Income, 2026, dec!(100), AccrualState::Active),
            entry(2, AccrualKind::Income, 2027, dec!(100), AccrualState::Active),
            entry(3, AccrualKind::Expense, 2026, dec!(30), AccrualState::Active),
            entry(4, AccrualKind::Income, 2026, dec!(500), AccrualState::Reversed),
            entry(5, AccrualKind::Income, 2025, dec!(70), AccrualState::Active),
        ]
    }

    #[test]
    fn test_summary_groups_future_active_entries() {
        let as_of = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let summary = summarize(&sample(), as_of);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].year, 2026);
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[0].income_amount, dec!(100));
        assert_eq!(summary[0].expense_amount, dec!(30));
        assert_eq!(summary[0].total_amount, dec!(130));
        assert_eq!(summary[1].year, 2027);
        assert_eq!(summary[1].total_amount, dec!(100));
    }

    #[test]
    fn test_totals_by_kind() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let totals = totals_by_kind(&sample(), as_of);
        assert_eq!(totals.income, dec!(200));
        assert_eq!(totals.expense, dec!(30));

        // A year later only 2027 is still ahead.
        let later = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(totals_by_kind(&sample(), later).income, dec!(100));
    }

    #[test]
    fn test_consumable_after_closing() {
        let ids = consumable(&sample(), 2026);
        assert_eq!(ids, vec![AccrualId(1), AccrualId(3), AccrualId(5)]);
    }
}
