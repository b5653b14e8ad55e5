//! Property-based tests for balance arithmetic and multi-year planning.
//!
//! - net always satisfies the balance identity
//! - free always equals physical minus accrued income plus accrued expense
//! - a multi-year plan sums to per-year amount times the year count, with
//!   exactly one NORMAL year when the collection year is in range

use chrono::NaiveDate;
use dernek_shared::types::Currency;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{CashBalance, FreeBalance, MovementTotals};
use super::multi_year::{plan_multi_year, MultiYearRequest};
use super::types::AccrualStatus;

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_balance_identity(
        opening in signed_amount(),
        income in amount(),
        expense in amount(),
        transfers_in in amount(),
        transfers_out in amount(),
    ) {
        let balance = CashBalance::from_totals(
            Currency::Tl,
            opening,
            MovementTotals { income, expense, transfers_in, transfers_out },
        );
        prop_assert_eq!(
            balance.opening + balance.total_income - balance.total_expense
                - balance.transfers_out + balance.transfers_in,
            balance.net
        );
    }

    #[test]
    fn prop_free_identity(
        physical in signed_amount(),
        accrued_income in amount(),
        accrued_expense in amount(),
    ) {
        let view = FreeBalance::new(physical, accrued_income, accrued_expense, Vec::new());
        prop_assert_eq!(view.free + view.accrued_income - view.accrued_expense, view.physical);
    }

    #[test]
    fn prop_multi_year_plan(
        start in 2000i32..2040,
        span in 0i32..10,
        collection_offset in -3i32..13,
        cents in 1i64..1_000_000,
    ) {
        let end = start + span;
        let collection_year = start + collection_offset;
        let per_year = Decimal::new(cents, 2);
        let request = MultiYearRequest {
            start_year: start,
            end_year: end,
            per_year_amount: per_year,
            collection_date: NaiveDate::from_ymd_opt(collection_year, 3, 15).unwrap(),
            description: String::new(),
        };

        let plan = plan_multi_year(&request).unwrap();
        let total: Decimal = plan.iter().map(|e| e.amount).sum();
        prop_assert_eq!(total, per_year * Decimal::from(span + 1));
        prop_assert_eq!(plan.len(), request.year_count());

        for entry in &plan {
            let expected = if entry.year == collection_year {
                AccrualStatus::Normal
            } else if entry.year > collection_year {
                AccrualStatus::Prepaid
            } else {
                AccrualStatus::Retroactive
            };
            prop_assert_eq!(entry.status, expected);
        }

        let normal = plan.iter().filter(|e| e.status == AccrualStatus::Normal).count();
        let in_range = (start..=end).contains(&collection_year);
        prop_assert_eq!(normal, usize::from(in_range));
    }
}
