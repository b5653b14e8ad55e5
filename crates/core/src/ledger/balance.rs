//! Cash account balance arithmetic.
//!
//! A balance is the opening amount plus every movement dated after the last
//! closure and up to the requested date. Everything before the last closure
//! is already folded into the opening amount.

use chrono::NaiveDate;
use dernek_shared::types::{CashAccountId, Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use crate::accrual::AccrualYearSummary;

/// Physical balance of one cash account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashBalance {
    /// Currency tag of the account.
    pub currency: Currency,
    /// Opening balance carried over by the last closure.
    pub opening: Decimal,
    /// Sum of incomes in the window.
    pub total_income: Decimal,
    /// Sum of expenses in the window.
    pub total_expense: Decimal,
    /// Sum of transfers received in the window.
    pub transfers_in: Decimal,
    /// Sum of transfers sent in the window.
    pub transfers_out: Decimal,
    /// `opening + total_income - total_expense - transfers_out + transfers_in`.
    pub net: Decimal,
}

/// Sums feeding a [`CashBalance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementTotals {
    /// Sum of incomes.
    pub income: Decimal,
    /// Sum of expenses.
    pub expense: Decimal,
    /// Sum of incoming transfers.
    pub transfers_in: Decimal,
    /// Sum of outgoing transfers.
    pub transfers_out: Decimal,
}

impl CashBalance {
    /// Builds the balance and its net from the opening amount and movements.
    #[must_use]
    pub fn from_totals(currency: Currency, opening: Decimal, totals: MovementTotals) -> Self {
        let net = opening + totals.income - totals.expense - totals.transfers_out
            + totals.transfers_in;
        Self {
            currency,
            opening,
            total_income: totals.income,
            total_expense: totals.expense,
            transfers_in: totals.transfers_in,
            transfers_out: totals.transfers_out,
            net,
        }
    }

    /// Net balance tagged with the account currency.
    #[must_use]
    pub const fn net_money(&self) -> Money {
        Money::new(self.net, self.currency)
    }
}

/// Physical versus spendable view of a cash account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeBalance {
    /// Physical balance.
    pub physical: Decimal,
    /// Income collected for later years.
    pub accrued_income: Decimal,
    /// Expense paid for later years.
    pub accrued_expense: Decimal,
    /// `physical - accrued_income + accrued_expense`.
    pub free: Decimal,
    /// Active accruals per later year.
    pub by_year: Vec<AccrualYearSummary>,
}

impl FreeBalance {
    /// Builds the free view from the physical balance and accrued totals.
    #[must_use]
    pub fn new(
        physical: Decimal,
        accrued_income: Decimal,
        accrued_expense: Decimal,
        by_year: Vec<AccrualYearSummary>,
    ) -> Self {
        Self {
            physical,
            accrued_income,
            accrued_expense,
            free: physical - accrued_income + accrued_expense,
            by_year,
        }
    }
}

/// Date bounds of the movements counted in a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// Exclusive lower bound: the last closure date.
    pub after: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub until: Option<NaiveDate>,
}

impl DateWindow {
    /// Returns true if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.after.is_none_or(|after| date > after) && self.until.is_none_or(|until| date <= until)
    }
}

/// Window for a balance as of `as_of` on an account last closed on `last_closure`.
///
/// # Errors
///
/// Returns `AsOfBeforeClosure` when `as_of` predates the last closure.
pub fn balance_window(
    last_closure: Option<NaiveDate>,
    as_of: Option<NaiveDate>,
) -> Result<DateWindow, LedgerError> {
    if let (Some(closed_on), Some(as_of)) = (last_closure, as_of) {
        if as_of < closed_on {
            return Err(LedgerError::AsOfBeforeClosure { as_of, closed_on });
        }
    }
    Ok(DateWindow {
        after: last_closure,
        until: as_of,
    })
}

/// Checks that a record dated `date` may still be posted to or removed from
/// `account`. Dates up to the last closure are folded into the opening
/// balance and are frozen.
///
/// # Errors
///
/// Returns `PeriodClosed` when `date` is on or before `last_closure`.
pub fn ensure_open(
    account: CashAccountId,
    last_closure: Option<NaiveDate>,
    date: NaiveDate,
) -> Result<(), LedgerError> {
    match last_closure {
        Some(closed_on) if date <= closed_on => Err(LedgerError::PeriodClosed {
            account,
            date,
            closed_on,
        }),
        _ => Ok(()),
    }
}
