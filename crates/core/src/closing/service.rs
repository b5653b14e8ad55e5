//! Year-end closure evaluation.

use chrono::NaiveDate;
use dernek_shared::types::Money;
use rust_decimal::Decimal;

use super::error::ClosingError;
use super::types::{
    AccountClosure, AccountFigures, ClosureReport, ClosureTotals, ClosureWarning,
    ClosureWarningKind,
};

/// Closing service. Turns per-account figures into a report.
#[derive(Debug, Clone, Copy)]
pub struct ClosingService {
    high_accrual_ratio: Decimal,
}

/// December 31st of `year`.
///
/// # Errors
///
/// Returns `InvalidYear` if the date cannot be represented.
pub fn year_end(year: i32) -> Result<NaiveDate, ClosingError> {
    NaiveDate::from_ymd_opt(year, 12, 31).ok_or(ClosingError::InvalidYear(year))
}

impl ClosingService {
    /// Creates a service warning when accrued income exceeds `high_accrual_ratio`
    /// of the physical balance.
    #[must_use]
    pub const fn new(high_accrual_ratio: Decimal) -> Self {
        Self { high_accrual_ratio }
    }

    /// Computes the account snapshot and its warnings.
    #[must_use]
    pub fn evaluate_account(
        &self,
        figures: AccountFigures,
    ) -> (AccountClosure, Vec<ClosureWarning>) {
        let free = figures.physical - figures.accrued_income + figures.accrued_expense;
        let money = |amount| Money::new(amount, figures.currency);
        let mut warnings = Vec::new();

        if free < Decimal::ZERO {
            warnings.push(ClosureWarning {
                kind: ClosureWarningKind::NegativeFreeBalance,
                account_id: figures.account_id,
                account_name: figures.account_name.clone(),
                message: format!(
                    "{}: free balance is {}; money collected for later years has been spent",
                    figures.account_name,
                    money(free)
                ),
            });
        }

        if figures.physical > Decimal::ZERO
            && figures.accrued_income > self.high_accrual_ratio * figures.physical
        {
            warnings.push(ClosureWarning {
                kind: ClosureWarningKind::HighAccrualRatio,
                account_id: figures.account_id,
                account_name: figures.account_name.clone(),
                message: format!(
                    "{}: {} of {} is prepaid income; departing members would need refunds",
                    figures.account_name,
                    money(figures.accrued_income),
                    money(figures.physical)
                ),
            });
        }

        let closure = AccountClosure {
            account_id: figures.account_id,
            account_name: figures.account_name,
            currency: figures.currency,
            physical: figures.physical,
            accrued_income: figures.accrued_income,
            accrued_expense: figures.accrued_expense,
            free,
            by_year: figures.by_year,
        };
        (closure, warnings)
    }

    /// Builds the report for `year` over the given accounts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidYear` for an unrepresentable year and `NoAccounts`
    /// when there is nothing to close.
    pub fn build_report(
        &self,
        year: i32,
        simulated: bool,
        accounts: Vec<AccountFigures>,
    ) -> Result<ClosureReport, ClosingError> {
        let closure_date = year_end(year)?;
        if accounts.is_empty() {
            return Err(ClosingError::NoAccounts);
        }

        let mut closures = Vec::with_capacity(accounts.len());
        let mut warnings = Vec::new();
        let mut totals = ClosureTotals::default();

        for figures in accounts {
            let (closure, account_warnings) = self.evaluate_account(figures);
            totals.physical += closure.physical;
            totals.accrued += closure.accrued_income;
            totals.free += closure.free;
            closures.push(closure);
            warnings.extend(account_warnings);
        }

        Ok(ClosureReport {
            year,
            closure_date,
            simulated,
            accounts: closures,
            warnings,
            totals,
        })
    }
}
