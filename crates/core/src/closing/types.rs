//! Year-end closure types.

use chrono::NaiveDate;
use dernek_shared::types::{CashAccountId, Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accrual::AccrualYearSummary;

/// Consistency warnings raised by a closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClosureWarningKind {
    /// Money belonging to later years has already been spent.
    NegativeFreeBalance,
    /// Most of the cash is prepaid income; member attrition would hurt.
    HighAccrualRatio,
}

impl ClosureWarningKind {
    /// Persisted label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NegativeFreeBalance => "CARİ_AÇIK",
            Self::HighAccrualRatio => "YÜKSEK_TAHAKKUK",
        }
    }
}

/// One warning on one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureWarning {
    /// Warning type.
    pub kind: ClosureWarningKind,
    /// Account the warning refers to.
    pub account_id: CashAccountId,
    /// Account display name.
    pub account_name: String,
    /// Human-readable explanation.
    pub message: String,
}

/// Figures gathered for one account before evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFigures {
    /// Account id.
    pub account_id: CashAccountId,
    /// Account display name.
    pub account_name: String,
    /// Currency tag.
    pub currency: Currency,
    /// Physical balance at year end.
    pub physical: Decimal,
    /// Income collected for later years.
    pub accrued_income: Decimal,
    /// Expense paid for later years.
    pub accrued_expense: Decimal,
    /// Accruals per later year.
    pub by_year: Vec<AccrualYearSummary>,
}

/// Snapshot of one account at year end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountClosure {
    /// Account id.
    pub account_id: CashAccountId,
    /// Account display name.
    pub account_name: String,
    /// Currency tag.
    pub currency: Currency,
    /// Physical balance; the next year's opening balance.
    pub physical: Decimal,
    /// Income collected for later years.
    pub accrued_income: Decimal,
    /// Expense paid for later years.
    pub accrued_expense: Decimal,
    /// Spendable balance; the next year's free opening balance.
    pub free: Decimal,
    /// Accruals per later year.
    pub by_year: Vec<AccrualYearSummary>,
}

/// Sums over every account of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureTotals {
    /// Sum of physical balances.
    pub physical: Decimal,
    /// Sum of accrued income.
    pub accrued: Decimal,
    /// Sum of free balances.
    pub free: Decimal,
}

/// Full year-end report, persisted as JSON on confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureReport {
    /// Closed fiscal year.
    pub year: i32,
    /// Closure date; always December 31st of `year`.
    pub closure_date: NaiveDate,
    /// True if nothing was persisted.
    pub simulated: bool,
    /// Per-account snapshots.
    pub accounts: Vec<AccountClosure>,
    /// Warnings over all accounts.
    pub warnings: Vec<ClosureWarning>,
    /// Totals over all accounts.
    pub totals: ClosureTotals,
}

impl ClosureReport {
    /// Returns true if any warning was raised.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Folds a later closure of other accounts in the same year into this
    /// report.
    pub fn absorb(&mut self, other: Self) {
        self.totals.physical += other.totals.physical;
        self.totals.accrued += other.totals.accrued;
        self.totals.free += other.totals.free;
        self.accounts.extend(other.accounts);
        self.warnings.extend(other.warnings);
    }
}
