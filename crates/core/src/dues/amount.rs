//! Annual dues resolution.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::DuesError;
use crate::members::MemberProjection;

/// Resolves the annual amount owed by `member`.
///
/// A custom amount on the member wins outright. Otherwise `requested` (a
/// per-member amount from bulk generation) or `default` is used, reduced by
/// the member's discount percentage and rounded to cents.
///
/// # Errors
///
/// Returns `InvalidDiscount` for a discount outside `[0, 100)` and
/// `NonPositiveOwed` when the result is not positive.
pub fn resolve_annual_dues(
    member: &MemberProjection,
    requested: Option<Decimal>,
    default: Decimal,
) -> Result<Decimal, DuesError> {
    if let Some(custom) = member.custom_annual_dues {
        return ensure_positive(custom);
    }

    let base = requested.unwrap_or(default);
    let owed = match member.discount_percent {
        Some(discount) if discount.is_zero() => base,
        Some(discount) => {
            if discount.is_sign_negative() || discount >= Decimal::ONE_HUNDRED {
                return Err(DuesError::InvalidDiscount(discount));
            }
            (base * (Decimal::ONE_HUNDRED - discount) / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        }
        None => base,
    };
    ensure_positive(owed)
}

fn ensure_positive(amount: Decimal) -> Result<Decimal, DuesError> {
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(DuesError::NonPositiveOwed(amount))
    }
}
