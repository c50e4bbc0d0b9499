//! Business rule validation for postings.

use rust_decimal::Decimal;
use tally_shared::types::fits_amount_scale;

use super::error::LedgerError;
use super::types::{LegInput, Side, TransactionTotals};

/// Validates the legs of a posting and returns its totals.
///
/// Both sides must be non-empty and the two sums exactly equal. Every amount
/// must be strictly positive and fit the four-place money scale, so the stored
/// legs balance exactly as validated.
///
/// # Errors
///
/// Returns the first rule the legs break.
pub fn validate_legs(
    debit_legs: &[LegInput],
    credit_legs: &[LegInput],
) -> Result<TransactionTotals, LedgerError> {
    if debit_legs.is_empty() {
        return Err(LedgerError::MissingLegs(Side::Debit));
    }
    if credit_legs.is_empty() {
        return Err(LedgerError::MissingLegs(Side::Credit));
    }

    for leg in debit_legs.iter().chain(credit_legs) {
        if leg.amount.is_zero() {
            return Err(LedgerError::ZeroAmount(leg.account_id.into_inner()));
        }
        if leg.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount(leg.account_id.into_inner()));
        }
        if !fits_amount_scale(leg.amount) {
            return Err(LedgerError::AmountScale(leg.account_id.into_inner()));
        }
    }

    let totals = TransactionTotals::new(
        debit_legs.iter().map(|l| l.amount).sum(),
        credit_legs.iter().map(|l| l.amount).sum(),
    );

    if !totals.is_balanced {
        return Err(LedgerError::ImbalancedTransaction {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(totals)
}
