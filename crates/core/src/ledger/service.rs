//! Ledger service for posting validation and projection planning.
//!
//! This module provides the core business logic for validating postings and
//! resolving them into per-account balance deltas before anything is written.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, TransactionId};

use super::error::LedgerError;
use super::transaction::Transaction;
use super::types::{
    BalanceDelta, LegInput, PostTransactionInput, PreparedPosting, Side, TransactionPatch,
};
use super::validation::validate_legs;

/// Information about an account needed for validation.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Ledger service for posting validation and projection planning.
///
/// This service contains pure business logic with no database dependencies.
/// Lookups are passed in as closures so callers decide where data comes from.
pub struct LedgerService;

impl LedgerService {
    /// Validate a posting and resolve it into balance deltas.
    ///
    /// Steps:
    /// 1. Description must be non-blank
    /// 2. Both sides non-empty, every amount positive, totals equal
    /// 3. Every referenced account exists and is active
    /// 4. Legs are folded into one delta per account (debit adds, credit subtracts)
    ///
    /// Every account is looked up before anything is returned, so a caller that
    /// only writes on `Ok` can never apply part of a posting.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn prepare_posting<A>(
        input: &PostTransactionInput,
        account_lookup: A,
    ) -> Result<PreparedPosting, LedgerError>
    where
        A: Fn(AccountId) -> Result<AccountInfo, LedgerError>,
    {
        let description = input.description.trim();
        if description.is_empty() {
            return Err(LedgerError::MissingDescription);
        }

        let totals = validate_legs(&input.debit_legs, &input.credit_legs)?;

        for account_id in Self::referenced_accounts(&input.debit_legs, &input.credit_legs) {
            let info = account_lookup(account_id)?;
            if !info.is_active {
                return Err(LedgerError::AccountInactive(account_id.into_inner()));
            }
        }

        let deltas = Self::aggregate_deltas(
            input
                .debit_legs
                .iter()
                .map(|l| (Side::Debit, l.account_id, l.amount))
                .chain(
                    input
                        .credit_legs
                        .iter()
                        .map(|l| (Side::Credit, l.account_id, l.amount)),
                ),
        );

        Ok(PreparedPosting {
            description: description.to_string(),
            amount: totals.debit,
            debit_legs: input.debit_legs.clone(),
            credit_legs: input.credit_legs.clone(),
            deltas,
        })
    }

    /// Distinct accounts referenced by a set of legs, in ID order.
    #[must_use]
    pub fn referenced_accounts(debit_legs: &[LegInput], credit_legs: &[LegInput]) -> Vec<AccountId> {
        debit_legs
            .iter()
            .chain(credit_legs)
            .map(|l| l.account_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Folds signed legs into one delta per account.
    ///
    /// Output is ordered by account ID, which is also the row lock order used
    /// by the persistence layer.
    pub fn aggregate_deltas<I>(legs: I) -> Vec<BalanceDelta>
    where
        I: IntoIterator<Item = (Side, AccountId, Decimal)>,
    {
        let mut net: BTreeMap<AccountId, Decimal> = BTreeMap::new();
        for (side, account_id, amount) in legs {
            *net.entry(account_id).or_insert(Decimal::ZERO) += side.signed(amount);
        }

        net.into_iter()
            .map(|(account_id, delta)| BalanceDelta { account_id, delta })
            .collect()
    }

    /// Plan the application of a stored transaction to the ledger projection.
    ///
    /// The projection uses the same sign convention as account balances.
    /// Every referenced account must already have a ledger row.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyApplied` if the transaction was applied before, or
    /// `LedgerNotFound` for the first account without a ledger row.
    pub fn prepare_projection<L>(
        transaction: &Transaction,
        ledger_exists: L,
    ) -> Result<Vec<BalanceDelta>, LedgerError>
    where
        L: Fn(AccountId) -> bool,
    {
        if transaction.is_posted {
            return Err(LedgerError::AlreadyApplied(transaction.id.into_inner()));
        }

        let deltas = Self::aggregate_deltas(
            transaction
                .legs()
                .map(|(side, leg)| (side, leg.account_id, leg.amount)),
        );

        if let Some(missing) = deltas.iter().find(|d| !ledger_exists(d.account_id)) {
            return Err(LedgerError::LedgerNotFound(missing.account_id.into_inner()));
        }

        Ok(deltas)
    }

    /// Normalize a patch of a stored transaction's descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns `MissingDescription` if the new description is blank.
    pub fn validate_patch(patch: TransactionPatch) -> Result<TransactionPatch, LedgerError> {
        let description = match patch.description {
            Some(d) => {
                let trimmed = d.trim();
                if trimmed.is_empty() {
                    return Err(LedgerError::MissingDescription);
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        Ok(TransactionPatch {
            description,
            ..patch
        })
    }

    /// The refusal for any delete request. The ledger is append-only.
    #[must_use]
    pub fn deletion_refusal(id: TransactionId) -> LedgerError {
        LedgerError::TransactionImmutable(id.into_inner())
    }
}
