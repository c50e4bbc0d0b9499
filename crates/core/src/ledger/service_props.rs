//! Property-based tests for posting: balance invariant and atomic rejection.

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, UserId};

use super::balance::apply_deltas;
use super::error::LedgerError;
use super::service::{AccountInfo, LedgerService};
use super::types::{LegInput, PaymentType, PostTransactionInput, TransactionType};

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn opening_balance() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A pool of accounts with opening balances, and a posting drawn from it.
fn posting_scenario()
-> impl Strategy<Value = (Vec<(AccountId, Decimal)>, Vec<(usize, Decimal)>, Vec<usize>)> {
    prop::collection::vec(opening_balance(), 2..6).prop_flat_map(|openings| {
        let n = openings.len();
        let accounts: Vec<(AccountId, Decimal)> =
            openings.into_iter().map(|o| (AccountId::new(), o)).collect();
        (
            Just(accounts),
            prop::collection::vec((0..n, positive_amount()), 1..5),
            prop::collection::vec(0..n, 1..4),
        )
    })
}

fn make_input(debit_legs: Vec<LegInput>, credit_legs: Vec<LegInput>) -> PostTransactionInput {
    PostTransactionInput {
        description: "generated".to_string(),
        debit_legs,
        credit_legs,
        created_by: UserId::new(),
        transaction_type: TransactionType::Transfer,
        payment_type: PaymentType::Bank,
        notes: None,
    }
}

/// Spread `total` over `n` credit legs, remainder on the last.
fn split(total: Decimal, n: usize) -> Vec<Decimal> {
    let cents = (total * Decimal::ONE_HUNDRED).trunc();
    let parts = Decimal::from(n);
    let each = (cents / parts).trunc() / Decimal::ONE_HUNDRED;
    let mut out = vec![each; n];
    let assigned: Decimal = each * Decimal::from(n - 1);
    out[n - 1] = total - assigned;
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// After applying a posting, every account moved by exactly
    /// (its debit legs) - (its credit legs).
    #[test]
    fn prop_balance_invariant((accounts, debit_plan, credit_idx) in posting_scenario()) {
        let debit_legs: Vec<LegInput> = debit_plan
            .iter()
            .map(|(i, amt)| LegInput::new(accounts[*i].0, *amt))
            .collect();
        let total: Decimal = debit_legs.iter().map(|l| l.amount).sum();
        let credit_amounts = split(total, credit_idx.len());
        prop_assume!(credit_amounts.iter().all(|a| *a > Decimal::ZERO));
        let credit_legs: Vec<LegInput> = credit_idx
            .iter()
            .zip(credit_amounts)
            .map(|(i, amt)| LegInput::new(accounts[*i].0, amt))
            .collect();

        let before: HashMap<AccountId, Decimal> = accounts.iter().copied().collect();
        let input = make_input(debit_legs.clone(), credit_legs.clone());
        let posting = LedgerService::prepare_posting(&input, |id| Ok(AccountInfo { id, is_active: true }))
            .unwrap();

        let mut after = before.clone();
        apply_deltas(&mut after, &posting.deltas);

        for (id, opening) in &before {
            let debits: Decimal = debit_legs.iter().filter(|l| l.account_id == *id).map(|l| l.amount).sum();
            let credits: Decimal = credit_legs.iter().filter(|l| l.account_id == *id).map(|l| l.amount).sum();
            prop_assert_eq!(after[id], *opening + debits - credits);
        }

        // Postings never create or destroy value.
        let before_sum: Decimal = before.values().copied().sum();
        let after_sum: Decimal = after.values().copied().sum();
        prop_assert_eq!(before_sum, after_sum);
    }

    /// An unknown account anywhere in the posting rejects it as a whole.
    #[test]
    fn prop_missing_account_rejects_whole_posting(
        (accounts, debit_plan, _credit_idx) in posting_scenario(),
    ) {
        let debit_legs: Vec<LegInput> = debit_plan
            .iter()
            .map(|(i, amt)| LegInput::new(accounts[*i].0, *amt))
            .collect();
        let total: Decimal = debit_legs.iter().map(|l| l.amount).sum();
        let ghost = AccountId::new();
        let input = make_input(debit_legs, vec![LegInput::new(ghost, total)]);

        let known: HashMap<AccountId, Decimal> = accounts.iter().copied().collect();
        let result = LedgerService::prepare_posting(&input, |id| {
            if known.contains_key(&id) {
                Ok(AccountInfo { id, is_active: true })
            } else {
                Err(LedgerError::AccountNotFound(id.into_inner()))
            }
        });

        let is_not_found = matches!(result, Err(LedgerError::AccountNotFound(id)) if id == ghost.into_inner());
        prop_assert!(is_not_found);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_split_keeps_total() {
        let parts = split(dec!(100.01), 3);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.iter().copied().sum::<Decimal>(), dec!(100.01));
    }

    /// Cash (opening 1000) debit 500, Sales (opening 0) credit 500.
    #[test]
    fn test_cash_sale_balances() {
        let cash = AccountId::new();
        let sales = AccountId::new();
        let mut balances = HashMap::from([(cash, dec!(1000)), (sales, dec!(0))]);

        let input = make_input(
            vec![LegInput::new(cash, dec!(500))],
            vec![LegInput::new(sales, dec!(500))],
        );
        let posting =
            LedgerService::prepare_posting(&input, |id| Ok(AccountInfo { id, is_active: true })).unwrap();
        apply_deltas(&mut balances, &posting.deltas);

        assert_eq!(balances[&cash], dec!(1500));
        assert_eq!(balances[&sales], dec!(-500));
    }

    /// Debit 300 against credit 250 is rejected and nothing is applied.
    #[test]
    fn test_imbalanced_posting_leaves_balances() {
        let cash = AccountId::new();
        let sales = AccountId::new();
        let balances = HashMap::from([(cash, dec!(1000)), (sales, dec!(0))]);

        let input = make_input(
            vec![LegInput::new(cash, dec!(300))],
            vec![LegInput::new(sales, dec!(250))],
        );
        let result =
            LedgerService::prepare_posting(&input, |id| Ok(AccountInfo { id, is_active: true }));

        assert!(matches!(result, Err(LedgerError::ImbalancedTransaction { .. })));
        assert_eq!(balances[&cash], dec!(1000));
        assert_eq!(balances[&sales], dec!(0));
    }
}
