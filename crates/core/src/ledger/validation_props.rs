//! Property-based tests for the double-entry balance law.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::types::LegInput;
use super::validation::validate_legs;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for one side of a posting.
fn leg_amounts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(positive_amount(), 1..6)
}

fn legs(amounts: &[Decimal]) -> Vec<LegInput> {
    amounts
        .iter()
        .map(|a| LegInput::new(AccountId::new(), *a))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any debit side balanced by a single credit of the same total is accepted.
    #[test]
    fn prop_balanced_legs_accepted(debits in leg_amounts()) {
        let total: Decimal = debits.iter().copied().sum();
        let totals = validate_legs(&legs(&debits), &legs(&[total])).unwrap();

        prop_assert!(totals.is_balanced);
        prop_assert_eq!(totals.debit, total);
        prop_assert_eq!(totals.credit, total);
    }

    /// Splitting the same total differently on each side still balances.
    #[test]
    fn prop_balanced_after_resplit(debits in leg_amounts(), cut_cents in 1i64..100) {
        let total: Decimal = debits.iter().copied().sum();
        let cut = Decimal::new(cut_cents, 2);
        prop_assume!(cut < total);

        let credits = vec![cut, total - cut];
        prop_assert!(validate_legs(&legs(&debits), &legs(&credits)).is_ok());
    }

    /// Off-by-one-cent postings are always rejected.
    #[test]
    fn prop_off_by_one_cent_rejected(debits in leg_amounts(), over in any::<bool>()) {
        let total: Decimal = debits.iter().copied().sum();
        let cent = Decimal::new(1, 2);
        let credit = if over { total + cent } else { total - cent };
        prop_assume!(credit > Decimal::ZERO);

        let result = validate_legs(&legs(&debits), &legs(&[credit]));
        let is_imbalanced = matches!(result, Err(LedgerError::ImbalancedTransaction { .. }));
        prop_assert!(is_imbalanced);
    }

    /// A zero leg anywhere is rejected even when totals match.
    #[test]
    fn prop_zero_amount_rejected(amount in positive_amount()) {
        let debits = legs(&[amount, Decimal::ZERO]);
        let credits = legs(&[amount]);

        let result = validate_legs(&debits, &credits);
        let is_zero = matches!(result, Err(LedgerError::ZeroAmount(_)));
        prop_assert!(is_zero);
    }

    /// A negative leg is rejected even when totals match.
    #[test]
    fn prop_negative_amount_rejected(amount in positive_amount(), neg in positive_amount()) {
        let debits = legs(&[amount + neg, -neg]);
        let credits = legs(&[amount]);

        let result = validate_legs(&debits, &credits);
        let is_negative = matches!(result, Err(LedgerError::NegativeAmount(_)));
        prop_assert!(is_negative);
    }

    /// A leg with a fifth decimal place is rejected even when totals match.
    #[test]
    fn prop_sub_scale_amount_rejected(cents in 0i64..100_000_000i64, extra in 1i64..10) {
        let amount = Decimal::new(cents * 1000 + extra, 5);
        let result = validate_legs(&legs(&[amount]), &legs(&[amount]));
        let is_scale = matches!(result, Err(LedgerError::AmountScale(_)));
        prop_assert!(is_scale);
    }

    /// Trailing zeros past four places do not count against the scale.
    #[test]
    fn prop_trailing_zeros_accepted(amount in positive_amount()) {
        let padded = amount * Decimal::new(100_000, 5);
        prop_assert!(validate_legs(&legs(&[padded]), &legs(&[amount])).is_ok());
    }
}
