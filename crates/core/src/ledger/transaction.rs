//! Stored transaction aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, TransactionId, UserId};

use super::types::{PaymentType, Side, TransactionType};

/// One stored leg of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// The account posted to.
    pub account_id: AccountId,
    /// Positive amount.
    pub amount: Decimal,
}

/// A posted double-entry transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Transaction description.
    pub description: String,
    /// Debit legs in posting order.
    pub debit_legs: Vec<Leg>,
    /// Credit legs in posting order.
    pub credit_legs: Vec<Leg>,
    /// User who posted the transaction.
    pub created_by: UserId,
    /// Total debit (= total credit).
    pub amount: Decimal,
    /// Whether the ledger projection has absorbed this transaction.
    pub is_posted: bool,
    /// Optional notes.
    pub notes: Option<String>,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Payment type.
    pub payment_type: PaymentType,
    /// When the transaction was posted.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Iterates every leg with its side.
    pub fn legs(&self) -> impl Iterator<Item = (Side, &Leg)> {
        self.debit_legs
            .iter()
            .map(|leg| (Side::Debit, leg))
            .chain(self.credit_legs.iter().map(|leg| (Side::Credit, leg)))
    }

    /// Returns true if `account_id` appears on either side.
    #[must_use]
    pub fn references(&self, account_id: AccountId) -> bool {
        self.legs().any(|(_, leg)| leg.account_id == account_id)
    }

    /// Sum of this account's debit legs.
    #[must_use]
    pub fn debit_amount_for(&self, account_id: AccountId) -> Decimal {
        Self::sum_for(&self.debit_legs, account_id)
    }

    /// Sum of this account's credit legs.
    #[must_use]
    pub fn credit_amount_for(&self, account_id: AccountId) -> Decimal {
        Self::sum_for(&self.credit_legs, account_id)
    }

    /// Account of the first debit leg.
    #[must_use]
    pub fn first_debit_account(&self) -> Option<AccountId> {
        self.debit_legs.first().map(|leg| leg.account_id)
    }

    /// Account of the first credit leg.
    #[must_use]
    pub fn first_credit_account(&self) -> Option<AccountId> {
        self.credit_legs.first().map(|leg| leg.account_id)
    }

    fn sum_for(legs: &[Leg], account_id: AccountId) -> Decimal {
        legs.iter()
            .filter(|leg| leg.account_id == account_id)
            .map(|leg| leg.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_transaction(debits: Vec<Leg>, credits: Vec<Leg>) -> Transaction {
        let amount = debits.iter().map(|l| l.amount).sum();
        Transaction {
            id: TransactionId::new(),
            description: "test".to_string(),
            debit_legs: debits,
            credit_legs: credits,
            created_by: UserId::new(),
            amount,
            is_posted: false,
            notes: None,
            transaction_type: TransactionType::Transfer,
            payment_type: PaymentType::Cash,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_per_account_amounts_sum_split_legs() {
        let cash = AccountId::new();
        let bank = AccountId::new();
        let sales = AccountId::new();
        let tx = make_transaction(
            vec![
                Leg { account_id: cash, amount: dec!(100) },
                Leg { account_id: bank, amount: dec!(50) },
                Leg { account_id: cash, amount: dec!(25) },
            ],
            vec![Leg { account_id: sales, amount: dec!(175) }],
        );

        assert_eq!(tx.debit_amount_for(cash), dec!(125));
        assert_eq!(tx.credit_amount_for(cash), dec!(0));
        assert_eq!(tx.credit_amount_for(sales), dec!(175));
        assert!(tx.references(bank));
        assert!(!tx.references(AccountId::new()));
        assert_eq!(tx.first_debit_account(), Some(cash));
        assert_eq!(tx.first_credit_account(), Some(sales));
        assert_eq!(tx.legs().count(), 4);
    }
}
