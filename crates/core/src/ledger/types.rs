//! Ledger domain types for posting and projection.
//!
//! This module defines the input and output shapes of a posting: legs on each
//! side, the transaction/payment classifications, and the per-account deltas
//! a validated posting resolves to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, UserId};

/// Side of a leg.
///
/// Storage convention for every balance field: a debit adds, a credit subtracts,
/// regardless of account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Debit leg.
    Debit,
    /// Credit leg.
    Credit,
}

impl Side {
    /// Signed effect of `amount` on a stored balance.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => amount,
            Self::Credit => -amount,
        }
    }

    /// Returns the side as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown leg side: {s}")),
        }
    }
}

/// Transaction type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Transfer between accounts.
    Transfer,
    /// Debit transaction.
    Debit,
    /// Credit transaction.
    Credit,
}

impl TransactionType {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::Debit => "Debit",
            Self::Credit => "Credit",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Transfer" => Ok(Self::Transfer),
            "Debit" => Ok(Self::Debit),
            "Credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// How a transaction was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    /// Cash payment.
    Cash,
    /// Bank payment.
    Bank,
}

impl PaymentType {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Bank => "Bank",
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(Self::Cash),
            "Bank" => Ok(Self::Bank),
            _ => Err(format!("Unknown payment type: {s}")),
        }
    }
}

/// One `{accountId, amount}` entry on a side of a posting request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Amount, must be positive.
    pub amount: Decimal,
}

impl LegInput {
    /// Creates a new leg input.
    #[must_use]
    pub const fn new(account_id: AccountId, amount: Decimal) -> Self {
        Self { account_id, amount }
    }
}

/// Input for posting a new transaction.
#[derive(Debug, Clone)]
pub struct PostTransactionInput {
    /// Transaction description.
    pub description: String,
    /// Debit legs, in request order.
    pub debit_legs: Vec<LegInput>,
    /// Credit legs, in request order.
    pub credit_legs: Vec<LegInput>,
    /// Authenticated user posting the transaction.
    pub created_by: UserId,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Payment type.
    pub payment_type: PaymentType,
    /// Optional notes.
    pub notes: Option<String>,
}

/// Patch for the descriptive fields of a stored transaction.
///
/// Legs and amounts are not part of the patch; they never change after posting.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    /// New description.
    pub description: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// New transaction type.
    pub transaction_type: Option<TransactionType>,
    /// New payment type.
    pub payment_type: Option<PaymentType>,
}

impl TransactionPatch {
    /// Returns true if nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.notes.is_none()
            && self.transaction_type.is_none()
            && self.payment_type.is_none()
    }
}

/// Net change to one account's stored balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    /// The account.
    pub account_id: AccountId,
    /// Signed change (debits minus credits).
    pub delta: Decimal,
}

/// Sums of each side of a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether the transaction is balanced (debits == credits).
    pub is_balanced: bool,
}

impl TransactionTotals {
    /// Creates new transaction totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// A validated posting, ready to be written atomically.
#[derive(Debug, Clone)]
pub struct PreparedPosting {
    /// Normalized description.
    pub description: String,
    /// Transaction amount (= total debit = total credit).
    pub amount: Decimal,
    /// Debit legs in request order.
    pub debit_legs: Vec<LegInput>,
    /// Credit legs in request order.
    pub credit_legs: Vec<LegInput>,
    /// One delta per distinct account, ordered by account ID.
    pub deltas: Vec<BalanceDelta>,
}
