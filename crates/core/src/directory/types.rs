//! Directory domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountCategoryId, AccountId, AccountSubTypeId, AccountTypeId, UserId};

/// Well-known account type classification.
///
/// Reports only care about a handful of type names; anything else is carried
/// through as `Other` so user-defined types still round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Asset accounts.
    Assets,
    /// Income accounts.
    Income,
    /// Expense accounts.
    Expenses,
    /// Liability accounts.
    Liabilities,
    /// Equity accounts.
    Equity,
    /// Any other user-defined type name.
    #[serde(untagged)]
    Other(String),
}

impl AccountKind {
    /// Classifies an account type name. Matching is case-insensitive.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "assets" => Self::Assets,
            "income" => Self::Income,
            "expenses" => Self::Expenses,
            "liabilities" => Self::Liabilities,
            "equity" => Self::Equity,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the canonical type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Assets => "assets",
            Self::Income => "income",
            Self::Expenses => "expenses",
            Self::Liabilities => "liabilities",
            Self::Equity => "equity",
            Self::Other(name) => name,
        }
    }

    /// Balance as shown to a reader.
    ///
    /// Storage is type-agnostic (debit adds, credit subtracts). Income accounts
    /// therefore hold negative balances and are negated for display only.
    #[must_use]
    pub fn presentation_balance(&self, stored: Decimal) -> Decimal {
        match self {
            Self::Income => -stored,
            _ => stored,
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountType {
    /// Type ID.
    pub id: AccountTypeId,
    /// Type name, e.g. "assets".
    pub type_name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl AccountType {
    /// Returns the classification of this type.
    #[must_use]
    pub fn kind(&self) -> AccountKind {
        AccountKind::from_type_name(&self.type_name)
    }
}

/// An account sub-type, owned by exactly one account type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSubType {
    /// Sub-type ID.
    pub id: AccountSubTypeId,
    /// Sub-type name.
    pub sub_type_name: String,
    /// Owning account type.
    pub account_type_id: AccountTypeId,
    /// Optional description.
    pub description: Option<String>,
}

/// A reporting category. Cross-cuts account types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCategory {
    /// Category ID.
    pub id: AccountCategoryId,
    /// Category name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Free-form label, e.g. "received" or "paid".
    pub category_type: String,
}

/// An account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type_id: AccountTypeId,
    /// Account sub-type.
    pub account_sub_type_id: AccountSubTypeId,
    /// Reporting category.
    pub account_category_id: AccountCategoryId,
    /// Balance at creation.
    pub opening_balance: Decimal,
    /// Opening balance plus the net effect of every posting.
    pub current_balance: Decimal,
    /// Creator.
    pub created_by: UserId,
    /// Whether postings may reference this account.
    pub is_active: bool,
    /// Optional description.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// The slice of an account that reports classify by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedAccount {
    /// Account ID.
    pub id: AccountId,
    /// Account name.
    pub account_name: String,
    /// Classification derived from the account type name.
    pub kind: AccountKind,
    /// Reporting category.
    pub category_id: AccountCategoryId,
}

/// Result of recomputing an account balance from its posting history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceVerification {
    /// Account ID.
    pub account_id: AccountId,
    /// Balance held on the account row.
    pub stored_balance: Decimal,
    /// Opening balance plus debits minus credits.
    pub computed_balance: Decimal,
    /// `stored_balance - computed_balance`.
    pub difference: Decimal,
    /// True when the two agree.
    pub is_consistent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("assets", AccountKind::Assets)]
    #[case("Assets", AccountKind::Assets)]
    #[case(" income ", AccountKind::Income)]
    #[case("EXPENSES", AccountKind::Expenses)]
    #[case("liabilities", AccountKind::Liabilities)]
    #[case("equity", AccountKind::Equity)]
    #[case("suspense", AccountKind::Other("suspense".to_string()))]
    fn test_kind_from_type_name(#[case] name: &str, #[case] expected: AccountKind) {
        assert_eq!(AccountKind::from_type_name(name), expected);
    }

    #[test]
    fn test_presentation_negates_income_only() {
        assert_eq!(AccountKind::Income.presentation_balance(dec!(-500)), dec!(500));
        assert_eq!(AccountKind::Assets.presentation_balance(dec!(1500)), dec!(1500));
        assert_eq!(AccountKind::Liabilities.presentation_balance(dec!(-20)), dec!(-20));
    }

    #[test]
    fn test_kind_serializes_as_type_name() {
        assert_eq!(serde_json::to_string(&AccountKind::Assets).unwrap(), "\"assets\"");
        assert_eq!(
            serde_json::to_string(&AccountKind::Other("suspense".into())).unwrap(),
            "\"suspense\""
        );
    }
}
