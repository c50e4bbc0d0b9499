//! Entity re-exports.

pub use super::account_categories::Entity as AccountCategories;
pub use super::account_sub_types::Entity as AccountSubTypes;
pub use super::account_types::Entity as AccountTypes;
pub use super::accounts::Entity as Accounts;
pub use super::ledgers::Entity as Ledgers;
pub use super::transaction_legs::Entity as TransactionLegs;
pub use super::transactions::Entity as Transactions;
