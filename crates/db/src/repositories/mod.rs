//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod directory;
pub mod ledger;
pub mod report;
pub mod transaction;

pub use account::{
    AccountFilter, AccountRepository, AccountWithRefs, CreateAccountInput, UpdateAccountInput,
};
pub use directory::{
    CreateAccountCategoryInput, CreateAccountSubTypeInput, CreateAccountTypeInput,
    DirectoryRepoError, DirectoryRepository, UpdateAccountCategoryInput,
    UpdateAccountSubTypeInput, UpdateAccountTypeInput,
};
pub use ledger::{AppliedTransaction, LedgerRepoError, LedgerRepository};
pub use report::{AccountLedgerView, ReportRepoError, ReportRepository};
pub use transaction::{TransactionFilter, TransactionRepository};
