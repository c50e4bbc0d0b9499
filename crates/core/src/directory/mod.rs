//! Account directory: the reference data every posting and report classifies against.
//!
//! - Account types (assets, income, expenses, liabilities, equity, ...)
//! - Account sub-types, each owned by one type
//! - Account categories used for received/paid grouping
//! - Accounts themselves, carrying the authoritative current balance

pub mod error;
pub mod service;
pub mod types;

pub use error::DirectoryError;
pub use service::DirectoryService;
pub use types::{
    Account, AccountCategory, AccountKind, AccountSubType, AccountType, BalanceVerification,
    ClassifiedAccount,
};
