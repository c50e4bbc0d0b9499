//! Financial report generation.
//!
//! Pure folds over a window of posted transactions:
//! - Opening and closing asset balances
//! - Profit and loss
//! - Received/paid activity by category
//! - Per-account ledger detail with running balance

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
