//! Report types.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::money::fixed4;
use tally_shared::types::{AccountCategoryId, AccountId, TransactionId};

use super::error::ReportError;
use crate::directory::ClassifiedAccount;

// ============================================================================
// Date windows
// ============================================================================

/// Midnight UTC at the start of `date`.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// `23:59:59.999` UTC on `date`.
#[must_use]
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + TimeDelta::days(1) - TimeDelta::milliseconds(1)
}

/// Inclusive calendar-date window for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day included.
    pub start_date: NaiveDate,
    /// Last day included, through end of day.
    pub end_date: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if the start is after the end.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, ReportError> {
        if start_date > end_date {
            return Err(ReportError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Parses `startDate`/`endDate` query values.
    ///
    /// # Errors
    ///
    /// Returns `MissingDate`, `InvalidDate` or `InvalidDateRange`.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, ReportError> {
        let start_date = parse_date("startDate", start)?;
        let end_date = parse_date("endDate", end)?;
        Self::new(start_date, end_date)
    }

    /// Lower bound, inclusive.
    #[must_use]
    pub fn start_bound(&self) -> DateTime<Utc> {
        start_of_day(self.start_date)
    }

    /// Upper bound, inclusive, at end of day.
    #[must_use]
    pub fn end_bound(&self) -> DateTime<Utc> {
        end_of_day(self.end_date)
    }

    /// Returns true if `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_bound() && at <= self.end_bound()
    }
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate, ReportError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ReportError::MissingDate(field))?;

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ReportError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

/// Which end of the window an asset snapshot is taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSnapshot {
    /// As of `startDate` 00:00:00.000.
    Opening,
    /// As of `endDate` 23:59:59.999.
    Closing,
}

impl AssetSnapshot {
    /// Cut-off instant for this snapshot.
    #[must_use]
    pub fn as_of(self, range: &DateRange) -> DateTime<Utc> {
        match self {
            Self::Opening => range.start_bound(),
            Self::Closing => range.end_bound(),
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Accounts keyed by ID, used to classify legs.
#[derive(Debug, Clone, Default)]
pub struct AccountIndex {
    accounts: HashMap<AccountId, ClassifiedAccount>,
}

impl AccountIndex {
    /// Builds an index from classified accounts.
    pub fn new(accounts: impl IntoIterator<Item = ClassifiedAccount>) -> Self {
        Self {
            accounts: accounts.into_iter().map(|a| (a.id, a)).collect(),
        }
    }

    /// Looks up an account.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&ClassifiedAccount> {
        self.accounts.get(&id)
    }

    /// Resolves the account of a leg.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedAccount` if the account is unknown.
    pub fn resolve(
        &self,
        transaction_id: TransactionId,
        account_id: AccountId,
    ) -> Result<&ClassifiedAccount, ReportError> {
        self.get(account_id)
            .ok_or_else(|| ReportError::UnresolvedAccount {
                transaction_id: transaction_id.into_inner(),
                account_id: account_id.into_inner(),
            })
    }

    /// Number of indexed accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if no accounts are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

// ============================================================================
// Report outputs
// ============================================================================

/// Amount accumulated for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAmount {
    /// Account ID.
    pub account_id: AccountId,
    /// Account name.
    pub account_name: String,
    /// Accumulated amount.
    #[serde(with = "fixed4")]
    pub amount: Decimal,
}

/// Asset account balances at a cut-off.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalanceReport {
    /// Requested start date.
    pub start_date: NaiveDate,
    /// Requested end date.
    pub end_date: NaiveDate,
    /// Opening or closing snapshot.
    pub snapshot: AssetSnapshot,
    /// Cut-off instant; transactions at or before it are included.
    pub as_of: DateTime<Utc>,
    /// One line per asset account touched, in first-seen order.
    pub accounts: Vec<AccountAmount>,
    /// Sum of all lines.
    #[serde(with = "fixed4")]
    pub total: Decimal,
}

/// Income and expenses over a window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossReport {
    /// Start date.
    pub start_date: NaiveDate,
    /// End date.
    pub end_date: NaiveDate,
    /// Income credits minus income debits.
    #[serde(with = "fixed4")]
    pub total_income: Decimal,
    /// Expense debits minus expense credits.
    #[serde(with = "fixed4")]
    pub total_expenses: Decimal,
    /// `total_income - total_expenses`.
    #[serde(with = "fixed4")]
    pub profit_loss: Decimal,
    /// Net per income account.
    pub income_accounts: Vec<AccountAmount>,
    /// Net per expense account.
    pub expenses_accounts: Vec<AccountAmount>,
}

/// Activity for one category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    /// Category ID.
    pub category_id: AccountCategoryId,
    /// Category name.
    pub category_name: String,
    /// Category label.
    pub category_type: String,
    /// Per-account unsigned totals.
    pub category_accounts_array: Vec<AccountAmount>,
    /// Sum of `category_accounts_array`.
    #[serde(with = "fixed4")]
    pub category_total: Decimal,
}

/// Received/paid activity grouped by category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedPaidReport {
    /// Start date.
    pub start_date: NaiveDate,
    /// End date.
    pub end_date: NaiveDate,
    /// One entry per category, in the order categories were supplied.
    pub categories: Vec<CategoryReport>,
}

/// One transaction in an account ledger report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReportEntry {
    /// Transaction ID.
    pub transaction_id: TransactionId,
    /// When the transaction was posted.
    pub transaction_date: DateTime<Utc>,
    /// Transaction description.
    pub transaction_details: String,
    /// Credits minus debits for the account in this transaction.
    #[serde(with = "fixed4")]
    pub entry_amount: Decimal,
    /// Cumulative `entry_amount` through this transaction.
    #[serde(with = "fixed4")]
    pub running_balance: Decimal,
    /// Name of the counterparty: first leg on the opposite side.
    pub account_name: Option<String>,
}

/// Per-account detail over a window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLedgerReport {
    /// Subject account.
    pub account_id: AccountId,
    /// Start date.
    pub start_date: NaiveDate,
    /// End date.
    pub end_date: NaiveDate,
    /// Entries with a negative `entry_amount`.
    pub debit_entries: Vec<LedgerReportEntry>,
    /// Entries with a zero or positive `entry_amount`.
    pub credit_entries: Vec<LedgerReportEntry>,
    /// Running balance after the last entry.
    #[serde(with = "fixed4")]
    pub closing_balance: Decimal,
}
