//! Report repository: fetches report inputs and runs the folds.
//!
//! Each report loads the transaction window and the classified account index
//! concurrently, then hands both to [`ReportService`]. Nothing here writes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    QueryTrait,
};
use tally_core::directory::{Account, AccountCategory, AccountKind, ClassifiedAccount};
use tally_core::ledger::Transaction;
use tally_core::reports::{
    AccountIndex, AccountLedgerReport, AssetBalanceReport, AssetSnapshot, DateRange,
    ProfitLossReport, ReceivedPaidReport, ReportError, ReportService,
};
use tally_shared::types::AccountId;
use uuid::Uuid;

use super::transaction::with_legs;
use crate::entities::{account_categories, account_types, accounts, transaction_legs, transactions};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportRepoError {
    /// Report rule violated or fold aborted.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ReportRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Report(e) => e.error_code(),
            Self::Database(_) => "REPORT_GENERATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Report(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Per-account ledger report together with the account it describes.
#[derive(Debug, Clone)]
pub struct AccountLedgerView {
    /// The subject account.
    pub account: Account,
    /// The folded report.
    pub report: AccountLedgerReport,
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// Asset balances at the opening or closing edge of `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching fails or a leg names an unknown account.
    pub async fn asset_balances(
        &self,
        range: DateRange,
        snapshot: AssetSnapshot,
    ) -> Result<AssetBalanceReport, ReportRepoError> {
        let (transactions, accounts) = tokio::try_join!(
            self.fetch_window(None, snapshot.as_of(&range)),
            self.classified_accounts(),
        )?;

        Ok(ReportService::asset_balances(
            &transactions,
            &accounts,
            range,
            snapshot,
        )?)
    }

    /// Profit and loss over `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching fails or a leg names an unknown account.
    pub async fn profit_loss(&self, range: DateRange) -> Result<ProfitLossReport, ReportRepoError> {
        let (transactions, accounts) = tokio::try_join!(
            self.fetch_window(Some(range.start_bound()), range.end_bound()),
            self.classified_accounts(),
        )?;

        Ok(ReportService::profit_loss(&transactions, &accounts, range)?)
    }

    /// Received/paid activity per category over `range`.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching fails or a leg names an unknown account.
    pub async fn received_paid(
        &self,
        range: DateRange,
    ) -> Result<ReceivedPaidReport, ReportRepoError> {
        let (transactions, accounts, categories) = tokio::try_join!(
            self.fetch_window(Some(range.start_bound()), range.end_bound()),
            self.classified_accounts(),
            self.categories(),
        )?;

        Ok(ReportService::received_paid(
            &transactions,
            &accounts,
            &categories,
            range,
        )?)
    }

    /// Ledger detail for one account over `range`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist, or an error if
    /// fetching fails or a counterparty leg names an unknown account.
    pub async fn account_ledger(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<AccountLedgerView, ReportRepoError> {
        let account: Account = accounts::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(ReportError::AccountNotFound(account_id.into_inner()))?
            .into();

        let (transactions, accounts) = tokio::try_join!(
            self.fetch_account_window(account_id, range),
            self.classified_accounts(),
        )?;

        let report = ReportService::account_ledger(&transactions, &accounts, account_id, range)?;

        Ok(AccountLedgerView { account, report })
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Transactions with `from <= created_at <= to`, oldest first.
    async fn fetch_window(
        &self,
        from: Option<DateTime<Utc>>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, DbErr> {
        let mut query = transactions::Entity::find().filter(transactions::Column::CreatedAt.lte(to));
        if let Some(from) = from {
            query = query.filter(transactions::Column::CreatedAt.gte(from));
        }

        let headers = query
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id)
            .all(&self.db)
            .await?;

        with_legs(&self.db, headers).await
    }

    /// Transactions in `range` with at least one leg on `account_id`, oldest first.
    async fn fetch_account_window(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Vec<Transaction>, DbErr> {
        let touching = transaction_legs::Entity::find()
            .select_only()
            .column(transaction_legs::Column::TransactionId)
            .filter(transaction_legs::Column::AccountId.eq(account_id.into_inner()))
            .into_query();

        let headers = transactions::Entity::find()
            .filter(transactions::Column::CreatedAt.gte(range.start_bound()))
            .filter(transactions::Column::CreatedAt.lte(range.end_bound()))
            .filter(transactions::Column::Id.in_subquery(touching))
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id)
            .all(&self.db)
            .await?;

        with_legs(&self.db, headers).await
    }

    /// Every account with the kind of its type resolved.
    async fn classified_accounts(&self) -> Result<AccountIndex, DbErr> {
        let kinds: HashMap<Uuid, AccountKind> = account_types::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, AccountKind::from_type_name(&t.type_name)))
            .collect();

        let accounts = accounts::Entity::find().all(&self.db).await?;

        Ok(AccountIndex::new(accounts.into_iter().map(|a| {
            ClassifiedAccount {
                id: a.id.into(),
                account_name: a.account_name,
                kind: kinds
                    .get(&a.account_type_id)
                    .cloned()
                    .unwrap_or_else(|| AccountKind::Other(String::new())),
                category_id: a.account_category_id.into(),
            }
        })))
    }

    /// Every category in creation order.
    async fn categories(&self) -> Result<Vec<AccountCategory>, DbErr> {
        let categories = account_categories::Entity::find()
            .order_by_asc(account_categories::Column::CreatedAt)
            .order_by_asc(account_categories::Column::Id)
            .all(&self.db)
            .await?;

        Ok(categories.into_iter().map(Into::into).collect())
    }
}
