//! Ledger projection repository.
//!
//! Ledger rows are opened explicitly per account and move only when a stored
//! transaction is applied to them, once.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::ledger::{LedgerError, LedgerService, apply_deltas};
use tally_shared::types::{AccountId, LedgerId, TransactionId};
use uuid::Uuid;

use super::transaction::find_transaction;
use crate::entities::{accounts, ledgers, transactions};

/// Error types for posting and ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerRepoError {
    /// Ledger rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl LedgerRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Result of applying a transaction to the ledger projection.
#[derive(Debug, Clone)]
pub struct AppliedTransaction {
    /// The transaction applied.
    pub transaction_id: TransactionId,
    /// Ledger rows after the update, in account ID order.
    pub ledgers: Vec<ledgers::Model>,
}

/// Ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens the ledger row for an account with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `LedgerAlreadyOpen`.
    pub async fn open_ledger(&self, account_id: AccountId) -> Result<ledgers::Model, LedgerRepoError> {
        let uuid = account_id.into_inner();

        accounts::Entity::find_by_id(uuid)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(uuid))?;

        let existing = ledgers::Entity::find()
            .filter(ledgers::Column::AccountId.eq(uuid))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(LedgerError::LedgerAlreadyOpen(uuid).into());
        }

        let now = Utc::now().into();
        let model = ledgers::ActiveModel {
            id: Set(LedgerId::new().into_inner()),
            account_id: Set(uuid),
            balance: Set(Decimal::ZERO),
            last_updated: Set(now),
            created_at: Set(now),
        };

        Ok(model.insert(&self.db).await?)
    }

    /// Gets the ledger row of an account.
    ///
    /// # Errors
    ///
    /// Returns `LedgerNotFound` if the account has no ledger row.
    pub async fn get_ledger(&self, account_id: AccountId) -> Result<ledgers::Model, LedgerRepoError> {
        let ledger = ledgers::Entity::find()
            .filter(ledgers::Column::AccountId.eq(account_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(LedgerError::LedgerNotFound(account_id.into_inner()))?;

        Ok(ledger)
    }

    /// Applies a stored transaction to the ledger rows of every account it touches.
    ///
    /// Runs in one database transaction. The transaction row is locked so two
    /// concurrent applications cannot both pass the `is_posted` check.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The transaction does not exist
    /// - It was already applied
    /// - Any referenced account has no ledger row (nothing is written)
    pub async fn apply_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<AppliedTransaction, LedgerRepoError> {
        let txn = self.db.begin().await?;

        transactions::Entity::find_by_id(transaction_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransactionNotFound(transaction_id.into_inner()))?;
        let transaction = find_transaction(&txn, transaction_id).await?;

        let account_ids: Vec<Uuid> = transaction
            .legs()
            .map(|(_, leg)| leg.account_id.into_inner())
            .collect();
        let rows = ledgers::Entity::find()
            .filter(ledgers::Column::AccountId.is_in(account_ids))
            .order_by_asc(ledgers::Column::AccountId)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let mut balances: HashMap<AccountId, Decimal> = rows
            .iter()
            .map(|r| (AccountId::from_uuid(r.account_id), r.balance))
            .collect();

        let deltas =
            LedgerService::prepare_projection(&transaction, |id| balances.contains_key(&id))?;
        apply_deltas(&mut balances, &deltas);

        let now = Utc::now();
        let mut updated = Vec::with_capacity(rows.len());
        for row in rows {
            let balance = balances
                .get(&AccountId::from_uuid(row.account_id))
                .copied()
                .unwrap_or(row.balance);
            let mut active: ledgers::ActiveModel = row.into();
            active.balance = Set(balance);
            active.last_updated = Set(now.into());
            updated.push(active.update(&txn).await?);
        }

        transactions::Entity::update_many()
            .col_expr(transactions::Column::IsPosted, Expr::value(true))
            .col_expr(transactions::Column::UpdatedAt, Expr::value(now))
            .filter(transactions::Column::Id.eq(transaction_id.into_inner()))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(AppliedTransaction {
            transaction_id,
            ledgers: updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::{LegSide, PaymentType, TransactionType};
    use crate::entities::transaction_legs;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn header(id: Uuid, is_posted: bool) -> transactions::Model {
        let now = Utc::now().into();
        transactions::Model {
            id,
            description: "Cash sale".to_string(),
            amount: dec!(500),
            created_by: Uuid::now_v7(),
            is_posted,
            notes: None,
            transaction_type: TransactionType::Transfer,
            payment_type: PaymentType::Cash,
            created_at: now,
            updated_at: now,
        }
    }

    fn leg(tx: Uuid, account: Uuid, side: LegSide, amount: Decimal) -> transaction_legs::Model {
        transaction_legs::Model {
            id: Uuid::now_v7(),
            transaction_id: tx,
            account_id: account,
            side,
            position: 0,
            amount,
        }
    }

    fn ledger_row(account: Uuid, balance: Decimal) -> ledgers::Model {
        let now = Utc::now().into();
        ledgers::Model {
            id: Uuid::now_v7(),
            account_id: account,
            balance,
            last_updated: now,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_apply_unknown_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<transactions::Model>::new()])
            .into_connection();
        let repo = LedgerRepository::new(db);

        let err = repo
            .apply_transaction(TransactionId::new())
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "TRANSACTION_NOT_FOUND");
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_apply_twice_is_conflict() {
        let tx = Uuid::now_v7();
        let cash = Uuid::now_v7();
        let sales = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![header(tx, true)]])
            .append_query_results([vec![header(tx, true)]])
            .append_query_results([vec![
                leg(tx, cash, LegSide::Debit, dec!(500)),
                leg(tx, sales, LegSide::Credit, dec!(500)),
            ]])
            .append_query_results([vec![ledger_row(cash, dec!(0)), ledger_row(sales, dec!(0))]])
            .into_connection();
        let repo = LedgerRepository::new(db);

        let err = repo
            .apply_transaction(TransactionId::from_uuid(tx))
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "ALREADY_APPLIED");
        assert_eq!(err.http_status_code(), 409);
    }

    #[tokio::test]
    async fn test_apply_without_ledger_row_writes_nothing() {
        let tx = Uuid::now_v7();
        let cash = Uuid::now_v7();
        let sales = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![header(tx, false)]])
            .append_query_results([vec![header(tx, false)]])
            .append_query_results([vec![
                leg(tx, cash, LegSide::Debit, dec!(500)),
                leg(tx, sales, LegSide::Credit, dec!(500)),
            ]])
            .append_query_results([vec![ledger_row(cash, dec!(0))]])
            .into_connection();
        let repo = LedgerRepository::new(db.clone());

        let err = repo
            .apply_transaction(TransactionId::from_uuid(tx))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerRepoError::Ledger(LedgerError::LedgerNotFound(id)) if id == sales
        ));
        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("UPDATE \\\"ledgers\\\""));
    }

    #[tokio::test]
    async fn test_apply_moves_balances_debit_up_credit_down() {
        let tx = Uuid::now_v7();
        let cash = Uuid::now_v7();
        let sales = Uuid::now_v7();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![header(tx, false)]])
            .append_query_results([vec![header(tx, false)]])
            .append_query_results([vec![
                leg(tx, cash, LegSide::Debit, dec!(500)),
                leg(tx, sales, LegSide::Credit, dec!(500)),
            ]])
            .append_query_results([vec![ledger_row(cash, dec!(100)), ledger_row(sales, dec!(0))]])
            .append_query_results([vec![ledger_row(cash, dec!(600))]])
            .append_query_results([vec![ledger_row(sales, dec!(-500))]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let repo = LedgerRepository::new(db.clone());

        let applied = repo
            .apply_transaction(TransactionId::from_uuid(tx))
            .await
            .unwrap();

        assert_eq!(applied.ledgers.len(), 2);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("600"));
        assert!(log.contains("-500"));
        assert!(log.contains("is_posted"));
    }

    #[tokio::test]
    async fn test_open_ledger_twice_is_conflict() {
        let account = Uuid::now_v7();
        let now = Utc::now().into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![accounts::Model {
                id: account,
                account_name: "Cash".to_string(),
                account_type_id: Uuid::now_v7(),
                account_sub_type_id: Uuid::now_v7(),
                account_category_id: Uuid::now_v7(),
                opening_balance: dec!(0),
                current_balance: dec!(0),
                created_by: Uuid::now_v7(),
                is_active: true,
                description: None,
                created_at: now,
                updated_at: now,
            }]])
            .append_query_results([vec![ledger_row(account, dec!(0))]])
            .into_connection();
        let repo = LedgerRepository::new(db);

        let err = repo
            .open_ledger(AccountId::from_uuid(account))
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "LEDGER_ALREADY_OPEN");
    }
}
