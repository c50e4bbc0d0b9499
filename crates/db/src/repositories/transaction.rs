//! Transaction repository for posting and reading double-entry transactions.
//!
//! A posting is one database transaction: lock every referenced account row in
//! ID order, validate, apply one atomic increment per account, then insert the
//! header and its legs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::ledger::{
    AccountInfo, LedgerError, LedgerService, Leg, LegInput, PostTransactionInput, Side,
    Transaction, TransactionPatch, validate_legs,
};
use tally_shared::types::{AccountId, PageRequest, PageResponse, TransactionId};
use uuid::Uuid;

use super::ledger::LedgerRepoError;
use crate::entities::{
    accounts, sea_orm_active_enums::LegSide, transaction_legs, transactions,
};

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Earliest `created_at`, inclusive.
    pub from: Option<DateTime<Utc>>,
    /// Latest `created_at`, inclusive.
    pub to: Option<DateTime<Utc>>,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a balanced transaction and updates every referenced account balance.
    ///
    /// All-or-nothing: any failure before commit drops the database transaction,
    /// which rolls back every balance update.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Legs are missing, non-positive, or do not balance
    /// - A referenced account does not exist or is inactive
    /// - Database operation fails
    pub async fn post_transaction(
        &self,
        input: PostTransactionInput,
    ) -> Result<Transaction, LedgerRepoError> {
        // Reject malformed postings before touching the database.
        validate_legs(&input.debit_legs, &input.credit_legs)?;

        let account_ids: Vec<Uuid> =
            LedgerService::referenced_accounts(&input.debit_legs, &input.credit_legs)
                .into_iter()
                .map(AccountId::into_inner)
                .collect();

        let txn = self.db.begin().await?;

        let locked = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .order_by_asc(accounts::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let infos: HashMap<AccountId, AccountInfo> = locked
            .into_iter()
            .map(|a| {
                let id = AccountId::from_uuid(a.id);
                (
                    id,
                    AccountInfo {
                        id,
                        is_active: a.is_active,
                    },
                )
            })
            .collect();

        let prepared = LedgerService::prepare_posting(&input, |id| {
            infos
                .get(&id)
                .cloned()
                .ok_or(LedgerError::AccountNotFound(id.into_inner()))
        })?;

        let now = Utc::now();
        for delta in &prepared.deltas {
            accounts::Entity::update_many()
                .col_expr(
                    accounts::Column::CurrentBalance,
                    Expr::col(accounts::Column::CurrentBalance).add(delta.delta),
                )
                .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
                .filter(accounts::Column::Id.eq(delta.account_id.into_inner()))
                .exec(&txn)
                .await?;
        }

        let transaction_id = TransactionId::new().into_inner();
        let header = transactions::ActiveModel {
            id: Set(transaction_id),
            description: Set(prepared.description.clone()),
            amount: Set(prepared.amount),
            created_by: Set(input.created_by.into_inner()),
            is_posted: Set(false),
            notes: Set(input.notes.clone()),
            transaction_type: Set(input.transaction_type.into()),
            payment_type: Set(input.payment_type.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let legs = leg_models(transaction_id, &prepared.debit_legs, &prepared.credit_legs);
        transaction_legs::Entity::insert_many(
            legs.iter()
                .cloned()
                .map(Into::<transaction_legs::ActiveModel>::into),
        )
        .exec_without_returning(&txn)
        .await?;

        txn.commit().await?;

        tracing::debug!(
            transaction_id = %transaction_id,
            accounts = prepared.deltas.len(),
            amount = %prepared.amount,
            "Transaction posted"
        );

        Ok(assemble(header, legs))
    }

    /// Lists transactions newest first, with legs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Transaction>, LedgerRepoError> {
        let mut query = transactions::Entity::find();

        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::CreatedAt.lte(to));
        }

        let total = query.clone().count(&self.db).await?;

        let headers = query
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let data = with_legs(&self.db, headers).await?;
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Gets a transaction with its legs.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if it does not exist.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, LedgerRepoError> {
        find_transaction(&self.db, id).await
    }

    /// Updates the descriptive fields of a transaction.
    ///
    /// Legs and amount are never touched.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` or `MissingDescription`.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, LedgerRepoError> {
        let patch = LedgerService::validate_patch(patch)?;

        let header = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?;

        if patch.is_empty() {
            return find_transaction(&self.db, id).await;
        }

        let mut active: transactions::ActiveModel = header.into();
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(transaction_type) = patch.transaction_type {
            active.transaction_type = Set(transaction_type.into());
        }
        if let Some(payment_type) = patch.payment_type {
            active.payment_type = Set(payment_type.into());
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        let legs = legs_for(&self.db, &[updated.id]).await?.remove(&updated.id);
        Ok(assemble(updated, legs.unwrap_or_default()))
    }

    /// Answers a delete request. The ledger is append-only, so this only ever
    /// yields the reason for refusing.
    ///
    /// `TransactionNotFound` if it does not exist, otherwise `TransactionImmutable`.
    pub async fn delete_transaction(&self, id: TransactionId) -> LedgerRepoError {
        match transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
        {
            Ok(Some(_)) => LedgerService::deletion_refusal(id).into(),
            Ok(None) => LedgerError::TransactionNotFound(id.into_inner()).into(),
            Err(e) => e.into(),
        }
    }
}

/// Loads one transaction with its legs.
pub(crate) async fn find_transaction<C: ConnectionTrait>(
    conn: &C,
    id: TransactionId,
) -> Result<Transaction, LedgerRepoError> {
    let header = transactions::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?;

    let legs = legs_for(conn, &[header.id]).await?.remove(&header.id);
    Ok(assemble(header, legs.unwrap_or_default()))
}

/// Attaches legs to a batch of headers, keeping header order.
pub(crate) async fn with_legs<C: ConnectionTrait>(
    conn: &C,
    headers: Vec<transactions::Model>,
) -> Result<Vec<Transaction>, sea_orm::DbErr> {
    let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
    let mut legs = legs_for(conn, &ids).await?;

    Ok(headers
        .into_iter()
        .map(|h| {
            let own = legs.remove(&h.id).unwrap_or_default();
            assemble(h, own)
        })
        .collect())
}

/// Loads legs for a set of transactions in one query, grouped by transaction.
async fn legs_for<C: ConnectionTrait>(
    conn: &C,
    transaction_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<transaction_legs::Model>>, sea_orm::DbErr> {
    if transaction_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let legs = transaction_legs::Entity::find()
        .filter(transaction_legs::Column::TransactionId.is_in(transaction_ids.iter().copied()))
        .order_by_asc(transaction_legs::Column::TransactionId)
        .order_by_asc(transaction_legs::Column::Position)
        .all(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<transaction_legs::Model>> = HashMap::new();
    for leg in legs {
        grouped.entry(leg.transaction_id).or_default().push(leg);
    }
    Ok(grouped)
}

fn leg_models(
    transaction_id: Uuid,
    debit_legs: &[LegInput],
    credit_legs: &[LegInput],
) -> Vec<transaction_legs::Model> {
    let side_models = |side: Side, legs: &[LegInput]| {
        legs.iter()
            .zip(0i32..)
            .map(|(leg, position)| transaction_legs::Model {
                id: Uuid::now_v7(),
                transaction_id,
                account_id: leg.account_id.into_inner(),
                side: side.into(),
                position,
                amount: leg.amount,
            })
            .collect::<Vec<_>>()
    };

    let mut models = side_models(Side::Debit, debit_legs);
    models.extend(side_models(Side::Credit, credit_legs));
    models
}

/// Builds the domain transaction from a header and its legs.
pub(crate) fn assemble(
    header: transactions::Model,
    mut legs: Vec<transaction_legs::Model>,
) -> Transaction {
    legs.sort_by_key(|l| l.position);

    let (debits, credits): (Vec<_>, Vec<_>) =
        legs.into_iter().partition(|l| l.side == LegSide::Debit);
    let to_leg = |l: transaction_legs::Model| Leg {
        account_id: l.account_id.into(),
        amount: l.amount,
    };

    Transaction {
        id: header.id.into(),
        description: header.description,
        debit_legs: debits.into_iter().map(to_leg).collect(),
        credit_legs: credits.into_iter().map(to_leg).collect(),
        created_by: header.created_by.into(),
        amount: header.amount,
        is_posted: header.is_posted,
        notes: header.notes,
        transaction_type: header.transaction_type.into(),
        payment_type: header.payment_type.into(),
        created_at: header.created_at.with_timezone(&Utc),
    }
}
