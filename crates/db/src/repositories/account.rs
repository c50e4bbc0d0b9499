//! Account repository for the account directory.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::directory::{
    Account, AccountCategory, AccountKind, AccountSubType, AccountType, BalanceVerification,
    DirectoryError, DirectoryService,
};
use tally_shared::types::{AccountCategoryId, AccountId, AccountSubTypeId, AccountTypeId, UserId};
use uuid::Uuid;

use super::directory::DirectoryRepoError;
use crate::entities::{
    account_categories, account_sub_types, account_types, accounts, ledgers,
    sea_orm_active_enums::LegSide, transaction_legs,
};

/// Account with its classification resolved.
#[derive(Debug, Clone)]
pub struct AccountWithRefs {
    /// The account.
    pub account: Account,
    /// Its account type.
    pub account_type: AccountType,
    /// Its sub-type.
    pub sub_type: AccountSubType,
    /// Its reporting category.
    pub category: AccountCategory,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type_id: AccountTypeId,
    /// Account sub-type; must belong to the account type.
    pub account_sub_type_id: AccountSubTypeId,
    /// Reporting category.
    pub account_category_id: AccountCategoryId,
    /// Opening balance; current balance starts here.
    pub opening_balance: Decimal,
    /// Authenticated user creating the account.
    pub created_by: UserId,
    /// Whether postings may reference the account.
    pub is_active: bool,
    /// Description.
    pub description: Option<String>,
}

/// Input for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// Account name.
    pub account_name: Option<String>,
    /// Account type.
    pub account_type_id: Option<AccountTypeId>,
    /// Account sub-type.
    pub account_sub_type_id: Option<AccountSubTypeId>,
    /// Reporting category.
    pub account_category_id: Option<AccountCategoryId>,
    /// New opening balance. Current balance moves by the same amount.
    pub opening_balance: Option<Decimal>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
    /// Description.
    pub description: Option<Option<String>>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Account type name, matched case-insensitively.
    pub account_type: Option<String>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account with `current_balance = opening_balance`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is blank
    /// - The opening balance has more than four decimal places
    /// - The type, sub-type or category does not exist
    /// - The sub-type belongs to another type
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<AccountWithRefs, DirectoryRepoError> {
        let account_name = DirectoryService::require_name("accountName", &input.account_name)?;
        DirectoryService::validate_amount("openingBalance", input.opening_balance)?;
        let (account_type, sub_type, category) = Self::resolve_classification(
            &self.db,
            input.account_type_id,
            input.account_sub_type_id,
            input.account_category_id,
        )
        .await?;

        let now = chrono::Utc::now().into();
        let model = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            account_name: Set(account_name),
            account_type_id: Set(input.account_type_id.into_inner()),
            account_sub_type_id: Set(input.account_sub_type_id.into_inner()),
            account_category_id: Set(input.account_category_id.into_inner()),
            opening_balance: Set(input.opening_balance),
            current_balance: Set(input.opening_balance),
            created_by: Set(input.created_by.into_inner()),
            is_active: Set(input.is_active),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(&self.db).await?;
        Ok(AccountWithRefs {
            account: model.into(),
            account_type,
            sub_type,
            category,
        })
    }

    /// Lists accounts with their classification, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<AccountWithRefs>, DirectoryRepoError> {
        let refs = self.load_refs().await?;

        let mut query = accounts::Entity::find()
            .order_by_asc(accounts::Column::AccountName)
            .order_by_asc(accounts::Column::Id);

        if let Some(type_name) = filter.account_type.as_deref() {
            let wanted = AccountKind::from_type_name(type_name);
            let type_ids: Vec<Uuid> = refs
                .types
                .values()
                .filter(|t| t.kind() == wanted)
                .map(|t| t.id.into_inner())
                .collect();
            query = query.filter(accounts::Column::AccountTypeId.is_in(type_ids));
        }

        let models = query.all(&self.db).await?;
        models.into_iter().map(|m| refs.attach(m)).collect()
    }

    /// Finds an account with its classification.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if it does not exist.
    pub async fn find_account(&self, id: AccountId) -> Result<AccountWithRefs, DirectoryRepoError> {
        let model = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountNotFound(id.into_inner()))?;

        let refs = self.load_refs().await?;
        refs.attach(model)
    }

    /// Updates an account.
    ///
    /// The row is locked for the duration so a concurrent posting cannot
    /// interleave with the opening-balance shift.
    ///
    /// # Errors
    ///
    /// Returns an error if the account or a new reference does not exist,
    /// the resulting type/sub-type pair disagrees, the name is blank, or the
    /// new opening balance has more than four decimal places.
    pub async fn update_account(
        &self,
        id: AccountId,
        input: UpdateAccountInput,
    ) -> Result<AccountWithRefs, DirectoryRepoError> {
        if let Some(opening) = input.opening_balance {
            DirectoryService::validate_amount("openingBalance", opening)?;
        }

        let txn = self.db.begin().await?;

        let model = accounts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(DirectoryError::AccountNotFound(id.into_inner()))?;

        let type_id = input
            .account_type_id
            .unwrap_or_else(|| AccountTypeId::from_uuid(model.account_type_id));
        let sub_type_id = input
            .account_sub_type_id
            .unwrap_or_else(|| AccountSubTypeId::from_uuid(model.account_sub_type_id));
        let category_id = input
            .account_category_id
            .unwrap_or_else(|| AccountCategoryId::from_uuid(model.account_category_id));
        let (account_type, sub_type, category) =
            Self::resolve_classification(&txn, type_id, sub_type_id, category_id).await?;

        let (opening_balance, current_balance) = (model.opening_balance, model.current_balance);

        let mut active: accounts::ActiveModel = model.into();
        if let Some(name) = input.account_name {
            active.account_name = Set(DirectoryService::require_name("accountName", &name)?);
        }
        active.account_type_id = Set(type_id.into_inner());
        active.account_sub_type_id = Set(sub_type_id.into_inner());
        active.account_category_id = Set(category_id.into_inner());
        if let Some(new_opening) = input.opening_balance {
            let shift = DirectoryService::opening_balance_shift(opening_balance, new_opening);
            active.opening_balance = Set(new_opening);
            active.current_balance = Set(current_balance + shift);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(AccountWithRefs {
            account: updated.into(),
            account_type,
            sub_type,
            category,
        })
    }

    /// Deletes an account that has never been posted to and has no ledger row.
    ///
    /// # Errors
    ///
    /// Returns `InUse` if legs or a ledger row reference the account.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), DirectoryRepoError> {
        let uuid = id.into_inner();
        accounts::Entity::find_by_id(uuid)
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountNotFound(uuid))?;

        let leg_count = transaction_legs::Entity::find()
            .filter(transaction_legs::Column::AccountId.eq(uuid))
            .count(&self.db)
            .await?;
        if leg_count > 0 {
            return Err(DirectoryError::InUse {
                entity: "Account",
                id: uuid,
                referenced_by: "transactions",
            }
            .into());
        }

        let ledger_count = ledgers::Entity::find()
            .filter(ledgers::Column::AccountId.eq(uuid))
            .count(&self.db)
            .await?;
        if ledger_count > 0 {
            return Err(DirectoryError::InUse {
                entity: "Account",
                id: uuid,
                referenced_by: "ledgers",
            }
            .into());
        }

        accounts::Entity::delete_by_id(uuid).exec(&self.db).await?;
        Ok(())
    }

    /// Recomputes an account's balance from its leg history.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn verify_balance(&self, id: AccountId) -> Result<BalanceVerification, DirectoryRepoError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountNotFound(id.into_inner()))?;

        let totals: Vec<(LegSide, Option<Decimal>)> = transaction_legs::Entity::find()
            .select_only()
            .column(transaction_legs::Column::Side)
            .column_as(Expr::col(transaction_legs::Column::Amount).sum(), "total")
            .filter(transaction_legs::Column::AccountId.eq(id.into_inner()))
            .group_by(transaction_legs::Column::Side)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut debit_total = Decimal::ZERO;
        let mut credit_total = Decimal::ZERO;
        for (side, total) in totals {
            let total = total.unwrap_or(Decimal::ZERO);
            match side {
                LegSide::Debit => debit_total += total,
                LegSide::Credit => credit_total += total,
            }
        }

        Ok(DirectoryService::verify_balance(
            id,
            account.opening_balance,
            debit_total,
            credit_total,
            account.current_balance,
        ))
    }

    /// Loads and checks the three classification references of an account.
    ///
    /// Runs on `conn` so an update can resolve inside its own transaction.
    async fn resolve_classification<C: ConnectionTrait>(
        conn: &C,
        type_id: AccountTypeId,
        sub_type_id: AccountSubTypeId,
        category_id: AccountCategoryId,
    ) -> Result<(AccountType, AccountSubType, AccountCategory), DirectoryRepoError> {
        let account_type: AccountType = account_types::Entity::find_by_id(type_id.into_inner())
            .one(conn)
            .await?
            .ok_or(DirectoryError::InvalidReference {
                entity: "Account type",
                id: type_id.into_inner(),
            })?
            .into();

        let sub_type: AccountSubType = account_sub_types::Entity::find_by_id(sub_type_id.into_inner())
            .one(conn)
            .await?
            .ok_or(DirectoryError::InvalidReference {
                entity: "Account sub-type",
                id: sub_type_id.into_inner(),
            })?
            .into();

        let category: AccountCategory =
            account_categories::Entity::find_by_id(category_id.into_inner())
                .one(conn)
                .await?
                .ok_or(DirectoryError::InvalidReference {
                    entity: "Account category",
                    id: category_id.into_inner(),
                })?
                .into();

        DirectoryService::validate_classification(type_id, &sub_type)?;
        Ok((account_type, sub_type, category))
    }

    async fn load_refs(&self) -> Result<DirectoryRefs, DirectoryRepoError> {
        let types = account_types::Entity::find().all(&self.db).await?;
        let sub_types = account_sub_types::Entity::find().all(&self.db).await?;
        let categories = account_categories::Entity::find().all(&self.db).await?;

        Ok(DirectoryRefs {
            types: types.into_iter().map(|m| (m.id, m.into())).collect(),
            sub_types: sub_types.into_iter().map(|m| (m.id, m.into())).collect(),
            categories: categories.into_iter().map(|m| (m.id, m.into())).collect(),
        })
    }
}

/// Classification tables keyed by ID.
struct DirectoryRefs {
    types: HashMap<Uuid, AccountType>,
    sub_types: HashMap<Uuid, AccountSubType>,
    categories: HashMap<Uuid, AccountCategory>,
}

impl DirectoryRefs {
    fn attach(&self, model: accounts::Model) -> Result<AccountWithRefs, DirectoryRepoError> {
        let account_type = self
            .types
            .get(&model.account_type_id)
            .cloned()
            .ok_or(DirectoryError::AccountTypeNotFound(model.account_type_id))?;
        let sub_type = self
            .sub_types
            .get(&model.account_sub_type_id)
            .cloned()
            .ok_or(DirectoryError::AccountSubTypeNotFound(model.account_sub_type_id))?;
        let category = self
            .categories
            .get(&model.account_category_id)
            .cloned()
            .ok_or(DirectoryError::AccountCategoryNotFound(model.account_category_id))?;

        Ok(AccountWithRefs {
            account: model.into(),
            account_type,
            sub_type,
            category,
        })
    }
}
