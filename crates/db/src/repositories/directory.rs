//! Directory repository for account types, sub-types and categories.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tally_core::directory::{
    AccountCategory, AccountSubType, AccountType, DirectoryError, DirectoryService,
};
use tally_shared::types::{AccountCategoryId, AccountSubTypeId, AccountTypeId};
use uuid::Uuid;

use crate::entities::{account_categories, account_sub_types, account_types, accounts};

/// Error types for directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryRepoError {
    /// Directory rule violated.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl DirectoryRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Directory(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Directory(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating an account type.
#[derive(Debug, Clone)]
pub struct CreateAccountTypeInput {
    /// Type name, e.g. "assets".
    pub type_name: String,
    /// Description.
    pub description: Option<String>,
}

/// Input for updating an account type.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountTypeInput {
    /// Type name.
    pub type_name: Option<String>,
    /// Description.
    pub description: Option<Option<String>>,
}

/// Input for creating an account sub-type.
#[derive(Debug, Clone)]
pub struct CreateAccountSubTypeInput {
    /// Sub-type name.
    pub sub_type_name: String,
    /// Owning account type.
    pub account_type_id: AccountTypeId,
    /// Description.
    pub description: Option<String>,
}

/// Input for updating an account sub-type.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountSubTypeInput {
    /// Sub-type name.
    pub sub_type_name: Option<String>,
    /// Owning account type.
    pub account_type_id: Option<AccountTypeId>,
    /// Description.
    pub description: Option<Option<String>>,
}

/// Input for creating an account category.
#[derive(Debug, Clone)]
pub struct CreateAccountCategoryInput {
    /// Category name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Free-form label, e.g. "received" or "paid".
    pub category_type: String,
}

/// Input for updating an account category.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountCategoryInput {
    /// Category name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<Option<String>>,
    /// Category label.
    pub category_type: Option<String>,
}

/// Repository for the classification tables of the account directory.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    db: DatabaseConnection,
}

impl DirectoryRepository {
    /// Creates a new directory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Account types
    // ========================================================================

    /// Creates an account type. Names are unique, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or taken, or the insert fails.
    pub async fn create_account_type(
        &self,
        input: CreateAccountTypeInput,
    ) -> Result<AccountType, DirectoryRepoError> {
        let type_name = DirectoryService::require_name("typeName", &input.type_name)?;
        self.ensure_type_name_free(&type_name, None).await?;

        let now = chrono::Utc::now().into();
        let model = account_types::ActiveModel {
            id: Set(AccountTypeId::new().into_inner()),
            type_name: Set(type_name),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(&self.db).await?;
        Ok(model.into())
    }

    /// Lists account types by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_account_types(&self) -> Result<Vec<AccountType>, DirectoryRepoError> {
        let types = account_types::Entity::find()
            .order_by_asc(account_types::Column::TypeName)
            .all(&self.db)
            .await?;

        Ok(types.into_iter().map(Into::into).collect())
    }

    /// Finds an account type by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountTypeNotFound` if it does not exist.
    pub async fn find_account_type(&self, id: AccountTypeId) -> Result<AccountType, DirectoryRepoError> {
        let model = account_types::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountTypeNotFound(id.into_inner()))?;

        Ok(model.into())
    }

    /// Updates an account type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist, or the new name is blank or taken.
    pub async fn update_account_type(
        &self,
        id: AccountTypeId,
        input: UpdateAccountTypeInput,
    ) -> Result<AccountType, DirectoryRepoError> {
        let model = account_types::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountTypeNotFound(id.into_inner()))?;

        let mut active: account_types::ActiveModel = model.into();

        if let Some(type_name) = input.type_name {
            let type_name = DirectoryService::require_name("typeName", &type_name)?;
            self.ensure_type_name_free(&type_name, Some(id.into_inner())).await?;
            active.type_name = Set(type_name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated.into())
    }

    /// Deletes an account type that nothing references.
    ///
    /// # Errors
    ///
    /// Returns `InUse` if accounts or sub-types still point at the type.
    pub async fn delete_account_type(&self, id: AccountTypeId) -> Result<(), DirectoryRepoError> {
        let uuid = id.into_inner();
        account_types::Entity::find_by_id(uuid)
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountTypeNotFound(uuid))?;

        let account_count = accounts::Entity::find()
            .filter(accounts::Column::AccountTypeId.eq(uuid))
            .count(&self.db)
            .await?;
        if account_count > 0 {
            return Err(in_use("Account type", uuid, "accounts"));
        }

        let sub_type_count = account_sub_types::Entity::find()
            .filter(account_sub_types::Column::AccountTypeId.eq(uuid))
            .count(&self.db)
            .await?;
        if sub_type_count > 0 {
            return Err(in_use("Account type", uuid, "account sub-types"));
        }

        account_types::Entity::delete_by_id(uuid).exec(&self.db).await?;
        Ok(())
    }

    async fn ensure_type_name_free(
        &self,
        type_name: &str,
        except: Option<Uuid>,
    ) -> Result<(), DirectoryRepoError> {
        let mut query = account_types::Entity::find().filter(
            Expr::expr(Func::lower(Expr::col(account_types::Column::TypeName)))
                .eq(type_name.to_lowercase()),
        );
        if let Some(id) = except {
            query = query.filter(account_types::Column::Id.ne(id));
        }

        if query.one(&self.db).await?.is_some() {
            return Err(DirectoryError::Duplicate {
                entity: "Account type",
                name: type_name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    // ========================================================================
    // Account sub-types
    // ========================================================================

    /// Creates an account sub-type under an existing account type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidReference` if the account type does not exist.
    pub async fn create_account_sub_type(
        &self,
        input: CreateAccountSubTypeInput,
    ) -> Result<AccountSubType, DirectoryRepoError> {
        let sub_type_name = DirectoryService::require_name("subTypeName", &input.sub_type_name)?;
        self.require_type_reference(input.account_type_id).await?;

        let now = chrono::Utc::now().into();
        let model = account_sub_types::ActiveModel {
            id: Set(AccountSubTypeId::new().into_inner()),
            sub_type_name: Set(sub_type_name),
            account_type_id: Set(input.account_type_id.into_inner()),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(&self.db).await?;
        Ok(model.into())
    }

    /// Lists sub-types, optionally only those of one account type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_account_sub_types(
        &self,
        account_type_id: Option<AccountTypeId>,
    ) -> Result<Vec<AccountSubType>, DirectoryRepoError> {
        let mut query =
            account_sub_types::Entity::find().order_by_asc(account_sub_types::Column::SubTypeName);

        if let Some(type_id) = account_type_id {
            query = query.filter(account_sub_types::Column::AccountTypeId.eq(type_id.into_inner()));
        }

        let sub_types = query.all(&self.db).await?;
        Ok(sub_types.into_iter().map(Into::into).collect())
    }

    /// Finds a sub-type by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountSubTypeNotFound` if it does not exist.
    pub async fn find_account_sub_type(
        &self,
        id: AccountSubTypeId,
    ) -> Result<AccountSubType, DirectoryRepoError> {
        let model = account_sub_types::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountSubTypeNotFound(id.into_inner()))?;

        Ok(model.into())
    }

    /// Updates a sub-type.
    ///
    /// Moving a sub-type to another account type is refused while accounts use it,
    /// since their type and sub-type would no longer agree.
    ///
    /// # Errors
    ///
    /// Returns an error if the sub-type or new account type does not exist, or
    /// the move would break existing accounts.
    pub async fn update_account_sub_type(
        &self,
        id: AccountSubTypeId,
        input: UpdateAccountSubTypeInput,
    ) -> Result<AccountSubType, DirectoryRepoError> {
        let uuid = id.into_inner();
        let model = account_sub_types::Entity::find_by_id(uuid)
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountSubTypeNotFound(uuid))?;

        if let Some(new_type) = input.account_type_id
            && new_type.into_inner() != model.account_type_id
        {
            self.require_type_reference(new_type).await?;
            let account_count = accounts::Entity::find()
                .filter(accounts::Column::AccountSubTypeId.eq(uuid))
                .count(&self.db)
                .await?;
            if account_count > 0 {
                return Err(in_use("Account sub-type", uuid, "accounts"));
            }
        }

        let mut active: account_sub_types::ActiveModel = model.into();

        if let Some(name) = input.sub_type_name {
            active.sub_type_name = Set(DirectoryService::require_name("subTypeName", &name)?);
        }
        if let Some(type_id) = input.account_type_id {
            active.account_type_id = Set(type_id.into_inner());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated.into())
    }

    /// Deletes a sub-type that no account uses.
    ///
    /// # Errors
    ///
    /// Returns `InUse` if accounts still reference it.
    pub async fn delete_account_sub_type(&self, id: AccountSubTypeId) -> Result<(), DirectoryRepoError> {
        let uuid = id.into_inner();
        account_sub_types::Entity::find_by_id(uuid)
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountSubTypeNotFound(uuid))?;

        let account_count = accounts::Entity::find()
            .filter(accounts::Column::AccountSubTypeId.eq(uuid))
            .count(&self.db)
            .await?;
        if account_count > 0 {
            return Err(in_use("Account sub-type", uuid, "accounts"));
        }

        account_sub_types::Entity::delete_by_id(uuid).exec(&self.db).await?;
        Ok(())
    }

    async fn require_type_reference(&self, id: AccountTypeId) -> Result<(), DirectoryRepoError> {
        let exists = account_types::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .is_some();

        if !exists {
            return Err(DirectoryError::InvalidReference {
                entity: "Account type",
                id: id.into_inner(),
            }
            .into());
        }
        Ok(())
    }

    // ========================================================================
    // Account categories
    // ========================================================================

    /// Creates an account category.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or category type is blank.
    pub async fn create_account_category(
        &self,
        input: CreateAccountCategoryInput,
    ) -> Result<AccountCategory, DirectoryRepoError> {
        let name = DirectoryService::require_name("name", &input.name)?;
        let category_type = DirectoryService::require_name("type", &input.category_type)?;

        let now = chrono::Utc::now().into();
        let model = account_categories::ActiveModel {
            id: Set(AccountCategoryId::new().into_inner()),
            name: Set(name),
            description: Set(input.description),
            category_type: Set(category_type),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(&self.db).await?;
        Ok(model.into())
    }

    /// Lists categories in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_account_categories(&self) -> Result<Vec<AccountCategory>, DirectoryRepoError> {
        let categories = account_categories::Entity::find()
            .order_by_asc(account_categories::Column::CreatedAt)
            .order_by_asc(account_categories::Column::Id)
            .all(&self.db)
            .await?;

        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Finds a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountCategoryNotFound` if it does not exist.
    pub async fn find_account_category(
        &self,
        id: AccountCategoryId,
    ) -> Result<AccountCategory, DirectoryRepoError> {
        let model = account_categories::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountCategoryNotFound(id.into_inner()))?;

        Ok(model.into())
    }

    /// Updates a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category does not exist or a new value is blank.
    pub async fn update_account_category(
        &self,
        id: AccountCategoryId,
        input: UpdateAccountCategoryInput,
    ) -> Result<AccountCategory, DirectoryRepoError> {
        let model = account_categories::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountCategoryNotFound(id.into_inner()))?;

        let mut active: account_categories::ActiveModel = model.into();

        if let Some(name) = input.name {
            active.name = Set(DirectoryService::require_name("name", &name)?);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category_type) = input.category_type {
            active.category_type = Set(DirectoryService::require_name("type", &category_type)?);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated.into())
    }

    /// Deletes a category that no account uses.
    ///
    /// # Errors
    ///
    /// Returns `InUse` if accounts still reference it.
    pub async fn delete_account_category(
        &self,
        id: AccountCategoryId,
    ) -> Result<(), DirectoryRepoError> {
        let uuid = id.into_inner();
        account_categories::Entity::find_by_id(uuid)
            .one(&self.db)
            .await?
            .ok_or(DirectoryError::AccountCategoryNotFound(uuid))?;

        let account_count = accounts::Entity::find()
            .filter(accounts::Column::AccountCategoryId.eq(uuid))
            .count(&self.db)
            .await?;
        if account_count > 0 {
            return Err(in_use("Account category", uuid, "accounts"));
        }

        account_categories::Entity::delete_by_id(uuid)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

fn in_use(entity: &'static str, id: Uuid, referenced_by: &'static str) -> DirectoryRepoError {
    DirectoryError::InUse {
        entity,
        id,
        referenced_by,
    }
    .into()
}
