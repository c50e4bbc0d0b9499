//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::directory::Account;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_name: String,
    pub account_type_id: Uuid,
    pub account_sub_type_id: Uuid,
    pub account_category_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub opening_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_balance: Decimal,
    pub created_by: Uuid,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account_types::Entity",
        from = "Column::AccountTypeId",
        to = "super::account_types::Column::Id"
    )]
    AccountTypes,
    #[sea_orm(
        belongs_to = "super::account_sub_types::Entity",
        from = "Column::AccountSubTypeId",
        to = "super::account_sub_types::Column::Id"
    )]
    AccountSubTypes,
    #[sea_orm(
        belongs_to = "super::account_categories::Entity",
        from = "Column::AccountCategoryId",
        to = "super::account_categories::Column::Id"
    )]
    AccountCategories,
    #[sea_orm(has_many = "super::transaction_legs::Entity")]
    TransactionLegs,
    #[sea_orm(has_one = "super::ledgers::Entity")]
    Ledgers,
}

impl Related<super::account_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountTypes.def()
    }
}

impl Related<super::account_sub_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountSubTypes.def()
    }
}

impl Related<super::account_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountCategories.def()
    }
}

impl Related<super::transaction_legs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionLegs.def()
    }
}

impl Related<super::ledgers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ledgers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Account {
    fn from(m: Model) -> Self {
        Self {
            id: m.id.into(),
            account_name: m.account_name,
            account_type_id: m.account_type_id.into(),
            account_sub_type_id: m.account_sub_type_id.into(),
            account_category_id: m.account_category_id.into(),
            opening_balance: m.opening_balance,
            current_balance: m.current_balance,
            created_by: m.created_by.into(),
            is_active: m.is_active,
            description: m.description,
            created_at: m.created_at.with_timezone(&chrono::Utc),
        }
    }
}
