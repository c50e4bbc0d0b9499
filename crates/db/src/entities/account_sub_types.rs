//! `SeaORM` Entity for account_sub_types table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::directory::AccountSubType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_sub_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sub_type_name: String,
    pub account_type_id: Uuid,
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
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::account_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountTypes.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AccountSubType {
    fn from(m: Model) -> Self {
        Self {
            id: m.id.into(),
            sub_type_name: m.sub_type_name,
            account_type_id: m.account_type_id.into(),
            description: m.description,
        }
    }
}
