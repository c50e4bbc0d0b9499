//! `SeaORM` Entity for account_types table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::directory::AccountType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub type_name: String,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_sub_types::Entity")]
    AccountSubTypes,
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::account_sub_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountSubTypes.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AccountType {
    fn from(m: Model) -> Self {
        Self {
            id: m.id.into(),
            type_name: m.type_name,
            description: m.description,
        }
    }
}
