//! `SeaORM` entity definitions.

pub mod prelude;

pub mod account_categories;
pub mod account_sub_types;
pub mod account_types;
pub mod accounts;
pub mod ledgers;
pub mod sea_orm_active_enums;
pub mod transaction_legs;
pub mod transactions;
