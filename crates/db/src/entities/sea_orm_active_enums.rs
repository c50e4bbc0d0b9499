//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leg_side")]
pub enum LegSide {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    #[sea_orm(string_value = "Transfer")]
    Transfer,
    #[sea_orm(string_value = "Debit")]
    Debit,
    #[sea_orm(string_value = "Credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_type")]
pub enum PaymentType {
    #[sea_orm(string_value = "Cash")]
    Cash,
    #[sea_orm(string_value = "Bank")]
    Bank,
}

impl From<ledger::Side> for LegSide {
    fn from(side: ledger::Side) -> Self {
        match side {
            ledger::Side::Debit => Self::Debit,
            ledger::Side::Credit => Self::Credit,
        }
    }
}

impl From<LegSide> for ledger::Side {
    fn from(side: LegSide) -> Self {
        match side {
            LegSide::Debit => Self::Debit,
            LegSide::Credit => Self::Credit,
        }
    }
}

impl From<ledger::TransactionType> for TransactionType {
    fn from(value: ledger::TransactionType) -> Self {
        match value {
            ledger::TransactionType::Transfer => Self::Transfer,
            ledger::TransactionType::Debit => Self::Debit,
            ledger::TransactionType::Credit => Self::Credit,
        }
    }
}

impl From<TransactionType> for ledger::TransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Transfer => Self::Transfer,
            TransactionType::Debit => Self::Debit,
            TransactionType::Credit => Self::Credit,
        }
    }
}

impl From<ledger::PaymentType> for PaymentType {
    fn from(value: ledger::PaymentType) -> Self {
        match value {
            ledger::PaymentType::Cash => Self::Cash,
            ledger::PaymentType::Bank => Self::Bank,
        }
    }
}

impl From<PaymentType> for ledger::PaymentType {
    fn from(value: PaymentType) -> Self {
        match value {
            PaymentType::Cash => Self::Cash,
            PaymentType::Bank => Self::Bank,
        }
    }
}
