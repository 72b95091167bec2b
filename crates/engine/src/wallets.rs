//! The module contains the `Wallet` struct and its sea-orm entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::Money;

/// A wallet: a bank account, a cash box or anything else where money is kept.
///
/// `balance_minor` is derived state. It is only moved by transaction writes
/// (through the balance adjuster) and by an explicit wallet update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub is_enabled: bool,
    pub balance_minor: i64,
    pub last_modified_time: DateTime<Utc>,
}

impl Wallet {
    pub fn balance(&self) -> Money {
        Money::from_minor(self.balance_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub is_enabled: bool,
    pub balance_minor: i64,
    pub last_modified_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::categories::Entity")]
    Categories,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::user_wallets::Entity")]
    UserWallets,
    #[sea_orm(has_many = "super::wallet_group_wallets::Entity")]
    GroupWallets,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::user_wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserWallets.def()
    }
}

impl Related<super::wallet_group_wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupWallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Wallet {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            icon: model.icon,
            is_enabled: model.is_enabled,
            balance_minor: model.balance_minor,
            last_modified_time: model.last_modified_time,
        }
    }
}
