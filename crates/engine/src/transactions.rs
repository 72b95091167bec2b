//! The module contains the `Transaction` struct and its sea-orm entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{Category, Money, Person, User, Wallet};

/// A recorded movement of money.
///
/// `amount_minor` is always positive: the sign comes from the root of the
/// category the transaction is filed under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: i64,
    pub wallet_id: i64,
    pub category_id: i64,
    pub user_id: i64,
    pub person_id: Option<i64>,
    pub amount_minor: i64,
    pub note: Option<String>,
    /// When the movement happened, as told by the caller.
    pub transaction_time: DateTime<Utc>,
    /// When the row was created. Never changes.
    pub entry_time: DateTime<Utc>,
    pub last_modified_time: DateTime<Utc>,
}

impl Transaction {
    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }
}

/// A transaction with the rows it references.
///
/// A relation is `None` when it does not resolve or when it could not be
/// loaded after a write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub category: Option<Category>,
    pub wallet: Option<Wallet>,
    pub person: Option<Person>,
    pub user: Option<User>,
}

impl TransactionDetail {
    pub(crate) fn bare(transaction: Transaction) -> Self {
        Self {
            transaction,
            category: None,
            wallet: None,
            person: None,
            user: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    pub category_id: i64,
    pub user_id: i64,
    pub person_id: Option<i64>,
    pub amount_minor: i64,
    pub note: Option<String>,
    pub transaction_time: DateTimeUtc,
    pub entry_time: DateTimeUtc,
    pub last_modified_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Wallet,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::persons::Entity",
        from = "Column::PersonId",
        to = "super::persons::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Person,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::persons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Person.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Transaction {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            wallet_id: model.wallet_id,
            category_id: model.category_id,
            user_id: model.user_id,
            person_id: model.person_id,
            amount_minor: model.amount_minor,
            note: model.note,
            transaction_time: model.transaction_time,
            entry_time: model.entry_time,
            last_modified_time: model.last_modified_time,
        }
    }
}
