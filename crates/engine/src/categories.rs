//! Category hierarchy per wallet.
//!
//! Categories form a forest inside each wallet. Every category stores the
//! identity of the top of its tree in `root_id`; a root points at itself.

use sea_orm::entity::prelude::*;

use crate::{BalanceEffect, Wallet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub wallet_id: i64,
    pub name: String,
    pub icon: String,
    pub parent_id: Option<i64>,
    pub root_id: i64,
    pub is_global: bool,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// How transactions filed under this category move the wallet balance.
    pub fn effect(&self) -> BalanceEffect {
        BalanceEffect::for_root(self.root_id)
    }
}

/// A category with its direct children, recursively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Number of categories in this subtree, the node included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::count).sum::<usize>()
    }
}

/// The category forest of one wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTree {
    pub wallet: Wallet,
    pub roots: Vec<CategoryNode>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet_id: i64,
    pub name: String,
    pub icon: String,
    pub parent_id: Option<i64>,
    pub root_id: i64,
    pub is_global: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallet,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Parent,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            wallet_id: model.wallet_id,
            name: model.name,
            icon: model.icon,
            parent_id: model.parent_id,
            root_id: model.root_id,
            is_global: model.is_global,
        }
    }
}
