//! Join table between wallet groups and wallets.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_group_wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub wallet_group_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub wallet_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallet_groups::Entity",
        from = "Column::WalletGroupId",
        to = "super::wallet_groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    WalletGroup,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallet,
}

impl Related<super::wallet_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletGroup.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
