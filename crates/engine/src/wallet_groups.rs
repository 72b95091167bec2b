use sea_orm::entity::prelude::*;

/// A named set of wallets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletGroup {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wallet_group_wallets::Entity")]
    GroupWallets,
}

impl Related<super::wallet_group_wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupWallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for WalletGroup {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}
