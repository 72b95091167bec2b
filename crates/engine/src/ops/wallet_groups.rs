use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseTransaction, EntityTrait, QueryOrder};
use tracing::info;

use crate::{ResultEngine, WalletGroup, wallet_groups};

use super::{Engine, find_wallet_group, normalize_required_name, with_tx};

impl Engine {
    pub async fn create_wallet_group(&self, name: &str) -> ResultEngine<WalletGroup> {
        with_tx!(self, |db_tx| {
            let model = insert_wallet_group(&db_tx, name).await?;
            Ok(WalletGroup::from(model))
        })
    }

    pub async fn wallet_group(&self, id: i64) -> ResultEngine<WalletGroup> {
        Ok(find_wallet_group(&self.database, id).await?.into())
    }

    pub async fn list_wallet_groups(&self) -> ResultEngine<Vec<WalletGroup>> {
        let models = wallet_groups::Entity::find()
            .order_by_asc(wallet_groups::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(WalletGroup::from).collect())
    }

    pub async fn rename_wallet_group(&self, id: i64, name: &str) -> ResultEngine<WalletGroup> {
        let name = normalize_required_name(name, "wallet group")?;
        with_tx!(self, |db_tx| {
            let model = find_wallet_group(&db_tx, id).await?;
            let mut active: wallet_groups::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            Ok(WalletGroup::from(active.update(&db_tx).await?))
        })
    }

    /// Delete a group. Its wallets stay, only the links are removed.
    pub async fn delete_wallet_group(&self, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            find_wallet_group(&db_tx, id).await?;
            wallet_groups::Entity::delete_by_id(id).exec(&db_tx).await?;
            info!(wallet_group_id = id, "wallet group deleted");
            Ok(())
        })
    }
}

pub(super) async fn insert_wallet_group(
    db_tx: &DatabaseTransaction,
    name: &str,
) -> ResultEngine<wallet_groups::Model> {
    let name = normalize_required_name(name, "wallet group")?;
    let model = wallet_groups::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name),
    }
    .insert(db_tx)
    .await?;
    info!(wallet_group_id = model.id, name = %model.name, "wallet group created");
    Ok(model)
}
