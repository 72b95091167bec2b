//! Join-table maintenance: user ↔ wallet and wallet ↔ group.

use std::collections::BTreeSet;

use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    sea_query::OnConflict,
};
use tracing::info;

use crate::{
    ResultEngine, Wallet, WalletGroup, user_wallets, wallet_group_wallets, wallet_groups, wallets,
};

use super::{Engine, find_user, find_wallet, find_wallet_group, with_tx};

impl Engine {
    /// Give a user access to a wallet. Attaching twice is a no-op.
    pub async fn attach_user_wallet(&self, user_id: i64, wallet_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            find_user(&db_tx, user_id).await?;
            find_wallet(&db_tx, wallet_id).await?;
            link_user_wallet(&db_tx, user_id, wallet_id).await?;
            Ok(())
        })
    }

    pub async fn detach_user_wallet(&self, user_id: i64, wallet_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            find_user(&db_tx, user_id).await?;
            user_wallets::Entity::delete_many()
                .filter(user_wallets::Column::UserId.eq(user_id))
                .filter(user_wallets::Column::WalletId.eq(wallet_id))
                .exec(&db_tx)
                .await?;
            info!(user_id, wallet_id, "wallet detached from user");
            Ok(())
        })
    }

    pub async fn user_wallets(&self, user_id: i64) -> ResultEngine<Vec<Wallet>> {
        find_user(&self.database, user_id).await?;
        wallets_of_user(&self.database, user_id).await
    }

    /// Replace the wallets of a user with exactly `wallet_ids`.
    pub async fn replace_user_wallets(
        &self,
        user_id: i64,
        wallet_ids: &[i64],
    ) -> ResultEngine<Vec<Wallet>> {
        let wanted: BTreeSet<i64> = wallet_ids.iter().copied().collect();
        with_tx!(self, |db_tx| {
            find_user(&db_tx, user_id).await?;
            for wallet_id in &wanted {
                find_wallet(&db_tx, *wallet_id).await?;
            }

            user_wallets::Entity::delete_many()
                .filter(user_wallets::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            for wallet_id in &wanted {
                link_user_wallet(&db_tx, user_id, *wallet_id).await?;
            }

            info!(user_id, wallets = wanted.len(), "user wallets replaced");
            wallets_of_user(&db_tx, user_id).await
        })
    }

    /// Put a wallet in a group. Attaching twice is a no-op.
    pub async fn attach_group_wallet(&self, group_id: i64, wallet_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            find_wallet_group(&db_tx, group_id).await?;
            find_wallet(&db_tx, wallet_id).await?;
            link_group_wallet(&db_tx, group_id, wallet_id).await?;
            Ok(())
        })
    }

    pub async fn detach_group_wallet(&self, group_id: i64, wallet_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            find_wallet_group(&db_tx, group_id).await?;
            wallet_group_wallets::Entity::delete_many()
                .filter(wallet_group_wallets::Column::WalletGroupId.eq(group_id))
                .filter(wallet_group_wallets::Column::WalletId.eq(wallet_id))
                .exec(&db_tx)
                .await?;
            info!(group_id, wallet_id, "wallet removed from group");
            Ok(())
        })
    }

    pub async fn group_wallets(&self, group_id: i64) -> ResultEngine<Vec<Wallet>> {
        find_wallet_group(&self.database, group_id).await?;
        let wallet_ids: Vec<i64> = wallet_group_wallets::Entity::find()
            .filter(wallet_group_wallets::Column::WalletGroupId.eq(group_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|link| link.wallet_id)
            .collect();
        wallets_by_ids(&self.database, wallet_ids).await
    }

    /// Groups reachable from the wallets of a user.
    pub async fn user_wallet_groups(&self, user_id: i64) -> ResultEngine<Vec<WalletGroup>> {
        find_user(&self.database, user_id).await?;
        let wallet_ids: Vec<i64> = user_wallets::Entity::find()
            .filter(user_wallets::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|link| link.wallet_id)
            .collect();
        if wallet_ids.is_empty() {
            return Ok(Vec::new());
        }

        let group_ids: BTreeSet<i64> = wallet_group_wallets::Entity::find()
            .filter(wallet_group_wallets::Column::WalletId.is_in(wallet_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|link| link.wallet_group_id)
            .collect();
        let models = wallet_groups::Entity::find()
            .filter(wallet_groups::Column::Id.is_in(group_ids))
            .order_by_asc(wallet_groups::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(WalletGroup::from).collect())
    }
}

pub(super) async fn link_user_wallet<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    wallet_id: i64,
) -> ResultEngine<()> {
    let link = user_wallets::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        wallet_id: ActiveValue::Set(wallet_id),
    };
    user_wallets::Entity::insert(link)
        .on_conflict(
            OnConflict::columns([user_wallets::Column::UserId, user_wallets::Column::WalletId])
                .do_nothing()
                .to_owned(),
        )
        .do_nothing()
        .exec(db)
        .await?;
    Ok(())
}

pub(super) async fn link_group_wallet<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
    wallet_id: i64,
) -> ResultEngine<()> {
    let link = wallet_group_wallets::ActiveModel {
        wallet_group_id: ActiveValue::Set(group_id),
        wallet_id: ActiveValue::Set(wallet_id),
    };
    wallet_group_wallets::Entity::insert(link)
        .on_conflict(
            OnConflict::columns([
                wallet_group_wallets::Column::WalletGroupId,
                wallet_group_wallets::Column::WalletId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .do_nothing()
        .exec(db)
        .await?;
    Ok(())
}

async fn wallets_of_user<C: ConnectionTrait>(db: &C, user_id: i64) -> ResultEngine<Vec<Wallet>> {
    let wallet_ids: Vec<i64> = user_wallets::Entity::find()
        .filter(user_wallets::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.wallet_id)
        .collect();
    wallets_by_ids(db, wallet_ids).await
}

async fn wallets_by_ids<C: ConnectionTrait>(
    db: &C,
    wallet_ids: Vec<i64>,
) -> ResultEngine<Vec<Wallet>> {
    if wallet_ids.is_empty() {
        return Ok(Vec::new());
    }
    let models = wallets::Entity::find()
        .filter(wallets::Column::Id.is_in(wallet_ids))
        .order_by_asc(wallets::Column::Id)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Wallet::from).collect())
}
