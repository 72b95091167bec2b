use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use tracing::info;

use crate::{
    EngineError, NewWalletCmd, ResultEngine, Wallet, WalletPatch, transactions, wallets,
};

use super::{Engine, find_wallet, normalize_required_name, with_tx};

impl Engine {
    /// Create a wallet. `balance_minor` is the opening balance.
    pub async fn create_wallet(&self, cmd: NewWalletCmd) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            let model = insert_wallet(&db_tx, cmd).await?;
            Ok(Wallet::from(model))
        })
    }

    pub async fn wallet(&self, id: i64) -> ResultEngine<Wallet> {
        Ok(find_wallet(&self.database, id).await?.into())
    }

    pub async fn list_wallets(&self) -> ResultEngine<Vec<Wallet>> {
        let models = wallets::Entity::find()
            .order_by_asc(wallets::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Wallet::from).collect())
    }

    /// Update a wallet. `last_modified_time` only moves when a field
    /// actually changes.
    pub async fn update_wallet(&self, id: i64, patch: WalletPatch) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            let model = find_wallet(&db_tx, id).await?;
            if patch.is_empty() {
                return Ok(Wallet::from(model));
            }

            let mut active: wallets::ActiveModel = model.clone().into();
            let mut changed = false;
            if let Some(name) = patch.name.as_deref() {
                let name = normalize_required_name(name, "wallet")?;
                changed |= name != model.name;
                active.name = ActiveValue::Set(name);
            }
            if let Some(icon) = patch.icon.as_deref() {
                let icon = icon.trim().to_string();
                changed |= icon != model.icon;
                active.icon = ActiveValue::Set(icon);
            }
            if let Some(is_enabled) = patch.is_enabled {
                changed |= is_enabled != model.is_enabled;
                active.is_enabled = ActiveValue::Set(is_enabled);
            }
            if let Some(balance_minor) = patch.balance_minor {
                changed |= balance_minor != model.balance_minor;
                active.balance_minor = ActiveValue::Set(balance_minor);
            }
            if !changed {
                return Ok(Wallet::from(model));
            }

            active.last_modified_time = ActiveValue::Set(Utc::now());
            let updated = active.update(&db_tx).await?;
            info!(wallet_id = id, "wallet updated");
            Ok(Wallet::from(updated))
        })
    }

    /// Delete a wallet with no transactions. Its categories and memberships
    /// go with it.
    pub async fn delete_wallet(&self, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = find_wallet(&db_tx, id).await?;
            let used_by = transactions::Entity::find()
                .filter(transactions::Column::WalletId.eq(id))
                .count(&db_tx)
                .await?;
            if used_by > 0 {
                return Err(EngineError::InUse(format!(
                    "wallet '{}' has {used_by} transactions",
                    model.name
                )));
            }

            let label = format!("wallet '{}'", model.name);
            wallets::Entity::delete_by_id(id)
                .exec(&db_tx)
                .await
                .map_err(|err| EngineError::from_constraint(err, &label))?;
            info!(wallet_id = id, "wallet deleted");
            Ok(())
        })
    }
}

pub(super) async fn insert_wallet(
    db_tx: &DatabaseTransaction,
    cmd: NewWalletCmd,
) -> ResultEngine<wallets::Model> {
    let name = normalize_required_name(&cmd.name, "wallet")?;
    let model = wallets::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name),
        icon: ActiveValue::Set(cmd.icon.trim().to_string()),
        is_enabled: ActiveValue::Set(cmd.is_enabled),
        balance_minor: ActiveValue::Set(cmd.balance_minor),
        last_modified_time: ActiveValue::Set(Utc::now()),
    }
    .insert(db_tx)
    .await?;
    info!(wallet_id = model.id, name = %model.name, "wallet created");
    Ok(model)
}
