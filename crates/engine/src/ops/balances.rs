use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    sea_query::{Expr, SimpleExpr},
};
use tracing::debug;

use crate::{BalanceEffect, EngineError, Money, ResultEngine, wallets};

use super::Engine;

impl Engine {
    /// Move the cached balance of `wallet_id` by `amount_minor`, signed by
    /// the category root the amount is filed under.
    ///
    /// This is the only place that decides the sign of a balance change. The
    /// update is evaluated by the store (`balance_minor = balance_minor + ?`)
    /// so concurrent adjustments on the same wallet cannot lose each other.
    /// Pass a negative amount to undo a previous adjustment.
    ///
    /// The update only matches while the result still fits in an `i64`;
    /// otherwise the balance is left alone and `InvalidAmount` is returned.
    pub(super) async fn adjust_balance<C: ConnectionTrait>(
        db: &C,
        wallet_id: i64,
        root_id: i64,
        amount_minor: i64,
    ) -> ResultEngine<()> {
        let delta = BalanceEffect::for_root(root_id).delta(amount_minor);
        if delta == 0 {
            return Ok(());
        }

        let result = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::BalanceMinor,
                Expr::col(wallets::Column::BalanceMinor).add(delta),
            )
            .filter(wallets::Column::Id.eq(wallet_id))
            .filter(headroom(delta))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            let wallet = wallets::Entity::find_by_id(wallet_id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("wallet {wallet_id}")))?;
            return Err(EngineError::InvalidAmount(format!(
                "balance of wallet {wallet_id} ({}) cannot move by {}",
                Money::from_minor(wallet.balance_minor),
                Money::from_minor(delta)
            )));
        }

        debug!(wallet_id, root_id, delta, "wallet balance adjusted");
        Ok(())
    }
}

/// Rows whose balance can take `delta` without leaving the `i64` range.
fn headroom(delta: i64) -> SimpleExpr {
    if delta > 0 {
        wallets::Column::BalanceMinor.lte(i64::MAX - delta)
    } else {
        wallets::Column::BalanceMinor.gte(i64::MIN - delta)
    }
}
