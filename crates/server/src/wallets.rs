//! Wallets API endpoints.

use api_types::wallet::{WalletNew, WalletUpdate, WalletView};
use axum::extract::State;
use engine::{NewWalletCmd, WalletPatch};

use crate::{
    extract::{ApiJson, ApiPath},
    server::ServerState,
    views::{self, ApiCreated, ApiResult},
};

pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<WalletView>> {
    let wallets = state
        .engine
        .list_wallets()
        .await?
        .into_iter()
        .map(views::wallet)
        .collect();
    Ok(views::ok("wallets listed", wallets))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<WalletNew>,
) -> ApiCreated<WalletView> {
    let mut cmd = NewWalletCmd::new(payload.name)
        .enabled(payload.is_enabled.unwrap_or(true))
        .balance_minor(payload.balance_minor.unwrap_or(0));
    if let Some(icon) = payload.icon {
        cmd = cmd.icon(icon);
    }

    let wallet = state.engine.create_wallet(cmd).await?;
    Ok(views::created(views::ok(
        "wallet created",
        views::wallet(wallet),
    )))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<WalletView> {
    let wallet = state.engine.wallet(id).await?;
    Ok(views::ok("wallet found", views::wallet(wallet)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<WalletUpdate>,
) -> ApiResult<WalletView> {
    let patch = WalletPatch {
        name: payload.name,
        icon: payload.icon,
        is_enabled: payload.is_enabled,
        balance_minor: payload.balance_minor,
    };
    let wallet = state.engine.update_wallet(id, patch).await?;
    Ok(views::ok("wallet updated", views::wallet(wallet)))
}

pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> ApiResult<i64> {
    state.engine.delete_wallet(id).await?;
    Ok(views::ok("wallet deleted", id))
}
