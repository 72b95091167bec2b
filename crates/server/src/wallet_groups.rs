use api_types::wallet_group::{WalletGroupName, WalletGroupView};
use axum::extract::State;

use crate::{
    extract::{ApiJson, ApiPath},
    server::ServerState,
    views::{self, ApiCreated, ApiResult},
};

pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<WalletGroupView>> {
    let groups = state
        .engine
        .list_wallet_groups()
        .await?
        .into_iter()
        .map(views::wallet_group)
        .collect();
    Ok(views::ok("wallet groups listed", groups))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<WalletGroupName>,
) -> ApiCreated<WalletGroupView> {
    let group = state.engine.create_wallet_group(&payload.name).await?;
    Ok(views::created(views::ok(
        "wallet group created",
        views::wallet_group(group),
    )))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<WalletGroupView> {
    let group = state.engine.wallet_group(id).await?;
    Ok(views::ok("wallet group found", views::wallet_group(group)))
}

pub async fn rename(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<WalletGroupName>,
) -> ApiResult<WalletGroupView> {
    let group = state.engine.rename_wallet_group(id, &payload.name).await?;
    Ok(views::ok("wallet group renamed", views::wallet_group(group)))
}

pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> ApiResult<i64> {
    state.engine.delete_wallet_group(id).await?;
    Ok(views::ok("wallet group deleted", id))
}
