//! User ↔ wallet and wallet ↔ group links.

use api_types::{
    user::UserWalletsReplace, wallet::WalletView, wallet_group::WalletGroupView,
};
use axum::extract::State;

use crate::{
    extract::{ApiJson, ApiPath},
    server::ServerState,
    views::{self, ApiResult},
};

fn wallet_views(wallets: Vec<engine::Wallet>) -> Vec<WalletView> {
    wallets.into_iter().map(views::wallet).collect()
}

pub async fn user_wallets(
    State(state): State<ServerState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Vec<WalletView>> {
    let wallets = state.engine.user_wallets(user_id).await?;
    Ok(views::ok("user wallets listed", wallet_views(wallets)))
}

pub async fn replace_user_wallets(
    State(state): State<ServerState>,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UserWalletsReplace>,
) -> ApiResult<Vec<WalletView>> {
    let wallets = state
        .engine
        .replace_user_wallets(user_id, &payload.wallet_ids)
        .await?;
    Ok(views::ok("user wallets replaced", wallet_views(wallets)))
}

pub async fn attach_user_wallet(
    State(state): State<ServerState>,
    ApiPath((user_id, wallet_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<WalletView>> {
    state.engine.attach_user_wallet(user_id, wallet_id).await?;
    let wallets = state.engine.user_wallets(user_id).await?;
    Ok(views::ok("wallet attached", wallet_views(wallets)))
}

pub async fn detach_user_wallet(
    State(state): State<ServerState>,
    ApiPath((user_id, wallet_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<WalletView>> {
    state.engine.detach_user_wallet(user_id, wallet_id).await?;
    let wallets = state.engine.user_wallets(user_id).await?;
    Ok(views::ok("wallet detached", wallet_views(wallets)))
}

pub async fn user_wallet_groups(
    State(state): State<ServerState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Vec<WalletGroupView>> {
    let groups = state
        .engine
        .user_wallet_groups(user_id)
        .await?
        .into_iter()
        .map(views::wallet_group)
        .collect();
    Ok(views::ok("wallet groups listed", groups))
}

pub async fn group_wallets(
    State(state): State<ServerState>,
    ApiPath(group_id): ApiPath<i64>,
) -> ApiResult<Vec<WalletView>> {
    let wallets = state.engine.group_wallets(group_id).await?;
    Ok(views::ok("group wallets listed", wallet_views(wallets)))
}

pub async fn attach_group_wallet(
    State(state): State<ServerState>,
    ApiPath((group_id, wallet_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<WalletView>> {
    state.engine.attach_group_wallet(group_id, wallet_id).await?;
    let wallets = state.engine.group_wallets(group_id).await?;
    Ok(views::ok("wallet added to group", wallet_views(wallets)))
}

pub async fn detach_group_wallet(
    State(state): State<ServerState>,
    ApiPath((group_id, wallet_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<WalletView>> {
    state.engine.detach_group_wallet(group_id, wallet_id).await?;
    let wallets = state.engine.group_wallets(group_id).await?;
    Ok(views::ok("wallet removed from group", wallet_views(wallets)))
}
