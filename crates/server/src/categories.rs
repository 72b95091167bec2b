//! Categories API endpoints, always under a wallet.

use api_types::category::{
    CategoryNew, CategoryTreeView, CategoryUpdate, CategoryView, SyncReportView,
};
use axum::extract::State;
use engine::{CategoryPatch, NewCategoryCmd};

use crate::{
    extract::{ApiJson, ApiPath},
    server::ServerState,
    views::{self, ApiCreated, ApiResult},
};

pub async fn list(
    State(state): State<ServerState>,
    ApiPath(wallet_id): ApiPath<i64>,
) -> ApiResult<Vec<CategoryView>> {
    let categories = state
        .engine
        .list_categories(wallet_id)
        .await?
        .into_iter()
        .map(views::category)
        .collect();
    Ok(views::ok("categories listed", categories))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiPath(wallet_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<CategoryNew>,
) -> ApiCreated<CategoryView> {
    let mut cmd = NewCategoryCmd::new(wallet_id, payload.name).global(payload.is_global);
    if let Some(icon) = payload.icon {
        cmd = cmd.icon(icon);
    }
    cmd.parent_id = payload.parent_id;

    let outcome = state.engine.create_category(cmd).await?;
    Ok(views::created(views::written(
        "category created",
        outcome,
        views::category,
    )))
}

pub async fn tree(
    State(state): State<ServerState>,
    ApiPath(wallet_id): ApiPath<i64>,
) -> ApiResult<CategoryTreeView> {
    let tree = state.engine.category_tree(wallet_id).await?;
    Ok(views::ok("category tree built", views::category_tree(tree)))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath((wallet_id, category_id)): ApiPath<(i64, i64)>,
) -> ApiResult<CategoryView> {
    let category = state.engine.category(category_id, Some(wallet_id)).await?;
    Ok(views::ok("category found", views::category(category)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath((wallet_id, category_id)): ApiPath<(i64, i64)>,
    ApiJson(payload): ApiJson<CategoryUpdate>,
) -> ApiResult<CategoryView> {
    let patch = CategoryPatch {
        name: payload.name,
        icon: payload.icon,
        parent_id: payload.parent_id,
        is_global: payload.is_global,
    };
    let outcome = state
        .engine
        .update_category(category_id, Some(wallet_id), patch)
        .await?;
    Ok(views::written("category updated", outcome, views::category))
}

pub async fn delete(
    State(state): State<ServerState>,
    ApiPath((wallet_id, category_id)): ApiPath<(i64, i64)>,
) -> ApiResult<i64> {
    state
        .engine
        .delete_category(category_id, Some(wallet_id))
        .await?;
    Ok(views::ok("category deleted", category_id))
}

pub async fn sync_global(
    State(state): State<ServerState>,
    ApiPath((wallet_id, category_id)): ApiPath<(i64, i64)>,
) -> ApiResult<SyncReportView> {
    let report = state
        .engine
        .sync_global_category(category_id, Some(wallet_id))
        .await?;
    Ok(views::ok("global category synced", views::sync_report(report)))
}
