//! Users API endpoints.

use std::str::FromStr;

use api_types::user::{UserNew, UserUpdate, UserView};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use engine::{NewUserCmd, SetupUserCmd, UserPatch, UserType};

use crate::{
    ServerError,
    extract::{ApiJson, ApiPath},
    server::ServerState,
    views::{self, ApiResult},
};

fn user_type(value: Option<&str>) -> Result<Option<UserType>, ServerError> {
    Ok(value.map(UserType::from_str).transpose()?)
}

pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<UserView>> {
    let users = state
        .engine
        .list_users()
        .await?
        .into_iter()
        .map(views::user)
        .collect();
    Ok(views::ok("users listed", users))
}

/// Create a user. With `with_wallet` the user is set up with a wallet group
/// and a wallet of their own, and the body carries all three.
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<UserNew>,
) -> Result<Response, ServerError> {
    let mut cmd = NewUserCmd::new(payload.username);
    cmd.name = payload.name;
    cmd.email = payload.email;
    cmd.user_type = user_type(payload.user_type.as_deref())?.unwrap_or_default();
    cmd.default_wallet_id = payload.default_wallet_id;

    if !payload.with_wallet {
        let user = state.engine.create_user(cmd).await?;
        return Ok(views::created(views::ok("user created", views::user(user))).into_response());
    }

    let mut setup = SetupUserCmd::new(cmd).with_categories(payload.with_categories);
    setup.wallet_name = payload.wallet_name;
    setup.group_name = payload.group_name;
    let outcome = state.engine.setup_user(setup).await?;
    Ok(views::created(views::written("user created", outcome, views::setup_report)).into_response())
}

pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> ApiResult<UserView> {
    let user = state.engine.user(id).await?;
    Ok(views::ok("user found", views::user(user)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UserUpdate>,
) -> ApiResult<UserView> {
    let patch = UserPatch {
        username: payload.username,
        name: payload.name,
        email: payload.email,
        user_type: user_type(payload.user_type.as_deref())?,
        default_wallet_id: payload.default_wallet_id,
    };
    let user = state.engine.update_user(id, patch).await?;
    Ok(views::ok("user updated", views::user(user)))
}

pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> ApiResult<i64> {
    state.engine.delete_user(id).await?;
    Ok(views::ok("user deleted", id))
}
