//! First-run setup.

use api_types::init::{InitRequest, InitStatus, InitView};
use axum::extract::State;
use engine::InitCmd;

use crate::{
    extract::ApiJson,
    server::ServerState,
    views::{self, ApiResult},
};

fn init_cmd(payload: InitRequest) -> InitCmd {
    let defaults = InitCmd::default();
    InitCmd {
        admin_username: payload.admin_username.unwrap_or(defaults.admin_username),
        admin_name: payload.admin_name.unwrap_or(defaults.admin_name),
        admin_email: payload.admin_email.or(defaults.admin_email),
        wallet_name: payload.wallet_name.unwrap_or(defaults.wallet_name),
        group_name: payload.group_name.unwrap_or(defaults.group_name),
    }
}

/// Runs the setup once. Later calls answer 200 with `initialized: false`.
pub async fn init(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<InitRequest>,
) -> ApiResult<InitView> {
    let outcome = state.engine.initialize(init_cmd(payload)).await?;
    let message = if outcome.value.initialized {
        "initialization completed"
    } else {
        "already initialized"
    };
    Ok(views::written(message, outcome, |report| InitView {
        initialized: report.initialized,
        setup: report.setup.map(views::setup_report),
    }))
}

pub async fn status(State(state): State<ServerState>) -> ApiResult<InitStatus> {
    let initialized = state.engine.init_status().await?;
    Ok(views::ok("init status", InitStatus { initialized }))
}
