use std::{net::SocketAddr, sync::Arc};

use api_types::envelope::ApiResponse;
use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    categories, init, memberships, persons, transactions, users, wallet_groups, wallets,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::failure("Not Found", "no such route")),
    )
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiResponse::<()>::failure(
            "Method Not Allowed",
            "method not allowed on this route",
        )),
    )
}

fn api_routes() -> Router<ServerState> {
    Router::new()
        .route("/init", post(init::init))
        .route("/initdone", get(init::status))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route(
            "/users/{id}/wallets",
            get(memberships::user_wallets).put(memberships::replace_user_wallets),
        )
        .route(
            "/users/{id}/wallets/{wallet_id}",
            post(memberships::attach_user_wallet).delete(memberships::detach_user_wallet),
        )
        .route(
            "/users/{id}/walletgroups",
            get(memberships::user_wallet_groups),
        )
        .route("/users/{id}/transactions", get(transactions::user_list))
        .route("/wallets", get(wallets::list).post(wallets::create))
        .route(
            "/wallets/{id}",
            get(wallets::get).put(wallets::update).delete(wallets::delete),
        )
        .route(
            "/wallets/{id}/categories",
            get(categories::list).post(categories::create),
        )
        .route("/wallets/{id}/categories/tree", get(categories::tree))
        .route(
            "/wallets/{id}/categories/{category_id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route(
            "/wallets/{id}/categories/{category_id}/sync-global",
            post(categories::sync_global),
        )
        .route(
            "/wallets/{id}/transactions",
            get(transactions::wallet_list).post(transactions::wallet_create),
        )
        .route(
            "/wallets/{id}/transactions/{tx_id}",
            get(transactions::wallet_get)
                .put(transactions::wallet_update)
                .delete(transactions::wallet_delete),
        )
        .route(
            "/walletgroups",
            get(wallet_groups::list).post(wallet_groups::create),
        )
        .route(
            "/walletgroups/{id}",
            get(wallet_groups::get)
                .put(wallet_groups::rename)
                .delete(wallet_groups::delete),
        )
        .route("/walletgroups/{id}/wallets", get(memberships::group_wallets))
        .route(
            "/walletgroups/{id}/wallets/{wallet_id}",
            post(memberships::attach_group_wallet).delete(memberships::detach_group_wallet),
        )
        .route("/persons", get(persons::list).post(persons::create))
        .route(
            "/persons/{id}",
            get(persons::get).put(persons::update).delete(persons::delete),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
}

/// The whole API, mounted under `/api`.
pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(ServerState { engine })
}

pub async fn run(engine: Engine, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
