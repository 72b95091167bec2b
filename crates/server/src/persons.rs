use api_types::person::{PersonNew, PersonUpdate, PersonView};
use axum::extract::State;
use engine::PersonPatch;

use crate::{
    extract::{ApiJson, ApiPath},
    server::ServerState,
    views::{self, ApiCreated, ApiResult},
};

pub async fn list(State(state): State<ServerState>) -> ApiResult<Vec<PersonView>> {
    let persons = state
        .engine
        .list_persons()
        .await?
        .into_iter()
        .map(views::person)
        .collect();
    Ok(views::ok("persons listed", persons))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<PersonNew>,
) -> ApiCreated<PersonView> {
    let person = state
        .engine
        .create_person(&payload.name, payload.alias.as_deref())
        .await?;
    Ok(views::created(views::ok(
        "person created",
        views::person(person),
    )))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<PersonView> {
    let person = state.engine.person(id).await?;
    Ok(views::ok("person found", views::person(person)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<PersonUpdate>,
) -> ApiResult<PersonView> {
    let patch = PersonPatch {
        name: payload.name,
        alias: payload.alias,
    };
    let person = state.engine.update_person(id, patch).await?;
    Ok(views::ok("person updated", views::person(person)))
}

pub async fn delete(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> ApiResult<i64> {
    state.engine.delete_person(id).await?;
    Ok(views::ok("person deleted", id))
}
