//! Transactions API endpoints.
//!
//! The global routes take the wallet from the body; the wallet-scoped ones
//! take it from the path and answer 404 for a transaction of another wallet.

use std::str::FromStr;

use api_types::transaction::{
    TransactionFilterQuery, TransactionNew, TransactionUpdate, TransactionView,
};
use axum::extract::State;
use engine::{AmountOp, Money, NewTransactionCmd, TransactionListFilter, TransactionPatch};

use crate::{
    ServerError,
    extract::{ApiJson, ApiPath, ApiQuery},
    server::ServerState,
    views::{self, ApiCreated, ApiResult},
};

fn list_filter(query: TransactionFilterQuery) -> Result<TransactionListFilter, ServerError> {
    let mut filter = TransactionListFilter::default()
        .transaction_time(query.start_transaction_time, query.end_transaction_time)
        .entry_time(query.start_entry_time, query.end_entry_time)
        .last_modified_time(query.start_last_modified_time, query.end_last_modified_time)
        .category_ids(query.category_ids);

    if let Some(user_id) = query.user_id {
        filter = filter.user_id(user_id);
    }
    if let Some(wallet_id) = query.wallet_id {
        filter = filter.wallet_id(wallet_id);
    }
    if let Some(person_id) = query.person_id {
        filter = filter.person_id(person_id);
    }
    if let Some(note) = query.fuzzy_note.filter(|note| !note.trim().is_empty()) {
        filter = filter.fuzzy_note(note);
    }
    // An operator without a value (or the reverse) does not filter.
    if let (Some(op), Some(value)) = (query.amount_op.as_deref(), query.amount_value) {
        filter = filter.amount(AmountOp::from_str(op)?, value);
    }
    Ok(filter)
}

fn decimal_amount(raw: Option<&str>) -> Result<Option<i64>, ServerError> {
    Ok(raw.map(Money::from_str).transpose()?.map(Money::minor))
}

fn new_cmd(payload: TransactionNew, wallet_id: i64) -> Result<NewTransactionCmd, ServerError> {
    let amount_minor = decimal_amount(payload.amount.as_deref())?.unwrap_or(payload.amount_minor);
    let mut cmd = NewTransactionCmd::new(
        wallet_id,
        payload.category_id,
        payload.user_id,
        amount_minor,
    );
    cmd.person_id = payload.person_id;
    cmd.person_name = payload.person_name;
    cmd.note = payload.note;
    cmd.transaction_time = payload.transaction_time;
    Ok(cmd)
}

fn patch(payload: TransactionUpdate) -> Result<TransactionPatch, ServerError> {
    let amount_minor = decimal_amount(payload.amount.as_deref())?.or(payload.amount_minor);
    Ok(TransactionPatch {
        wallet_id: payload.wallet_id,
        category_id: payload.category_id,
        amount_minor,
        note: payload.note,
        transaction_time: payload.transaction_time,
        person_id: payload.person_id,
        person_name: payload.person_name,
    })
}

fn views(details: Vec<engine::TransactionDetail>) -> Vec<TransactionView> {
    details.into_iter().map(views::transaction).collect()
}

pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<TransactionFilterQuery>,
) -> ApiResult<Vec<TransactionView>> {
    let filter = list_filter(query)?;
    let details = state.engine.list_transactions(&filter).await?;
    Ok(views::ok("transactions listed", views(details)))
}

pub async fn create(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TransactionNew>,
) -> ApiCreated<TransactionView> {
    let wallet_id = payload.wallet_id;
    let outcome = state
        .engine
        .create_transaction(new_cmd(payload, wallet_id)?)
        .await?;
    Ok(views::created(views::written(
        "transaction created",
        outcome,
        views::transaction,
    )))
}

pub async fn get(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<TransactionView> {
    let detail = state.engine.transaction(id, None).await?;
    Ok(views::ok("transaction found", views::transaction(detail)))
}

pub async fn update(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<TransactionUpdate>,
) -> ApiResult<TransactionView> {
    let outcome = state
        .engine
        .update_transaction(id, None, patch(payload)?)
        .await?;
    Ok(views::written(
        "transaction updated",
        outcome,
        views::transaction,
    ))
}

pub async fn delete(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<TransactionView> {
    let outcome = state.engine.delete_transaction(id, None).await?;
    Ok(views::written(
        "transaction deleted",
        outcome,
        views::deleted_transaction,
    ))
}

pub async fn wallet_list(
    State(state): State<ServerState>,
    ApiPath(wallet_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<TransactionFilterQuery>,
) -> ApiResult<Vec<TransactionView>> {
    let filter = list_filter(query)?;
    let details = state.engine.wallet_transactions(wallet_id, &filter).await?;
    Ok(views::ok("transactions listed", views(details)))
}

pub async fn wallet_create(
    State(state): State<ServerState>,
    ApiPath(wallet_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<TransactionNew>,
) -> ApiCreated<TransactionView> {
    let outcome = state
        .engine
        .create_transaction(new_cmd(payload, wallet_id)?)
        .await?;
    Ok(views::created(views::written(
        "transaction created",
        outcome,
        views::transaction,
    )))
}

pub async fn wallet_get(
    State(state): State<ServerState>,
    ApiPath((wallet_id, id)): ApiPath<(i64, i64)>,
) -> ApiResult<TransactionView> {
    let detail = state.engine.transaction(id, Some(wallet_id)).await?;
    Ok(views::ok("transaction found", views::transaction(detail)))
}

pub async fn wallet_update(
    State(state): State<ServerState>,
    ApiPath((wallet_id, id)): ApiPath<(i64, i64)>,
    ApiJson(payload): ApiJson<TransactionUpdate>,
) -> ApiResult<TransactionView> {
    let outcome = state
        .engine
        .update_transaction(id, Some(wallet_id), patch(payload)?)
        .await?;
    Ok(views::written(
        "transaction updated",
        outcome,
        views::transaction,
    ))
}

pub async fn wallet_delete(
    State(state): State<ServerState>,
    ApiPath((wallet_id, id)): ApiPath<(i64, i64)>,
) -> ApiResult<TransactionView> {
    let outcome = state
        .engine
        .delete_transaction(id, Some(wallet_id))
        .await?;
    Ok(views::written(
        "transaction deleted",
        outcome,
        views::deleted_transaction,
    ))
}

pub async fn user_list(
    State(state): State<ServerState>,
    ApiPath(user_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<TransactionFilterQuery>,
) -> ApiResult<Vec<TransactionView>> {
    let filter = list_filter(query)?;
    let details = state.engine.user_transactions(user_id, &filter).await?;
    Ok(views::ok("transactions listed", views(details)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_filter_needs_operator_and_value() {
        let only_value = TransactionFilterQuery {
            amount_value: Some(100),
            ..TransactionFilterQuery::default()
        };
        assert_eq!(list_filter(only_value).unwrap().amount, None);

        let both = TransactionFilterQuery {
            amount_op: Some("ge".to_string()),
            amount_value: Some(100),
            ..TransactionFilterQuery::default()
        };
        let filter = list_filter(both).unwrap();
        assert_eq!(
            filter.amount,
            Some(engine::AmountFilter {
                op: AmountOp::Ge,
                value_minor: 100
            })
        );
    }

    #[test]
    fn decimal_amount_wins_over_minor_units() {
        let payload = TransactionNew {
            category_id: 7,
            user_id: 1,
            amount_minor: 999,
            amount: Some("12,50".to_string()),
            ..TransactionNew::default()
        };
        assert_eq!(new_cmd(payload, 1).unwrap().amount_minor, 1250);

        let payload = TransactionNew {
            amount_minor: 999,
            ..TransactionNew::default()
        };
        assert_eq!(new_cmd(payload, 1).unwrap().amount_minor, 999);

        let update = TransactionUpdate {
            amount: Some("3".to_string()),
            ..TransactionUpdate::default()
        };
        assert_eq!(patch(update).unwrap().amount_minor, Some(300));
        assert_eq!(patch(TransactionUpdate::default()).unwrap().amount_minor, None);
    }

    #[test]
    fn malformed_decimal_amount_is_rejected() {
        let payload = TransactionNew {
            amount: Some("12.345".to_string()),
            ..TransactionNew::default()
        };
        assert!(matches!(
            new_cmd(payload, 1),
            Err(ServerError::Engine(engine::EngineError::InvalidAmount(_)))
        ));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let query = TransactionFilterQuery {
            amount_op: Some("around".to_string()),
            amount_value: Some(1),
            ..TransactionFilterQuery::default()
        };
        assert!(matches!(
            list_filter(query),
            Err(ServerError::Engine(engine::EngineError::InvalidFilter(_)))
        ));
    }

    #[test]
    fn blank_note_does_not_filter() {
        let query = TransactionFilterQuery {
            fuzzy_note: Some("  ".to_string()),
            category_ids: vec![3, 7],
            ..TransactionFilterQuery::default()
        };
        let filter = list_filter(query).unwrap();
        assert_eq!(filter.fuzzy_note, None);
        assert_eq!(filter.category_ids, vec![3, 7]);
    }
}
