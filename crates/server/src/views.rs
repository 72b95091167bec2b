//! Engine values → response bodies.

use api_types::{
    category::{CategoryNodeView, CategoryTreeView, CategoryView, SyncFailureView, SyncReportView},
    envelope::{ApiResponse, Warning},
    person::PersonView,
    transaction::TransactionView,
    user::{UserSetupView, UserView},
    wallet::WalletView,
    wallet_group::WalletGroupView,
};
use axum::{Json, http::StatusCode};
use engine::{AuxiliaryFailure, WriteOutcome};

pub(crate) type ApiResult<T> = Result<Json<ApiResponse<T>>, crate::ServerError>;
pub(crate) type ApiCreated<T> = Result<(StatusCode, Json<ApiResponse<T>>), crate::ServerError>;

pub(crate) fn ok<T>(message: &str, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(message, data))
}

/// Success envelope for a write, carrying its auxiliary failures.
pub(crate) fn written<T, U>(
    message: &str,
    outcome: WriteOutcome<T>,
    view: impl FnOnce(T) -> U,
) -> Json<ApiResponse<U>> {
    let (value, failures) = outcome.into_parts();
    Json(ApiResponse::ok(message, view(value)).with_warnings(warnings(failures)))
}

pub(crate) fn created<T>(body: Json<ApiResponse<T>>) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, body)
}

fn warnings(failures: Vec<AuxiliaryFailure>) -> Vec<Warning> {
    failures
        .into_iter()
        .map(|failure| Warning {
            step: failure.step.to_string(),
            message: failure.message,
        })
        .collect()
}

pub(crate) fn user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        name: user.name,
        email: user.email,
        user_type: user.user_type.as_str().to_string(),
        default_wallet_id: user.default_wallet_id,
    }
}

pub(crate) fn wallet(wallet: engine::Wallet) -> WalletView {
    WalletView {
        balance: wallet.balance().to_string(),
        id: wallet.id,
        name: wallet.name,
        icon: wallet.icon,
        is_enabled: wallet.is_enabled,
        balance_minor: wallet.balance_minor,
        last_modified_time: wallet.last_modified_time,
    }
}

pub(crate) fn wallet_group(group: engine::WalletGroup) -> WalletGroupView {
    WalletGroupView {
        id: group.id,
        name: group.name,
    }
}

pub(crate) fn person(person: engine::Person) -> PersonView {
    PersonView {
        id: person.id,
        name: person.name,
        alias: person.alias,
    }
}

pub(crate) fn category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        wallet_id: category.wallet_id,
        name: category.name,
        icon: category.icon,
        parent_id: category.parent_id,
        root_id: category.root_id,
        is_global: category.is_global,
    }
}

fn category_node(node: engine::CategoryNode) -> CategoryNodeView {
    CategoryNodeView {
        category: category(node.category),
        children: node.children.into_iter().map(category_node).collect(),
    }
}

pub(crate) fn category_tree(tree: engine::CategoryTree) -> CategoryTreeView {
    CategoryTreeView {
        wallet: wallet(tree.wallet),
        roots: tree.roots.into_iter().map(category_node).collect(),
    }
}

pub(crate) fn sync_report(report: engine::SyncReport) -> SyncReportView {
    SyncReportView {
        category_id: report.category_id,
        created: report.created.into_iter().map(category).collect(),
        skipped_wallets: report.skipped_wallets,
        failed: report
            .failed
            .into_iter()
            .map(|(wallet_id, error)| SyncFailureView { wallet_id, error })
            .collect(),
    }
}

pub(crate) fn transaction(detail: engine::TransactionDetail) -> TransactionView {
    let engine::TransactionDetail {
        transaction: tx,
        category: tx_category,
        wallet: tx_wallet,
        person: tx_person,
        user: tx_user,
    } = detail;
    TransactionView {
        amount: tx.amount().to_string(),
        id: tx.id,
        wallet_id: tx.wallet_id,
        category_id: tx.category_id,
        user_id: tx.user_id,
        person_id: tx.person_id,
        amount_minor: tx.amount_minor,
        note: tx.note,
        transaction_time: tx.transaction_time,
        entry_time: tx.entry_time,
        last_modified_time: tx.last_modified_time,
        category: tx_category.map(category),
        wallet: tx_wallet.map(wallet),
        person: tx_person.map(person),
        user: tx_user.map(user),
    }
}

/// A deleted transaction: the row only, its relations may be gone.
pub(crate) fn deleted_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        amount: tx.amount().to_string(),
        id: tx.id,
        wallet_id: tx.wallet_id,
        category_id: tx.category_id,
        user_id: tx.user_id,
        person_id: tx.person_id,
        amount_minor: tx.amount_minor,
        note: tx.note,
        transaction_time: tx.transaction_time,
        entry_time: tx.entry_time,
        last_modified_time: tx.last_modified_time,
        category: None,
        wallet: None,
        person: None,
        user: None,
    }
}

pub(crate) fn setup_report(report: engine::SetupReport) -> UserSetupView {
    UserSetupView {
        user: user(report.user),
        wallet: wallet(report.wallet),
        wallet_group: wallet_group(report.wallet_group),
        root_categories: report.root_categories.into_iter().map(category).collect(),
    }
}
