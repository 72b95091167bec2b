use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder,
};
use tracing::info;

use crate::{
    AuxiliaryFailure, AuxiliaryStep, Category, EngineError, Money, NewTransactionCmd, Person,
    ResultEngine, Transaction, TransactionDetail, TransactionPatch, User, Wallet, WriteOutcome,
    categories, outcome::best_effort, persons, transactions, users, wallets,
};

use super::{
    Engine, find_category, find_person, find_transaction, find_user, find_wallet,
    normalize_optional_text, require_id, with_tx,
};

mod list;

use list::ApplyTxFilters;
pub use list::{AmountFilter, AmountOp, TimeRange, TransactionListFilter};

fn validate_amount(amount_minor: i64) -> ResultEngine<i64> {
    match amount_minor {
        0 => Err(EngineError::MissingField("amount".to_string())),
        a if a < 0 => Err(EngineError::InvalidAmount(
            "amount must be positive, the sign comes from the category".to_string(),
        )),
        a if a > Money::MAX_AMOUNT.minor() => Err(EngineError::InvalidAmount(format!(
            "amount must not exceed {}",
            Money::MAX_AMOUNT
        ))),
        a => Ok(a),
    }
}

impl Engine {
    /// Record a transaction and move the wallet balance accordingly.
    ///
    /// The row write is the primary effect. The balance adjustment and the
    /// reload of the relations run in savepoints: if one fails the
    /// transaction is still recorded and the failure is returned as a
    /// warning.
    pub async fn create_transaction(
        &self,
        cmd: NewTransactionCmd,
    ) -> ResultEngine<WriteOutcome<TransactionDetail>> {
        with_tx!(self, |db_tx| {
            let wallet_id = require_id(cmd.wallet_id, "wallet_id")?;
            let category_id = require_id(cmd.category_id, "category_id")?;
            let user_id = require_id(cmd.user_id, "user_id")?;
            let amount_minor = validate_amount(cmd.amount_minor)?;

            find_wallet(&db_tx, wallet_id).await?;
            find_category(&db_tx, category_id).await?;
            find_user(&db_tx, user_id).await?;
            let person_id =
                resolve_person(&db_tx, cmd.person_id, cmd.person_name.as_deref()).await?;

            let now = Utc::now();
            let model = transactions::ActiveModel {
                id: ActiveValue::NotSet,
                wallet_id: ActiveValue::Set(wallet_id),
                category_id: ActiveValue::Set(category_id),
                user_id: ActiveValue::Set(user_id),
                person_id: ActiveValue::Set(person_id),
                amount_minor: ActiveValue::Set(amount_minor),
                note: ActiveValue::Set(normalize_optional_text(cmd.note.as_deref())),
                transaction_time: ActiveValue::Set(cmd.transaction_time.unwrap_or(now)),
                entry_time: ActiveValue::Set(now),
                last_modified_time: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            let mut warnings = Vec::new();
            best_effort!(&db_tx, warnings, AuxiliaryStep::BalanceAdjustment, |sp| {
                let category = find_category(&sp, model.category_id).await?;
                Self::adjust_balance(&sp, model.wallet_id, category.root_id, model.amount_minor)
                    .await?
            });

            info!(
                transaction_id = model.id,
                wallet_id, category_id, amount_minor, "transaction created"
            );
            let detail = reload_detail(&db_tx, model, &mut warnings).await;
            Ok(WriteOutcome::with_warnings(detail, warnings))
        })
    }

    /// Get a transaction with its relations.
    ///
    /// With `wallet_scope` set, a transaction of another wallet is reported
    /// as not found.
    pub async fn transaction(
        &self,
        id: i64,
        wallet_scope: Option<i64>,
    ) -> ResultEngine<TransactionDetail> {
        let model = find_transaction(&self.database, id, wallet_scope).await?;
        load_detail(&self.database, model).await
    }

    /// Apply a partial update.
    ///
    /// The old category root, amount and wallet are captured before the row
    /// changes. After the write the old effect is reversed and the new one
    /// applied, both in one savepoint, so the balance moves by both or by
    /// neither. An empty patch writes nothing.
    pub async fn update_transaction(
        &self,
        id: i64,
        wallet_scope: Option<i64>,
        patch: TransactionPatch,
    ) -> ResultEngine<WriteOutcome<TransactionDetail>> {
        with_tx!(self, |db_tx| {
            let old = find_transaction(&db_tx, id, wallet_scope).await?;
            if patch.is_empty() {
                return Ok(WriteOutcome::new(load_detail(&db_tx, old).await?));
            }

            let old_root = find_category(&db_tx, old.category_id).await?.root_id;
            let old_wallet = old.wallet_id;
            let old_amount = old.amount_minor;

            let mut active: transactions::ActiveModel = old.into();
            if let Some(wallet_id) = patch.wallet_id {
                let wallet_id = require_id(wallet_id, "wallet_id")?;
                find_wallet(&db_tx, wallet_id).await?;
                active.wallet_id = ActiveValue::Set(wallet_id);
            }
            if let Some(category_id) = patch.category_id {
                let category_id = require_id(category_id, "category_id")?;
                find_category(&db_tx, category_id).await?;
                active.category_id = ActiveValue::Set(category_id);
            }
            if let Some(amount_minor) = patch.amount_minor {
                active.amount_minor = ActiveValue::Set(validate_amount(amount_minor)?);
            }
            if let Some(note) = patch.note.as_deref() {
                active.note = ActiveValue::Set(normalize_optional_text(Some(note)));
            }
            if let Some(at) = patch.transaction_time {
                active.transaction_time = ActiveValue::Set(at);
            }
            let name_given = patch
                .person_name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty());
            if patch.person_id.is_some() || name_given {
                let person_id =
                    resolve_person(&db_tx, patch.person_id, patch.person_name.as_deref()).await?;
                active.person_id = ActiveValue::Set(person_id);
            }
            active.last_modified_time = ActiveValue::Set(Utc::now());

            let updated = active.update(&db_tx).await?;

            let mut warnings = Vec::new();
            best_effort!(&db_tx, warnings, AuxiliaryStep::BalanceAdjustment, |sp| {
                Self::adjust_balance(&sp, old_wallet, old_root, -old_amount).await?;
                let category = find_category(&sp, updated.category_id).await?;
                Self::adjust_balance(
                    &sp,
                    updated.wallet_id,
                    category.root_id,
                    updated.amount_minor,
                )
                .await?
            });

            info!(transaction_id = id, "transaction updated");
            let detail = reload_detail(&db_tx, updated, &mut warnings).await;
            Ok(WriteOutcome::with_warnings(detail, warnings))
        })
    }

    /// Reverse the balance effect of a transaction, then delete it.
    pub async fn delete_transaction(
        &self,
        id: i64,
        wallet_scope: Option<i64>,
    ) -> ResultEngine<WriteOutcome<Transaction>> {
        with_tx!(self, |db_tx| {
            let model = find_transaction(&db_tx, id, wallet_scope).await?;

            let mut warnings = Vec::new();
            best_effort!(&db_tx, warnings, AuxiliaryStep::BalanceAdjustment, |sp| {
                let category = find_category(&sp, model.category_id).await?;
                Self::adjust_balance(&sp, model.wallet_id, category.root_id, -model.amount_minor)
                    .await?
            });

            transactions::Entity::delete_by_id(id).exec(&db_tx).await?;
            info!(transaction_id = id, "transaction deleted");
            Ok(WriteOutcome::with_warnings(Transaction::from(model), warnings))
        })
    }

    /// List transactions matching `filter`, newest first.
    pub async fn list_transactions(
        &self,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        filter.validate()?;
        let models = transactions::Entity::find()
            .apply_tx_filters(filter)
            .order_by_desc(transactions::Column::TransactionTime)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        load_details(&self.database, models).await
    }

    /// Transactions of one wallet. The wallet must exist.
    pub async fn wallet_transactions(
        &self,
        wallet_id: i64,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        find_wallet(&self.database, wallet_id).await?;
        self.list_transactions(&filter.clone().wallet_id(wallet_id))
            .await
    }

    /// Transactions recorded by one user. The user must exist.
    pub async fn user_transactions(
        &self,
        user_id: i64,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        find_user(&self.database, user_id).await?;
        self.list_transactions(&filter.clone().user_id(user_id))
            .await
    }
}

/// An explicit person id wins; otherwise the name is resolved (or created).
async fn resolve_person(
    db_tx: &DatabaseTransaction,
    person_id: Option<i64>,
    person_name: Option<&str>,
) -> ResultEngine<Option<i64>> {
    if let Some(person_id) = person_id {
        if person_id <= 0 {
            return Ok(None);
        }
        return Ok(Some(find_person(db_tx, person_id).await?.id));
    }
    match person_name {
        Some(name) => Engine::resolve_or_create_person(db_tx, name).await,
        None => Ok(None),
    }
}

/// Reload the relations of a freshly written row. A failure leaves them
/// empty and is recorded as a warning.
async fn reload_detail(
    db_tx: &DatabaseTransaction,
    model: transactions::Model,
    warnings: &mut Vec<AuxiliaryFailure>,
) -> TransactionDetail {
    let fallback = Transaction::from(model.clone());
    best_effort!(db_tx, warnings, AuxiliaryStep::RelationReload, |sp| {
        load_detail(&sp, model).await?
    })
    .unwrap_or_else(|| TransactionDetail::bare(fallback))
}

async fn load_detail<C: ConnectionTrait>(
    db: &C,
    model: transactions::Model,
) -> ResultEngine<TransactionDetail> {
    let id = model.id;
    load_details(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")))
}

/// Attach category, wallet, person and user to each row, one query per
/// relation.
async fn load_details<C: ConnectionTrait>(
    db: &C,
    models: Vec<transactions::Model>,
) -> ResultEngine<Vec<TransactionDetail>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let category_ids: HashSet<i64> = models.iter().map(|m| m.category_id).collect();
    let wallet_ids: HashSet<i64> = models.iter().map(|m| m.wallet_id).collect();
    let user_ids: HashSet<i64> = models.iter().map(|m| m.user_id).collect();
    let person_ids: HashSet<i64> = models.iter().filter_map(|m| m.person_id).collect();

    let categories: HashMap<i64, Category> = categories::Entity::find()
        .filter(categories::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, Category::from(m)))
        .collect();
    let wallets: HashMap<i64, Wallet> = wallets::Entity::find()
        .filter(wallets::Column::Id.is_in(wallet_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, Wallet::from(m)))
        .collect();
    let users: HashMap<i64, User> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, User::from(m)))
        .collect();
    let persons: HashMap<i64, Person> = if person_ids.is_empty() {
        HashMap::new()
    } else {
        persons::Entity::find()
            .filter(persons::Column::Id.is_in(person_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, Person::from(m)))
            .collect()
    };

    Ok(models
        .into_iter()
        .map(|model| {
            let transaction = Transaction::from(model);
            TransactionDetail {
                category: categories.get(&transaction.category_id).cloned(),
                wallet: wallets.get(&transaction.wallet_id).cloned(),
                person: transaction
                    .person_id
                    .and_then(|id| persons.get(&id).cloned()),
                user: users.get(&transaction.user_id).cloned(),
                transaction,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_must_be_positive() {
        assert_eq!(validate_amount(1), Ok(1));
        assert_eq!(
            validate_amount(0),
            Err(EngineError::MissingField("amount".to_string()))
        );
        assert!(matches!(
            validate_amount(-5),
            Err(EngineError::InvalidAmount(_))
        ));
        assert_eq!(
            validate_amount(Money::MAX_AMOUNT.minor()),
            Ok(Money::MAX_AMOUNT.minor())
        );
        assert!(matches!(
            validate_amount(Money::MAX_AMOUNT.minor() + 1),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(i64::MAX),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
