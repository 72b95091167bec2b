use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
    sea_query::Expr,
};
use tracing::{info, warn};

use crate::{
    AuxiliaryFailure, AuxiliaryStep, Category, CategoryPatch, EngineError, NewCategoryCmd,
    ResultEngine, WriteOutcome, categories, outcome::best_effort, transactions, wallets,
};

use super::{Engine, find_category, find_wallet, normalize_required_name, require_id, with_tx};

/// What a global-category propagation did, wallet by wallet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub category_id: i64,
    /// Mirrors created by this run.
    pub created: Vec<Category>,
    /// Wallets that already had a global category with the same name.
    pub skipped_wallets: Vec<i64>,
    /// Wallets where the mirror could not be written.
    pub failed: Vec<(i64, String)>,
}

impl SyncReport {
    fn failure_warnings(&self) -> impl Iterator<Item = AuxiliaryFailure> + '_ {
        self.failed
            .iter()
            .map(|(wallet_id, message)| AuxiliaryFailure {
                step: AuxiliaryStep::GlobalPropagation,
                message: format!("wallet {wallet_id}: {message}"),
            })
    }
}

impl Engine {
    /// Get a category, optionally requiring it to live in `wallet_scope`.
    pub async fn category(&self, id: i64, wallet_scope: Option<i64>) -> ResultEngine<Category> {
        Ok(scoped_category(&self.database, id, wallet_scope).await?.into())
    }

    /// Flat list of the categories of a wallet, in creation order.
    pub async fn list_categories(&self, wallet_id: i64) -> ResultEngine<Vec<Category>> {
        find_wallet(&self.database, wallet_id).await?;
        let models = categories::Entity::find()
            .filter(categories::Column::WalletId.eq(wallet_id))
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    /// Create a category.
    ///
    /// Without a parent the category becomes its own root. With a parent it
    /// inherits the parent's `root_id`, read live inside the same database
    /// transaction. A global category is then mirrored into every other
    /// wallet; propagation failures are reported as warnings.
    pub async fn create_category(
        &self,
        cmd: NewCategoryCmd,
    ) -> ResultEngine<WriteOutcome<Category>> {
        with_tx!(self, |db_tx| {
            let wallet_id = require_id(cmd.wallet_id, "wallet_id")?;
            let name = normalize_required_name(&cmd.name, "category")?;
            find_wallet(&db_tx, wallet_id).await?;

            let parent = match cmd.parent_id.filter(|id| *id > 0) {
                Some(parent_id) => {
                    Some(validated_parent(&db_tx, wallet_id, None, parent_id).await?)
                }
                None => None,
            };

            let label = format!("category '{name}'");
            let active = categories::ActiveModel {
                id: ActiveValue::NotSet,
                wallet_id: ActiveValue::Set(wallet_id),
                name: ActiveValue::Set(name),
                icon: ActiveValue::Set(cmd.icon.trim().to_string()),
                parent_id: ActiveValue::Set(parent.as_ref().map(|p| p.id)),
                root_id: ActiveValue::Set(parent.as_ref().map_or(0, |p| p.root_id)),
                is_global: ActiveValue::Set(cmd.is_global),
            };
            let mut model = active
                .insert(&db_tx)
                .await
                .map_err(|err| EngineError::from_constraint(err, &label))?;

            if model.parent_id.is_none() {
                model = make_own_root(&db_tx, model).await?;
            }

            let mut warnings = Vec::new();
            if model.is_global
                && let Some(report) =
                    best_effort!(&db_tx, warnings, AuxiliaryStep::GlobalPropagation, |sp| {
                        propagate_global(&sp, &model).await?
                    })
            {
                warnings.extend(report.failure_warnings());
            }

            info!(
                category_id = model.id,
                wallet_id,
                root_id = model.root_id,
                "category created"
            );
            Ok(WriteOutcome::with_warnings(Category::from(model), warnings))
        })
    }

    /// Apply a partial update to a category.
    ///
    /// Changing the parent recomputes `root_id` like creation does and
    /// rewrites the `root_id` of every descendant. Setting `is_global` to
    /// true propagates the category; clearing it leaves existing mirrors.
    pub async fn update_category(
        &self,
        id: i64,
        wallet_scope: Option<i64>,
        patch: CategoryPatch,
    ) -> ResultEngine<WriteOutcome<Category>> {
        with_tx!(self, |db_tx| {
            let model = scoped_category(&db_tx, id, wallet_scope).await?;
            if patch.is_empty() {
                return Ok(WriteOutcome::new(Category::from(model)));
            }

            let old_root = model.root_id;
            let mut label = format!("category '{}'", model.name);
            let mut active: categories::ActiveModel = model.clone().into();

            if let Some(name) = patch.name.as_deref() {
                let name = normalize_required_name(name, "category")?;
                label = format!("category '{name}'");
                active.name = ActiveValue::Set(name);
            }
            if let Some(icon) = patch.icon.as_deref() {
                active.icon = ActiveValue::Set(icon.trim().to_string());
            }
            if let Some(parent_id) = patch.parent_id {
                match parent_id.filter(|id| *id > 0) {
                    Some(parent_id) => {
                        let parent =
                            validated_parent(&db_tx, model.wallet_id, Some(model.id), parent_id)
                                .await?;
                        active.parent_id = ActiveValue::Set(Some(parent.id));
                        active.root_id = ActiveValue::Set(parent.root_id);
                    }
                    None => {
                        active.parent_id = ActiveValue::Set(None);
                        active.root_id = ActiveValue::Set(model.id);
                    }
                }
            }
            if let Some(is_global) = patch.is_global {
                active.is_global = ActiveValue::Set(is_global);
            }

            let updated = active
                .update(&db_tx)
                .await
                .map_err(|err| EngineError::from_constraint(err, &label))?;

            if updated.root_id != old_root {
                cascade_root(&db_tx, &updated).await?;
            }

            let mut warnings = Vec::new();
            if patch.is_global == Some(true)
                && let Some(report) =
                    best_effort!(&db_tx, warnings, AuxiliaryStep::GlobalPropagation, |sp| {
                        propagate_global(&sp, &updated).await?
                    })
            {
                warnings.extend(report.failure_warnings());
            }

            info!(category_id = id, root_id = updated.root_id, "category updated");
            Ok(WriteOutcome::with_warnings(Category::from(updated), warnings))
        })
    }

    /// Delete a category that has no children and no transactions.
    pub async fn delete_category(&self, id: i64, wallet_scope: Option<i64>) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = scoped_category(&db_tx, id, wallet_scope).await?;

            let children = categories::Entity::find()
                .filter(categories::Column::ParentId.eq(id))
                .count(&db_tx)
                .await?;
            if children > 0 {
                return Err(EngineError::HasChildren(model.name));
            }

            let used_by = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(id))
                .count(&db_tx)
                .await?;
            if used_by > 0 {
                return Err(EngineError::InUse(format!(
                    "category '{}' has {used_by} transactions",
                    model.name
                )));
            }

            categories::Entity::delete_by_id(id).exec(&db_tx).await?;
            info!(category_id = id, "category deleted");
            Ok(())
        })
    }

    /// Copy a global category into every wallet that does not have a global
    /// category with the same name yet. Running it twice creates nothing the
    /// second time.
    pub async fn sync_global_category(
        &self,
        id: i64,
        wallet_scope: Option<i64>,
    ) -> ResultEngine<SyncReport> {
        with_tx!(self, |db_tx| {
            let model = scoped_category(&db_tx, id, wallet_scope).await?;
            propagate_global(&db_tx, &model).await
        })
    }

    /// Create the default category set of a wallet: the Income and Expense
    /// global roots with their usual children. Returns the two roots.
    pub(super) async fn create_default_categories(
        db_tx: &DatabaseTransaction,
        wallet_id: i64,
        warnings: &mut Vec<AuxiliaryFailure>,
    ) -> ResultEngine<Vec<Category>> {
        const DEFAULTS: [(&str, &str, &str, &[&str]); 2] = [
            ("Income", "💵", "📊", &["Salary", "Refund", "Bonus", "Interest"]),
            (
                "Expense",
                "💸",
                "📉",
                &[
                    "Groceries",
                    "House Maintenance",
                    "Investment",
                    "Utilities",
                    "Transport",
                    "Entertainment",
                ],
            ),
        ];

        // Both roots first, so a fresh store hands them the canonical ids.
        let mut roots = Vec::with_capacity(DEFAULTS.len());
        for (name, icon, _, _) in DEFAULTS {
            let root = categories::ActiveModel {
                id: ActiveValue::NotSet,
                wallet_id: ActiveValue::Set(wallet_id),
                name: ActiveValue::Set(name.to_string()),
                icon: ActiveValue::Set(icon.to_string()),
                parent_id: ActiveValue::Set(None),
                root_id: ActiveValue::Set(0),
                is_global: ActiveValue::Set(true),
            }
            .insert(db_tx)
            .await?;
            roots.push(make_own_root(db_tx, root).await?);
        }

        for (root, (_, _, child_icon, children)) in roots.iter().zip(DEFAULTS) {
            for child in children {
                categories::ActiveModel {
                    id: ActiveValue::NotSet,
                    wallet_id: ActiveValue::Set(wallet_id),
                    name: ActiveValue::Set(child.to_string()),
                    icon: ActiveValue::Set(child_icon.to_string()),
                    parent_id: ActiveValue::Set(Some(root.id)),
                    root_id: ActiveValue::Set(root.root_id),
                    is_global: ActiveValue::Set(false),
                }
                .insert(db_tx)
                .await?;
            }
        }

        for root in &roots {
            if let Some(report) =
                best_effort!(db_tx, warnings, AuxiliaryStep::GlobalPropagation, |sp| {
                    propagate_global(&sp, root).await?
                })
            {
                warnings.extend(report.failure_warnings());
            }
        }

        Ok(roots.into_iter().map(Category::from).collect())
    }
}

async fn scoped_category<C: ConnectionTrait>(
    db: &C,
    id: i64,
    wallet_scope: Option<i64>,
) -> ResultEngine<categories::Model> {
    let model = find_category(db, id).await?;
    if wallet_scope.is_some_and(|wallet_id| wallet_id != model.wallet_id) {
        return Err(EngineError::KeyNotFound(format!("category {id}")));
    }
    Ok(model)
}

async fn make_own_root(
    db_tx: &DatabaseTransaction,
    model: categories::Model,
) -> ResultEngine<categories::Model> {
    let id = model.id;
    let mut active: categories::ActiveModel = model.into();
    active.root_id = ActiveValue::Set(id);
    Ok(active.update(db_tx).await?)
}

/// Read `parent_id` and check it can parent `child_id` inside `wallet_id`.
async fn validated_parent(
    db_tx: &DatabaseTransaction,
    wallet_id: i64,
    child_id: Option<i64>,
    parent_id: i64,
) -> ResultEngine<categories::Model> {
    let parent = find_category(db_tx, parent_id).await?;
    if parent.wallet_id != wallet_id {
        return Err(EngineError::InvalidParent(format!(
            "category {parent_id} belongs to another wallet"
        )));
    }
    if let Some(child_id) = child_id {
        if child_id == parent_id {
            return Err(EngineError::InvalidParent(
                "a category cannot be its own parent".to_string(),
            ));
        }
        if descendant_ids(db_tx, wallet_id, child_id)
            .await?
            .contains(&parent_id)
        {
            return Err(EngineError::InvalidParent(format!(
                "category {parent_id} is a descendant of category {child_id}"
            )));
        }
    }
    Ok(parent)
}

/// Ids of every category below `id`, in breadth-first order.
async fn descendant_ids(
    db_tx: &DatabaseTransaction,
    wallet_id: i64,
    id: i64,
) -> ResultEngine<Vec<i64>> {
    let rows = categories::Entity::find()
        .filter(categories::Column::WalletId.eq(wallet_id))
        .filter(categories::Column::ParentId.is_not_null())
        .all(db_tx)
        .await?;

    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    for row in &rows {
        if let Some(parent_id) = row.parent_id {
            children.entry(parent_id).or_default().push(row.id);
        }
    }

    let mut seen = HashSet::from([id]);
    let mut out = Vec::new();
    let mut cursor = 0;
    let mut frontier = vec![id];
    while cursor < frontier.len() {
        let current = frontier[cursor];
        cursor += 1;
        for child in children.remove(&current).unwrap_or_default() {
            if seen.insert(child) {
                out.push(child);
                frontier.push(child);
            }
        }
    }
    Ok(out)
}

async fn cascade_root(db_tx: &DatabaseTransaction, model: &categories::Model) -> ResultEngine<()> {
    let descendants = descendant_ids(db_tx, model.wallet_id, model.id).await?;
    if descendants.is_empty() {
        return Ok(());
    }
    let result = categories::Entity::update_many()
        .col_expr(categories::Column::RootId, Expr::value(model.root_id))
        .filter(categories::Column::Id.is_in(descendants))
        .exec(db_tx)
        .await?;
    info!(
        category_id = model.id,
        root_id = model.root_id,
        rewritten = result.rows_affected,
        "root cascaded to descendants"
    );
    Ok(())
}

/// Mirror a global category into every other wallet.
async fn propagate_global(
    db_tx: &DatabaseTransaction,
    source: &categories::Model,
) -> ResultEngine<SyncReport> {
    if !source.is_global {
        return Err(EngineError::NotGlobal(source.id));
    }

    let mut report = SyncReport {
        category_id: source.id,
        ..SyncReport::default()
    };

    let present: HashSet<i64> = categories::Entity::find()
        .filter(categories::Column::Name.eq(source.name.as_str()))
        .filter(categories::Column::IsGlobal.eq(true))
        .all(db_tx)
        .await?
        .into_iter()
        .map(|model| model.wallet_id)
        .collect();

    let wallet_ids: Vec<i64> = wallets::Entity::find()
        .order_by_asc(wallets::Column::Id)
        .all(db_tx)
        .await?
        .into_iter()
        .map(|wallet| wallet.id)
        .collect();

    for wallet_id in wallet_ids {
        if wallet_id == source.wallet_id {
            continue;
        }
        if present.contains(&wallet_id) {
            report.skipped_wallets.push(wallet_id);
            continue;
        }
        match insert_mirror(db_tx, source, wallet_id).await {
            Ok(mirror) => report.created.push(mirror.into()),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                report.skipped_wallets.push(wallet_id);
            }
            Err(err) => {
                warn!(
                    category_id = source.id,
                    wallet_id,
                    error = %err,
                    "global category mirror failed"
                );
                report.failed.push((wallet_id, err.to_string()));
            }
        }
    }

    info!(
        category_id = source.id,
        created = report.created.len(),
        skipped = report.skipped_wallets.len(),
        failed = report.failed.len(),
        "global category propagated"
    );
    Ok(report)
}

/// Insert one mirror in its own savepoint so a failure leaves no half row.
async fn insert_mirror(
    db_tx: &DatabaseTransaction,
    source: &categories::Model,
    wallet_id: i64,
) -> Result<categories::Model, DbErr> {
    let sp = db_tx.begin().await?;
    let model = categories::ActiveModel {
        id: ActiveValue::NotSet,
        wallet_id: ActiveValue::Set(wallet_id),
        name: ActiveValue::Set(source.name.clone()),
        icon: ActiveValue::Set(source.icon.clone()),
        parent_id: ActiveValue::Set(None),
        root_id: ActiveValue::Set(0),
        is_global: ActiveValue::Set(true),
    }
    .insert(&sp)
    .await?;

    let id = model.id;
    let mut active: categories::ActiveModel = model.into();
    active.root_id = ActiveValue::Set(id);
    let model = active.update(&sp).await?;
    sp.commit().await?;
    Ok(model)
}
