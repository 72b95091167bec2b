use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait};

use crate::{EngineError, ResultEngine};

mod balances;
mod bootstrap;
mod categories;
mod category_tree;
mod memberships;
mod persons;
mod transactions;
mod users;
mod wallet_groups;
mod wallets;

pub use bootstrap::{InitReport, SetupReport};
pub use categories::SyncReport;
pub use transactions::{AmountFilter, AmountOp, TimeRange, TransactionListFilter};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every operation. Holds the database handle.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The underlying connection, for callers that run migrations or probes.
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MissingField(format!("{label} name")));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn require_id(value: i64, field: &str) -> ResultEngine<i64> {
    if value <= 0 {
        return Err(EngineError::MissingField(field.to_string()));
    }
    Ok(value)
}

async fn find_wallet<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> ResultEngine<crate::wallets::Model> {
    crate::wallets::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("wallet {id}")))
}

async fn find_category<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> ResultEngine<crate::categories::Model> {
    crate::categories::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("category {id}")))
}

async fn find_user<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> ResultEngine<crate::users::Model> {
    crate::users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("user {id}")))
}

async fn find_person<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> ResultEngine<crate::persons::Model> {
    crate::persons::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("person {id}")))
}

async fn find_wallet_group<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> ResultEngine<crate::wallet_groups::Model> {
    crate::wallet_groups::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("wallet group {id}")))
}

/// Load a transaction, optionally requiring it to belong to `wallet_scope`.
///
/// A transaction of another wallet is reported as missing.
async fn find_transaction<C: ConnectionTrait>(
    db: &C,
    id: i64,
    wallet_scope: Option<i64>,
) -> ResultEngine<crate::transactions::Model> {
    let not_found = || EngineError::KeyNotFound(format!("transaction {id}"));
    let model = crate::transactions::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)?;
    if wallet_scope.is_some_and(|wallet_id| wallet_id != model.wallet_id) {
        return Err(not_found());
    }
    Ok(model)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_names_are_trimmed() {
        assert_eq!(normalize_required_name("  Food ", "category"), Ok("Food".to_string()));
        assert_eq!(
            normalize_required_name("   ", "category"),
            Err(EngineError::MissingField("category name".to_string()))
        );
    }

    #[test]
    fn blank_optional_text_is_dropped() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" hi ")), Some("hi".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }

    #[test]
    fn ids_must_be_positive() {
        assert_eq!(require_id(4, "wallet_id"), Ok(4));
        assert_eq!(
            require_id(0, "wallet_id"),
            Err(EngineError::MissingField("wallet_id".to_string()))
        );
    }
}
