use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use tracing::info;

use crate::{EngineError, NewUserCmd, ResultEngine, User, UserPatch, transactions, users};

use super::{Engine, find_user, find_wallet, normalize_optional_text, with_tx};

const EMAIL_DOMAIN: &str = "moneyplanner.local";

impl Engine {
    /// Create a user. Missing name and email get derived from the username.
    pub async fn create_user(&self, cmd: NewUserCmd) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = insert_user(&db_tx, cmd).await?;
            Ok(User::from(model))
        })
    }

    pub async fn user(&self, id: i64) -> ResultEngine<User> {
        Ok(find_user(&self.database, id).await?.into())
    }

    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn update_user(&self, id: i64, patch: UserPatch) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = find_user(&db_tx, id).await?;
            if patch.is_empty() {
                return Ok(User::from(model));
            }

            let label = format!("user '{}'", model.username);
            let mut active: users::ActiveModel = model.into();
            if let Some(username) = patch.username.as_deref() {
                active.username = ActiveValue::Set(required_username(username)?);
            }
            if let Some(name) = normalize_optional_text(patch.name.as_deref()) {
                active.name = ActiveValue::Set(name);
            }
            if let Some(email) = normalize_optional_text(patch.email.as_deref()) {
                active.email = ActiveValue::Set(email);
            }
            if let Some(user_type) = patch.user_type {
                active.user_type = ActiveValue::Set(user_type.as_str().to_string());
            }
            if let Some(default_wallet_id) = patch.default_wallet_id {
                if let Some(wallet_id) = default_wallet_id {
                    find_wallet(&db_tx, wallet_id).await?;
                }
                active.default_wallet_id = ActiveValue::Set(default_wallet_id);
            }

            let updated = active
                .update(&db_tx)
                .await
                .map_err(|err| EngineError::from_constraint(err, &label))?;
            info!(user_id = id, "user updated");
            Ok(User::from(updated))
        })
    }

    /// Delete a user that recorded no transactions.
    pub async fn delete_user(&self, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = find_user(&db_tx, id).await?;
            let recorded = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(id))
                .count(&db_tx)
                .await?;
            if recorded > 0 {
                return Err(EngineError::InUse(format!(
                    "user '{}' recorded {recorded} transactions",
                    model.username
                )));
            }
            users::Entity::delete_by_id(id).exec(&db_tx).await?;
            info!(user_id = id, "user deleted");
            Ok(())
        })
    }
}

pub(super) async fn insert_user(
    db_tx: &DatabaseTransaction,
    cmd: NewUserCmd,
) -> ResultEngine<users::Model> {
    let username = required_username(&cmd.username)?;
    let name = normalize_optional_text(cmd.name.as_deref())
        .unwrap_or_else(|| display_name(&username));
    let email = normalize_optional_text(cmd.email.as_deref())
        .unwrap_or_else(|| format!("{username}@{EMAIL_DOMAIN}"));
    if let Some(wallet_id) = cmd.default_wallet_id {
        find_wallet(db_tx, wallet_id).await?;
    }

    let label = format!("user '{username}'");
    let model = users::ActiveModel {
        id: ActiveValue::NotSet,
        username: ActiveValue::Set(username),
        name: ActiveValue::Set(name),
        email: ActiveValue::Set(email),
        user_type: ActiveValue::Set(cmd.user_type.as_str().to_string()),
        default_wallet_id: ActiveValue::Set(cmd.default_wallet_id),
    }
    .insert(db_tx)
    .await
    .map_err(|err| EngineError::from_constraint(err, &label))?;
    info!(user_id = model.id, username = %model.username, "user created");
    Ok(model)
}

fn required_username(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MissingField("username".to_string()));
    }
    Ok(trimmed.to_string())
}

/// `john_doe` → `John Doe`.
pub(super) fn display_name(username: &str) -> String {
    username
        .split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_capitalizes_words() {
        assert_eq!(display_name("alice"), "Alice");
        assert_eq!(display_name("john_doe"), "John Doe");
        assert_eq!(display_name("mary-jane_watson"), "Mary Jane Watson");
    }

    #[test]
    fn username_is_required() {
        assert_eq!(
            required_username("  "),
            Err(EngineError::MissingField("username".to_string()))
        );
        assert_eq!(required_username(" bob "), Ok("bob".to_string()));
    }
}
