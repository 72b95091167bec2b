use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, SqlErr,
};
use tracing::info;

use crate::{EngineError, Person, PersonPatch, ResultEngine, persons};

use super::{Engine, find_person, normalize_required_name, with_tx};

impl Engine {
    /// Find a person by exact name, creating it when missing.
    ///
    /// A blank name resolves to no person and writes nothing. The unique
    /// index on the name makes a concurrent insert of the same name fail; in
    /// that case the row of the winner is returned.
    pub(super) async fn resolve_or_create_person<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> ResultEngine<Option<i64>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        if let Some(existing) = Self::person_by_name(db, name).await? {
            return Ok(Some(existing.id));
        }

        let active = persons::ActiveModel {
            id: ActiveValue::NotSet,
            person_name: ActiveValue::Set(name.to_string()),
            alias: ActiveValue::Set(String::new()),
        };
        match active.insert(db).await {
            Ok(model) => {
                info!(person_id = model.id, name, "person created");
                Ok(Some(model.id))
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = Self::person_by_name(db, name)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound(format!("person '{name}'")))?;
                Ok(Some(existing.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn person_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> ResultEngine<Option<persons::Model>> {
        Ok(persons::Entity::find()
            .filter(persons::Column::PersonName.eq(name))
            .one(db)
            .await?)
    }

    pub async fn create_person(&self, name: &str, alias: Option<&str>) -> ResultEngine<Person> {
        let name = normalize_required_name(name, "person")?;
        let label = format!("person '{name}'");
        let active = persons::ActiveModel {
            id: ActiveValue::NotSet,
            person_name: ActiveValue::Set(name),
            alias: ActiveValue::Set(alias.map(str::trim).unwrap_or_default().to_string()),
        };
        let model = active
            .insert(&self.database)
            .await
            .map_err(|err| EngineError::from_constraint(err, &label))?;
        info!(person_id = model.id, "person created");
        Ok(model.into())
    }

    pub async fn person(&self, id: i64) -> ResultEngine<Person> {
        Ok(find_person(&self.database, id).await?.into())
    }

    pub async fn person_named(&self, name: &str) -> ResultEngine<Option<Person>> {
        Ok(Self::person_by_name(&self.database, name.trim())
            .await?
            .map(Person::from))
    }

    pub async fn list_persons(&self) -> ResultEngine<Vec<Person>> {
        let models = persons::Entity::find()
            .order_by_asc(persons::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Person::from).collect())
    }

    pub async fn update_person(&self, id: i64, patch: PersonPatch) -> ResultEngine<Person> {
        with_tx!(self, |db_tx| {
            let model = find_person(&db_tx, id).await?;
            if patch.name.is_none() && patch.alias.is_none() {
                return Ok(model.into());
            }

            let mut active: persons::ActiveModel = model.into();
            let mut label = format!("person {id}");
            if let Some(name) = patch.name.as_deref() {
                let name = normalize_required_name(name, "person")?;
                label = format!("person '{name}'");
                active.person_name = ActiveValue::Set(name);
            }
            if let Some(alias) = patch.alias {
                active.alias = ActiveValue::Set(alias.trim().to_string());
            }
            let model = active
                .update(&db_tx)
                .await
                .map_err(|err| EngineError::from_constraint(err, &label))?;
            Ok(Person::from(model))
        })
    }

    /// Delete a person. Transactions pointing at it lose their counterparty.
    pub async fn delete_person(&self, id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = find_person(&db_tx, id).await?;
            persons::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            info!(person_id = id, "person deleted");
            Ok(())
        })
    }
}
