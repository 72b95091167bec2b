//! Uniqueness rules the entities rely on.
//!
//! A person is identified by name. A wallet holds at most one global category
//! per name; global mirrors treat a violation of that index as "already
//! present". Local categories may repeat names.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Persons {
    Table,
    PersonName,
}

const GLOBAL_CATEGORY_INDEX: &str = "idx-categories-wallet_id-name-global-unique";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx-persons-person_name-unique")
                    .table(Persons::Table)
                    .col(Persons::PersonName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // sea-query has no portable partial index builder.
        manager
            .get_connection()
            .execute_unprepared(&format!(
                r#"CREATE UNIQUE INDEX IF NOT EXISTS "{GLOBAL_CATEGORY_INDEX}"
                   ON "categories" ("wallet_id", "name") WHERE "is_global" = 1"#
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!(r#"DROP INDEX IF EXISTS "{GLOBAL_CATEGORY_INDEX}""#))
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-persons-person_name-unique")
                    .table(Persons::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
