use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use engine::{
    AmountOp, AuxiliaryStep, Engine, EngineError, EXPENSE_ROOT_ID, INCOME_ROOT_ID, InitCmd, Money,
    NewCategoryCmd, NewTransactionCmd, NewWalletCmd, TransactionListFilter, TransactionPatch,
    WalletPatch,
};
use migration::MigratorTrait;

// Fresh store after first-run setup: admin user 1, wallet 1, Income 1 with
// Salary 3..Interest 6, Expense 2 with Groceries 7..Entertainment 12.
const SALARY: i64 = 3;
const GROCERIES: i64 = 7;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let outcome = engine.initialize(InitCmd::default()).await.unwrap();
    assert!(outcome.value.initialized);
    (engine, db)
}

async fn balance(engine: &Engine, wallet_id: i64) -> i64 {
    engine.wallet(wallet_id).await.unwrap().balance_minor
}

#[tokio::test]
async fn category_change_reverses_then_reapplies() {
    let (engine, _db) = engine_with_db().await;
    assert_eq!(balance(&engine, 1).await, 0);

    let created = engine
        .create_transaction(NewTransactionCmd::new(1, INCOME_ROOT_ID, 1, 50))
        .await
        .unwrap();
    assert!(created.is_clean());
    assert_eq!(balance(&engine, 1).await, 50);
    let id = created.value.transaction.id;

    let updated = engine
        .update_transaction(
            id,
            None,
            TransactionPatch::default().category_id(EXPENSE_ROOT_ID),
        )
        .await
        .unwrap();
    assert!(updated.is_clean());
    assert_eq!(balance(&engine, 1).await, -50);
    assert_eq!(
        updated.value.category.map(|c| c.id),
        Some(EXPENSE_ROOT_ID)
    );

    engine.delete_transaction(id, None).await.unwrap();
    assert_eq!(balance(&engine, 1).await, 0);
}

#[tokio::test]
async fn balance_matches_signed_sum_after_mixed_writes() {
    let (engine, _db) = engine_with_db().await;

    let mut ids = Vec::new();
    for (category, amount) in [
        (SALARY, 250_000),
        (GROCERIES, 8_450),
        (INCOME_ROOT_ID, 1_000),
        (EXPENSE_ROOT_ID, 12_000),
        (GROCERIES, 3_300),
    ] {
        let outcome = engine
            .create_transaction(NewTransactionCmd::new(1, category, 1, amount))
            .await
            .unwrap();
        ids.push(outcome.value.transaction.id);
    }

    engine
        .update_transaction(ids[1], None, TransactionPatch::default().amount_minor(9_000))
        .await
        .unwrap();
    engine
        .update_transaction(
            ids[2],
            None,
            TransactionPatch::default()
                .category_id(GROCERIES)
                .amount_minor(2_000),
        )
        .await
        .unwrap();
    engine.delete_transaction(ids[3], None).await.unwrap();

    let listed = engine
        .list_transactions(&TransactionListFilter::default())
        .await
        .unwrap();
    let expected: i64 = listed
        .iter()
        .map(|detail| {
            let category = detail.category.as_ref().unwrap();
            category.effect().delta(detail.transaction.amount_minor)
        })
        .sum();

    assert_eq!(expected, 250_000 - 9_000 - 2_000 - 3_300);
    assert_eq!(balance(&engine, 1).await, expected);
}

#[tokio::test]
async fn categories_outside_canonical_trees_leave_balance_alone() {
    let (engine, _db) = engine_with_db().await;
    let transfers = engine
        .create_category(NewCategoryCmd::new(1, "Transfers"))
        .await
        .unwrap()
        .value;
    assert_eq!(transfers.root_id, transfers.id);

    engine
        .create_transaction(NewTransactionCmd::new(1, transfers.id, 1, 7_500))
        .await
        .unwrap();
    assert_eq!(balance(&engine, 1).await, 0);
}

#[tokio::test]
async fn moving_to_another_wallet_moves_the_effect() {
    let (engine, _db) = engine_with_db().await;
    let savings = engine
        .create_wallet(NewWalletCmd::new("Savings").balance_minor(10_000))
        .await
        .unwrap();

    let created = engine
        .create_transaction(NewTransactionCmd::new(1, SALARY, 1, 4_000))
        .await
        .unwrap();
    engine
        .update_transaction(
            created.value.transaction.id,
            None,
            TransactionPatch::default().wallet_id(savings.id),
        )
        .await
        .unwrap();

    assert_eq!(balance(&engine, 1).await, 0);
    assert_eq!(balance(&engine, savings.id).await, 14_000);
}

#[tokio::test]
async fn same_person_name_resolves_to_one_person() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .create_transaction(NewTransactionCmd::new(1, GROCERIES, 1, 100).person_name("Alice"))
        .await
        .unwrap()
        .value;
    let second = engine
        .create_transaction(NewTransactionCmd::new(1, GROCERIES, 1, 200).person_name(" Alice "))
        .await
        .unwrap()
        .value;

    let persons = engine.list_persons().await.unwrap();
    assert_eq!(persons.len(), 1);
    assert_eq!(persons[0].name, "Alice");
    assert_eq!(first.transaction.person_id, Some(persons[0].id));
    assert_eq!(second.transaction.person_id, Some(persons[0].id));
    assert_eq!(second.person.map(|p| p.name), Some("Alice".to_string()));
}

#[tokio::test]
async fn explicit_person_id_wins_over_name() {
    let (engine, _db) = engine_with_db().await;
    let bob = engine.create_person("Bob", None).await.unwrap();

    let detail = engine
        .create_transaction(
            NewTransactionCmd::new(1, GROCERIES, 1, 100)
                .person_id(bob.id)
                .person_name("Carol"),
        )
        .await
        .unwrap()
        .value;

    assert_eq!(detail.transaction.person_id, Some(bob.id));
    assert!(engine.person_named("Carol").await.unwrap().is_none());
}

#[tokio::test]
async fn blank_person_name_means_no_person() {
    let (engine, _db) = engine_with_db().await;
    let detail = engine
        .create_transaction(NewTransactionCmd::new(1, GROCERIES, 1, 100).person_name("   "))
        .await
        .unwrap()
        .value;

    assert_eq!(detail.transaction.person_id, None);
    assert!(engine.list_persons().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_transaction(NewTransactionCmd::new(1, GROCERIES, 1, 0))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingField("amount".to_string()));

    let err = engine
        .create_transaction(NewTransactionCmd::new(0, GROCERIES, 1, 100))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingField("wallet_id".to_string()));

    let err = engine
        .create_transaction(NewTransactionCmd::new(1, GROCERIES, 1, -100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_transaction(NewTransactionCmd::new(1, 999, 1, 100))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("category 999".to_string()));

    let err = engine
        .create_transaction(NewTransactionCmd::new(1, GROCERIES, 1, 100).person_id(42))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("person 42".to_string()));

    assert_eq!(balance(&engine, 1).await, 0);
    assert!(
        engine
            .list_transactions(&TransactionListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn timestamps_follow_the_lifecycle() {
    let (engine, _db) = engine_with_db().await;
    let occurred = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();

    let created = engine
        .create_transaction(
            NewTransactionCmd::new(1, GROCERIES, 1, 100)
                .note("bread")
                .transaction_time(occurred),
        )
        .await
        .unwrap()
        .value
        .transaction;
    assert_eq!(created.transaction_time, occurred);
    assert_eq!(created.entry_time, created.last_modified_time);

    let untouched = engine
        .update_transaction(created.id, None, TransactionPatch::default())
        .await
        .unwrap()
        .value
        .transaction;
    assert_eq!(untouched, created);

    let updated = engine
        .update_transaction(created.id, None, TransactionPatch::default().note(""))
        .await
        .unwrap()
        .value
        .transaction;
    assert_eq!(updated.note, None);
    assert_eq!(updated.entry_time, created.entry_time);
    assert!(updated.last_modified_time >= created.last_modified_time);
    assert_eq!(updated.transaction_time, occurred);
}

#[tokio::test]
async fn wallet_scope_hides_foreign_transactions() {
    let (engine, _db) = engine_with_db().await;
    let other = engine
        .create_wallet(NewWalletCmd::new("Other"))
        .await
        .unwrap();
    let id = engine
        .create_transaction(NewTransactionCmd::new(1, GROCERIES, 1, 100))
        .await
        .unwrap()
        .value
        .transaction
        .id;

    assert!(engine.transaction(id, Some(1)).await.is_ok());

    let not_found = EngineError::KeyNotFound(format!("transaction {id}"));
    assert_eq!(
        engine.transaction(id, Some(other.id)).await.unwrap_err(),
        not_found
    );
    assert_eq!(
        engine
            .update_transaction(id, Some(other.id), TransactionPatch::default().amount_minor(5))
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(
        engine
            .delete_transaction(id, Some(other.id))
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(balance(&engine, 1).await, -100);
}

#[tokio::test]
async fn deleting_twice_fails_without_touching_balance() {
    let (engine, _db) = engine_with_db().await;
    let id = engine
        .create_transaction(NewTransactionCmd::new(1, SALARY, 1, 900))
        .await
        .unwrap()
        .value
        .transaction
        .id;

    engine.delete_transaction(id, None).await.unwrap();
    let err = engine.delete_transaction(id, None).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound(format!("transaction {id}")));
    assert_eq!(balance(&engine, 1).await, 0);
}

#[tokio::test]
async fn list_filters_combine() {
    let (engine, _db) = engine_with_db().await;
    let base = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();

    let bakery = NewTransactionCmd::new(1, GROCERIES, 1, 350)
        .note("Bakery on Main st")
        .person_name("Baker")
        .transaction_time(base);
    let salary = NewTransactionCmd::new(1, SALARY, 1, 300_000)
        .note("May salary")
        .transaction_time(base + Duration::days(1));
    let market = NewTransactionCmd::new(1, GROCERIES, 1, 4_200)
        .note("market")
        .transaction_time(base + Duration::days(2));
    for cmd in [bakery, salary, market] {
        engine.create_transaction(cmd).await.unwrap();
    }

    let all = engine
        .list_transactions(&TransactionListFilter::default())
        .await
        .unwrap();
    let notes: Vec<_> = all
        .iter()
        .map(|d| d.transaction.note.clone().unwrap())
        .collect();
    assert_eq!(notes, vec!["market", "May salary", "Bakery on Main st"]);

    let groceries = TransactionListFilter::default().category_ids([GROCERIES]);
    assert_eq!(engine.list_transactions(&groceries).await.unwrap().len(), 2);

    let big_groceries = groceries.clone().amount(AmountOp::Gt, 350);
    let found = engine.list_transactions(&big_groceries).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].transaction.amount_minor, 4_200);

    let at_least = groceries.amount(AmountOp::Ge, 350);
    assert_eq!(engine.list_transactions(&at_least).await.unwrap().len(), 2);

    let fuzzy = TransactionListFilter::default().fuzzy_note("main");
    let found = engine.list_transactions(&fuzzy).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].person.as_ref().map(|p| p.name.as_str()), Some("Baker"));

    let window = TransactionListFilter::default()
        .transaction_time(Some(base), Some(base + Duration::days(1)));
    assert_eq!(engine.list_transactions(&window).await.unwrap().len(), 2);

    let reversed = TransactionListFilter::default()
        .transaction_time(Some(base + Duration::days(1)), Some(base));
    assert!(matches!(
        engine.list_transactions(&reversed).await,
        Err(EngineError::InvalidFilter(_))
    ));
}

#[tokio::test]
async fn scoped_listings_require_existing_owner() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_transaction(NewTransactionCmd::new(1, GROCERIES, 1, 100))
        .await
        .unwrap();

    let filter = TransactionListFilter::default();
    assert_eq!(engine.wallet_transactions(1, &filter).await.unwrap().len(), 1);
    assert_eq!(engine.user_transactions(1, &filter).await.unwrap().len(), 1);
    assert_eq!(
        engine.wallet_transactions(77, &filter).await.unwrap_err(),
        EngineError::KeyNotFound("wallet 77".to_string())
    );
    assert_eq!(
        engine.user_transactions(77, &filter).await.unwrap_err(),
        EngineError::KeyNotFound("user 77".to_string())
    );
}

async fn freeze_balances(db: &DatabaseConnection) {
    db.execute_unprepared(
        "CREATE TRIGGER freeze_balance BEFORE UPDATE OF balance_minor ON wallets \
         BEGIN SELECT RAISE(ABORT, 'balance frozen'); END;",
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn amounts_above_the_cap_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    for amount in [i64::MAX, Money::MAX_AMOUNT.minor() + 1] {
        let err = engine
            .create_transaction(NewTransactionCmd::new(1, INCOME_ROOT_ID, 1, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    let created = engine
        .create_transaction(NewTransactionCmd::new(
            1,
            INCOME_ROOT_ID,
            1,
            Money::MAX_AMOUNT.minor(),
        ))
        .await
        .unwrap();
    let err = engine
        .update_transaction(
            created.value.transaction.id,
            None,
            TransactionPatch::default().amount_minor(i64::MAX),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert_eq!(balance(&engine, 1).await, Money::MAX_AMOUNT.minor());
}

#[tokio::test]
async fn balance_never_leaves_the_integer_range() {
    let (engine, _db) = engine_with_db().await;
    let near_max = i64::MAX - 5;
    engine
        .update_wallet(
            1,
            WalletPatch {
                balance_minor: Some(near_max),
                ..WalletPatch::default()
            },
        )
        .await
        .unwrap();

    let outcome = engine
        .create_transaction(NewTransactionCmd::new(1, SALARY, 1, 10))
        .await
        .unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].step, AuxiliaryStep::BalanceAdjustment);

    // The wallet stays readable and untouched, and so do its transactions.
    assert_eq!(balance(&engine, 1).await, near_max);
    let listed = engine
        .wallet_transactions(1, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    // Spending still works from there.
    let spent = engine
        .create_transaction(NewTransactionCmd::new(1, GROCERIES, 1, 10))
        .await
        .unwrap();
    assert!(spent.is_clean());
    assert_eq!(balance(&engine, 1).await, near_max - 10);
}

#[tokio::test]
async fn failed_balance_step_keeps_the_transaction() {
    let (engine, db) = engine_with_db().await;
    freeze_balances(&db).await;

    let outcome = engine
        .create_transaction(NewTransactionCmd::new(1, SALARY, 1, 50).note("paycheck"))
        .await
        .unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].step, AuxiliaryStep::BalanceAdjustment);
    assert!(outcome.warnings[0].message.contains("balance frozen"));

    let id = outcome.value.transaction.id;
    let stored = engine.transaction(id, None).await.unwrap();
    assert_eq!(stored.transaction.amount_minor, 50);
    assert_eq!(stored.transaction.note.as_deref(), Some("paycheck"));
    assert_eq!(stored.category.map(|c| c.id), Some(SALARY));
    assert_eq!(balance(&engine, 1).await, 0);
}

#[tokio::test]
async fn failed_update_rolls_back_reversal_and_reapply_together() {
    let (engine, db) = engine_with_db().await;
    let created = engine
        .create_transaction(NewTransactionCmd::new(1, SALARY, 1, 50))
        .await
        .unwrap();
    assert!(created.is_clean());
    assert_eq!(balance(&engine, 1).await, 50);

    freeze_balances(&db).await;
    let id = created.value.transaction.id;
    let updated = engine
        .update_transaction(
            id,
            None,
            TransactionPatch::default()
                .category_id(GROCERIES)
                .amount_minor(80),
        )
        .await
        .unwrap();
    assert_eq!(updated.warnings.len(), 1);
    assert_eq!(updated.warnings[0].step, AuxiliaryStep::BalanceAdjustment);

    // The row changed, the balance moved by neither half of the swing.
    let stored = engine.transaction(id, None).await.unwrap();
    assert_eq!(stored.transaction.category_id, GROCERIES);
    assert_eq!(stored.transaction.amount_minor, 80);
    assert_eq!(balance(&engine, 1).await, 50);

    let deleted = engine.delete_transaction(id, None).await.unwrap();
    assert_eq!(deleted.warnings[0].step, AuxiliaryStep::BalanceAdjustment);
    assert!(engine.transaction(id, None).await.is_err());
    assert_eq!(balance(&engine, 1).await, 50);
}
