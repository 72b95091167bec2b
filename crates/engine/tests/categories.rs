use sea_orm::{Database, DatabaseConnection};

use engine::{
    CategoryPatch, EXPENSE_ROOT_ID, Engine, EngineError, INCOME_ROOT_ID, InitCmd, NewCategoryCmd,
    NewTransactionCmd, NewWalletCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    engine.initialize(InitCmd::default()).await.unwrap();
    (engine, db)
}

async fn add(engine: &Engine, wallet_id: i64, name: &str, parent: Option<i64>) -> engine::Category {
    let mut cmd = NewCategoryCmd::new(wallet_id, name);
    if let Some(parent_id) = parent {
        cmd = cmd.parent_id(parent_id);
    }
    engine.create_category(cmd).await.unwrap().value
}

#[tokio::test]
async fn initialize_gives_canonical_roots() {
    let (engine, _db) = engine_with_db().await;
    assert!(engine.init_status().await.unwrap());

    let income = engine.category(INCOME_ROOT_ID, Some(1)).await.unwrap();
    let expense = engine.category(EXPENSE_ROOT_ID, Some(1)).await.unwrap();
    assert_eq!(income.name, "Income");
    assert_eq!(expense.name, "Expense");
    assert!(income.is_root() && income.is_global);
    assert!(expense.is_root() && expense.is_global);

    let all = engine.list_categories(1).await.unwrap();
    assert_eq!(all.len(), 12);
    let groceries = all.iter().find(|c| c.name == "Groceries").unwrap();
    assert_eq!(groceries.parent_id, Some(EXPENSE_ROOT_ID));
    assert_eq!(groceries.root_id, EXPENSE_ROOT_ID);

    let again = engine.initialize(InitCmd::default()).await.unwrap();
    assert!(!again.value.initialized);
    assert_eq!(engine.list_categories(1).await.unwrap().len(), 12);
}

#[tokio::test]
async fn children_inherit_root_and_reparenting_cascades() {
    let (engine, _db) = engine_with_db().await;

    let food = add(&engine, 1, "Food", Some(EXPENSE_ROOT_ID)).await;
    let snacks = add(&engine, 1, "Snacks", Some(food.id)).await;
    assert_eq!(food.root_id, EXPENSE_ROOT_ID);
    assert_eq!(snacks.root_id, EXPENSE_ROOT_ID);

    let moved = engine
        .update_category(
            food.id,
            None,
            CategoryPatch::default().parent_id(Some(INCOME_ROOT_ID)),
        )
        .await
        .unwrap()
        .value;
    assert_eq!(moved.root_id, INCOME_ROOT_ID);
    let snacks_now = engine.category(snacks.id, None).await.unwrap();
    assert_eq!(snacks_now.root_id, INCOME_ROOT_ID);

    let detached = engine
        .update_category(food.id, None, CategoryPatch::default().parent_id(None))
        .await
        .unwrap()
        .value;
    assert!(detached.is_root());
    assert_eq!(detached.root_id, food.id);
    let snacks_now = engine.category(snacks.id, None).await.unwrap();
    assert_eq!(snacks_now.root_id, food.id);
}

#[tokio::test]
async fn parent_cycles_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let a = add(&engine, 1, "A", None).await;
    let b = add(&engine, 1, "B", Some(a.id)).await;
    let c = add(&engine, 1, "C", Some(b.id)).await;

    let err = engine
        .update_category(a.id, None, CategoryPatch::default().parent_id(Some(c.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidParent(_)));

    let err = engine
        .update_category(a.id, None, CategoryPatch::default().parent_id(Some(a.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidParent(_)));

    assert_eq!(engine.category(a.id, None).await.unwrap(), a);
}

#[tokio::test]
async fn parent_must_live_in_the_same_wallet() {
    let (engine, _db) = engine_with_db().await;
    let other = engine
        .create_wallet(NewWalletCmd::new("Other"))
        .await
        .unwrap();

    let err = engine
        .create_category(NewCategoryCmd::new(other.id, "Rent").parent_id(EXPENSE_ROOT_ID))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidParent(_)));
    assert!(engine.list_categories(other.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_refuses_parents_and_used_categories() {
    let (engine, _db) = engine_with_db().await;
    let before = engine.list_categories(1).await.unwrap();

    let err = engine
        .delete_category(EXPENSE_ROOT_ID, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::HasChildren("Expense".to_string()));
    assert_eq!(engine.list_categories(1).await.unwrap(), before);

    let gifts = add(&engine, 1, "Gifts", Some(EXPENSE_ROOT_ID)).await;
    engine
        .create_transaction(NewTransactionCmd::new(1, gifts.id, 1, 2_500))
        .await
        .unwrap();
    let err = engine.delete_category(gifts.id, None).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    let spare = add(&engine, 1, "Spare", Some(EXPENSE_ROOT_ID)).await;
    engine.delete_category(spare.id, Some(1)).await.unwrap();
    assert!(matches!(
        engine.category(spare.id, None).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn global_sync_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let travel_wallet = engine
        .create_wallet(NewWalletCmd::new("Travel"))
        .await
        .unwrap();

    // The default roots were global before the wallet existed.
    let first = engine
        .sync_global_category(INCOME_ROOT_ID, Some(1))
        .await
        .unwrap();
    assert_eq!(first.created.len(), 1);
    assert_eq!(first.created[0].wallet_id, travel_wallet.id);
    assert!(first.created[0].is_root() && first.created[0].is_global);

    let second = engine
        .sync_global_category(INCOME_ROOT_ID, Some(1))
        .await
        .unwrap();
    assert!(second.created.is_empty());
    assert_eq!(second.skipped_wallets, vec![travel_wallet.id]);
    assert!(second.failed.is_empty());

    let names: Vec<_> = engine
        .list_categories(travel_wallet.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Income"]);
}

#[tokio::test]
async fn new_global_category_is_mirrored_on_create() {
    let (engine, _db) = engine_with_db().await;
    let second = engine
        .create_wallet(NewWalletCmd::new("Second"))
        .await
        .unwrap();

    let outcome = engine
        .create_category(NewCategoryCmd::new(1, "Savings").global(true))
        .await
        .unwrap();
    assert!(outcome.is_clean());

    let mirrored = engine.list_categories(second.id).await.unwrap();
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].name, "Savings");
    assert!(mirrored[0].is_global);
    assert_eq!(mirrored[0].root_id, mirrored[0].id);
}

#[tokio::test]
async fn sync_of_local_category_fails() {
    let (engine, _db) = engine_with_db().await;
    let local = add(&engine, 1, "Local", None).await;

    let err = engine
        .sync_global_category(local.id, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotGlobal(local.id));
}

#[tokio::test]
async fn empty_update_returns_category_unchanged() {
    let (engine, _db) = engine_with_db().await;
    let before = engine.category(EXPENSE_ROOT_ID, None).await.unwrap();

    let outcome = engine
        .update_category(EXPENSE_ROOT_ID, Some(1), CategoryPatch::default())
        .await
        .unwrap();
    assert!(outcome.is_clean());
    assert_eq!(outcome.value, before);
}

#[tokio::test]
async fn wallet_scope_hides_foreign_categories() {
    let (engine, _db) = engine_with_db().await;
    let other = engine
        .create_wallet(NewWalletCmd::new("Other"))
        .await
        .unwrap();

    let err = engine
        .category(EXPENSE_ROOT_ID, Some(other.id))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound(format!("category {EXPENSE_ROOT_ID}")));

    let err = engine
        .delete_category(EXPENSE_ROOT_ID, Some(other.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn tree_holds_every_category_once() {
    let (engine, _db) = engine_with_db().await;
    let wallet = engine
        .create_wallet(NewWalletCmd::new("Tree"))
        .await
        .unwrap();

    let r = add(&engine, wallet.id, "R", None).await;
    let c1 = add(&engine, wallet.id, "C1", Some(r.id)).await;
    let c2 = add(&engine, wallet.id, "C2", Some(r.id)).await;
    let g = add(&engine, wallet.id, "G", Some(c1.id)).await;

    let tree = engine.category_tree(wallet.id).await.unwrap();
    assert_eq!(tree.wallet.id, wallet.id);
    assert_eq!(tree.roots.len(), 1);

    let root = &tree.roots[0];
    assert_eq!(root.category.id, r.id);
    assert_eq!(root.count(), 4);
    let child_ids: Vec<_> = root.children.iter().map(|n| n.category.id).collect();
    assert_eq!(child_ids, vec![c1.id, c2.id]);
    assert_eq!(root.children[0].children[0].category.id, g.id);
    assert!(root.children[1].children.is_empty());

    let missing = engine.category_tree(999).await.unwrap_err();
    assert_eq!(missing, EngineError::KeyNotFound("wallet 999".to_string()));
}

#[tokio::test]
async fn default_tree_has_two_roots() {
    let (engine, _db) = engine_with_db().await;
    let tree = engine.category_tree(1).await.unwrap();

    let roots: Vec<_> = tree
        .roots
        .iter()
        .map(|node| (node.category.name.as_str(), node.children.len()))
        .collect();
    assert_eq!(roots, vec![("Income", 4), ("Expense", 6)]);
}
