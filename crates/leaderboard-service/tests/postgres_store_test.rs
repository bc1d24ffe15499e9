//! PostgreSQL 存储集成测试
//!
//! 需要可用的数据库，默认忽略。运行方式：
//! `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`

use leaderboard_service::{MIGRATOR, RankingStore};
use leaderboard_shared::database::Database;
use leaderboard_shared::test_utils::{test_database_config, test_pr_id, test_username};

async fn setup() -> (RankingStore, String) {
    let db = Database::connect(&test_database_config())
        .await
        .expect("test database should be reachable");
    db.run_migrations(&MIGRATOR).await.unwrap();

    let store = RankingStore::postgres(db.pool().clone());
    let leaderboard = store
        .get_or_create_leaderboard("Integration Test Leaderboard")
        .await
        .unwrap();
    (store, leaderboard.id)
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_label_upsert_and_delete() {
    let (store, _) = setup().await;
    let pr_id = test_pr_id();

    store.save_label(pr_id, "Hackfest").await.unwrap();
    store.save_label(pr_id, "Hackfest").await.unwrap();
    assert_eq!(store.get_label(pr_id).await.unwrap().id, pr_id);

    store.delete_label(pr_id).await.unwrap();
    assert!(store.get_label(pr_id).await.unwrap_err().is_not_found());
    store.delete_label(pr_id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_leaderboard_get_or_create_is_stable() {
    let (store, leaderboard_id) = setup().await;

    let again = store
        .get_or_create_leaderboard("Integration Test Leaderboard")
        .await
        .unwrap();
    assert_eq!(again.id, leaderboard_id);
    assert_eq!(store.get_leaderboard(&leaderboard_id).await.unwrap(), again);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_concurrent_first_awards_use_unique_constraint() {
    let (store, leaderboard_id) = setup().await;
    let username = test_username();

    let (a, b) = tokio::join!(
        store.upsert_and_award(&leaderboard_id, &username),
        store.upsert_and_award(&leaderboard_id, &username),
    );
    let mut awarded = [a.unwrap(), b.unwrap()];
    awarded.sort();
    assert_eq!(awarded, [1, 2]);

    assert_eq!(store.get_entry(&username).await.unwrap().points, 2);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_rankings_are_sorted() {
    let (store, leaderboard_id) = setup().await;
    let top = test_username();
    let low = test_username();

    for _ in 0..3 {
        store.upsert_and_award(&leaderboard_id, &top).await.unwrap();
    }
    store.upsert_and_award(&leaderboard_id, &low).await.unwrap();

    let rankings = store.get_rankings(&leaderboard_id).await.unwrap();
    let top_pos = rankings.iter().position(|r| r.username == top).unwrap();
    let low_pos = rankings.iter().position(|r| r.username == low).unwrap();
    assert!(top_pos < low_pos);
    assert!(rankings.windows(2).all(|w| w[0].points >= w[1].points));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_ranking_ties_use_byte_order_like_memory_store() {
    let (store, _) = setup().await;
    let leaderboard = store
        .get_or_create_leaderboard(&format!("Collation {}", test_username()))
        .await
        .unwrap();
    let suffix = test_username();
    let upper = format!("Bob-{suffix}");
    let lower = format!("alice-{suffix}");

    store.upsert_and_award(&leaderboard.id, &lower).await.unwrap();
    store.upsert_and_award(&leaderboard.id, &upper).await.unwrap();

    let names: Vec<_> = store
        .get_rankings(&leaderboard.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.username)
        .collect();
    assert_eq!(names, [upper, lower]);
}
