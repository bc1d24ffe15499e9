//! test_utils 集成测试

use leaderboard_shared::test_utils::*;

#[test]
fn test_pr_ids_are_positive_and_unique() {
    let ids: Vec<i64> = (0..100).map(|_| test_pr_id()).collect();
    assert!(ids.iter().all(|id| *id > 0));

    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len());
}

#[test]
fn test_username_prefix() {
    assert!(test_username().starts_with("test-user-"));
}

#[test]
fn test_unlabeled_payload() {
    let payload = TestEvents::unlabeled(42, "alice", "Hackfest");
    assert_eq!(payload["action"], "unlabeled");
    assert_eq!(payload["pull_request"]["state"], "open");
    assert_eq!(payload["label"]["name"], "Hackfest");
}

#[test]
fn test_closed_unmerged_payload() {
    let payload = TestEvents::closed_unmerged(7, "bob");
    assert_eq!(payload["action"], "closed");
    assert_eq!(payload["pull_request"]["state"], "closed");
    assert_eq!(payload["pull_request"]["merged"], false);
    assert_eq!(payload["pull_request"]["user"]["login"], "bob");
}

#[test]
fn test_database_config_does_not_retry() {
    let config = test_database_config();
    assert_eq!(config.connect_retries, 0);
    assert!(config.url.starts_with("postgres://"));
}
