//! HTTP 层集成测试
//!
//! 通过 `tower::ServiceExt::oneshot` 直接驱动路由，使用内存存储

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use async_trait::async_trait;
use leaderboard_service::models::LeaderboardEntry;
use leaderboard_service::repository::{EntryRepositoryTrait, MemoryRankingRepository};
use leaderboard_service::webhook::{SIGNATURE_HEADER, sign_payload};
use leaderboard_service::{AppState, EventClassifier, RankingStore, ScoringPolicy, routes};
use leaderboard_shared::retry::RetryPolicy;
use leaderboard_shared::test_utils::TestEvents;
use tower::ServiceExt;

const SECRET: &str = "test-webhook-secret";

struct TestApp {
    router: Router,
    store: RankingStore,
    repo: MemoryRankingRepository,
}

impl TestApp {
    async fn new() -> Self {
        let repo = MemoryRankingRepository::new();
        Self::build(repo.clone(), Arc::new(repo), Duration::from_secs(20)).await
    }

    /// 积分条目走 `entries`，标签和排行榜走内存仓储
    async fn build(
        repo: MemoryRankingRepository,
        entries: Arc<dyn EntryRepositoryTrait>,
        request_timeout: Duration,
    ) -> Self {
        let shared = Arc::new(repo.clone());
        let store = RankingStore::new(shared.clone(), entries, shared);
        let leaderboard = store
            .get_or_create_leaderboard("Holiday Hackfest Leaderboard")
            .await
            .unwrap();
        let policy = Arc::new(ScoringPolicy::new("Hackfest", ["maintainer"]));
        let classifier = EventClassifier::new(store.clone(), policy, leaderboard.id.clone())
            .with_cleanup_policy(RetryPolicy::immediate(1));
        let state = AppState::new(store.clone(), classifier, leaderboard, SECRET);

        Self {
            router: routes::app(state, request_timeout),
            store,
            repo,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// 发送正确签名的事件，返回响应体
    async fn deliver(&self, payload: serde_json::Value) -> String {
        let body = payload.to_string();
        let signature = sign_payload(body.as_bytes(), SECRET.as_bytes());
        let (status, content_type, text) = self
            .send(event_request(body, Some(&signature)))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/plain"));
        text
    }

    async fn points(&self, username: &str) -> Option<i64> {
        self.store.get_entry(username).await.ok().map(|e| e.points)
    }

    /// 等待后台标签清理完成
    async fn wait_for_label_count(&self, expected: usize) {
        for _ in 0..100 {
            if self.repo.label_count() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "label count stayed at {}, expected {expected}",
            self.repo.label_count()
        );
    }
}

/// 创建条目和查询排名前先等待 `delay`
struct SlowEntries {
    inner: MemoryRankingRepository,
    delay: Duration,
}

#[async_trait]
impl EntryRepositoryTrait for SlowEntries {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> leaderboard_service::Result<Option<LeaderboardEntry>> {
        self.inner.find_by_username(username).await
    }

    async fn create(&self, entry: &LeaderboardEntry) -> leaderboard_service::Result<()> {
        tokio::time::sleep(self.delay).await;
        EntryRepositoryTrait::create(&self.inner, entry).await
    }

    async fn increment_points(
        &self,
        leaderboard_id: &str,
        username: &str,
    ) -> leaderboard_service::Result<Option<i64>> {
        self.inner.increment_points(leaderboard_id, username).await
    }

    async fn get_rankings(
        &self,
        leaderboard_id: &str,
    ) -> leaderboard_service::Result<Vec<LeaderboardEntry>> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_rankings(leaderboard_id).await
    }
}

async fn slow_app() -> TestApp {
    let repo = MemoryRankingRepository::new();
    let slow = SlowEntries {
        inner: repo.clone(),
        delay: Duration::from_millis(150),
    };
    TestApp::build(repo, Arc::new(slow), Duration::from_millis(50)).await
}

fn event_request(body: String, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/event")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body)).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ==================== 签名校验 ====================

#[tokio::test]
async fn test_missing_signature_fails_without_touching_store() {
    let app = TestApp::new().await;
    let body = TestEvents::labeled(1, "alice", "Hackfest").to_string();

    let (status, _, text) = app.send(event_request(body, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "fail");
    assert_eq!(app.repo.label_count(), 0);
}

#[tokio::test]
async fn test_wrong_secret_fails() {
    let app = TestApp::new().await;
    let body = TestEvents::labeled(1, "alice", "Hackfest").to_string();
    let signature = sign_payload(body.as_bytes(), b"some-other-secret");

    let (_, _, text) = app.send(event_request(body, Some(&signature))).await;

    assert_eq!(text, "fail");
    assert_eq!(app.repo.label_count(), 0);
}

#[tokio::test]
async fn test_signature_over_different_body_fails() {
    let app = TestApp::new().await;
    let signed = TestEvents::labeled(1, "alice", "Hackfest").to_string();
    let sent = TestEvents::labeled(2, "alice", "Hackfest").to_string();
    let signature = sign_payload(signed.as_bytes(), SECRET.as_bytes());

    let (_, _, text) = app.send(event_request(sent, Some(&signature))).await;

    assert_eq!(text, "fail");
    assert_eq!(app.repo.label_count(), 0);
}

#[tokio::test]
async fn test_malformed_payload_with_valid_signature_fails() {
    let app = TestApp::new().await;
    let body = r#"{"action":"closed","pull_request":"#.to_string();
    let signature = sign_payload(body.as_bytes(), SECRET.as_bytes());

    let (status, _, text) = app.send(event_request(body, Some(&signature))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "fail");
}

// ==================== 计分流程 ====================

#[tokio::test]
async fn test_label_and_merge_awards_point() {
    let app = TestApp::new().await;

    assert_eq!(app.deliver(TestEvents::labeled(7, "alice", "Hackfest")).await, "ok");
    assert_eq!(app.repo.label_count(), 1);

    assert_eq!(app.deliver(TestEvents::merged(7, "alice")).await, "ok");
    assert_eq!(app.points("alice").await, Some(1));
    app.wait_for_label_count(0).await;

    // 重复投递合并事件不会再次加分
    assert_eq!(app.deliver(TestEvents::merged(7, "alice")).await, "ok");
    assert_eq!(app.points("alice").await, Some(1));
}

#[tokio::test]
async fn test_slow_award_outlives_request_timeout() {
    let app = slow_app().await;

    assert_eq!(app.deliver(TestEvents::labeled(7, "alice", "Hackfest")).await, "ok");

    for _ in 0..2 {
        assert_eq!(app.deliver(TestEvents::merged(7, "alice")).await, "ok");
        app.wait_for_label_count(0).await;
    }
    assert_eq!(app.points("alice").await, Some(1));
}

#[tokio::test]
async fn test_slow_read_route_times_out() {
    let app = slow_app().await;

    let (status, _, _) = app.send(get("/api/rankings")).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_unlabeled_before_merge_awards_nothing() {
    let app = TestApp::new().await;

    assert_eq!(app.deliver(TestEvents::labeled(42, "bob", "Hackfest")).await, "ok");
    assert_eq!(app.deliver(TestEvents::unlabeled(42, "bob", "Hackfest")).await, "ok");
    assert_eq!(app.repo.label_count(), 0);

    assert_eq!(app.deliver(TestEvents::merged(42, "bob")).await, "ok");
    assert_eq!(app.points("bob").await, None);
}

#[tokio::test]
async fn test_merge_without_label_returns_ok() {
    let app = TestApp::new().await;

    assert_eq!(app.deliver(TestEvents::merged(99, "carol")).await, "ok");
    assert_eq!(app.points("carol").await, None);
}

#[tokio::test]
async fn test_exempt_author_returns_ok_without_points() {
    let app = TestApp::new().await;

    assert_eq!(
        app.deliver(TestEvents::labeled(5, "maintainer", "Hackfest")).await,
        "ok"
    );
    assert_eq!(app.deliver(TestEvents::merged(5, "maintainer")).await, "ok");

    assert_eq!(app.repo.label_count(), 0);
    assert_eq!(app.points("maintainer").await, None);
}

// ==================== 读取接口 ====================

#[tokio::test]
async fn test_rankings_api_and_page() {
    let app = TestApp::new().await;

    let mut pr_id = 0;
    for (username, merges) in [("alice", 1), ("bob", 2)] {
        for _ in 0..merges {
            pr_id += 1;
            app.deliver(TestEvents::labeled(pr_id, username, "Hackfest")).await;
            app.deliver(TestEvents::merged(pr_id, username)).await;
        }
    }

    let (status, _, text) = app.send(get("/api/rankings")).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"][0]["username"], "bob");
    assert_eq!(json["data"][0]["points"], 2);
    assert_eq!(json["data"][1]["username"], "alice");

    let response = app.router.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );
    let html = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(html.to_vec()).unwrap();
    assert!(html.contains("Holiday Hackfest Leaderboard"));
    assert!(html.find("bob").unwrap() < html.find("alice").unwrap());
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = TestApp::new().await;

    let (status, _, text) = app.send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("\"ok\""));

    let (status, _, _) = app.send(get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-github-delivery", "delivery-123")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "delivery-123");
}
