use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bioscan_core::{CategoryIndex, EnrichmentSuggestion, ProfileSummary};
use bioscan_server::{router, AppState, ProfileService, MAX_BATCH_USERNAMES};
use bioscan_store::ListStore;
use bioscan_upstream::{
    Credentials, Enricher, FollowerEntry, RawProfile, Result, SessionManager, SessionState,
    SocialClient, UpstreamError,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

#[derive(Default)]
struct FakeClient {
    profiles: HashMap<String, Value>,
    followers: Vec<FollowerEntry>,
    private: Vec<String>,
    rate_limited: bool,
    logins: AtomicUsize,
}

impl FakeClient {
    fn with_profile(mut self, profile: Value) -> Self {
        let id = profile["pk"].as_str().expect("pk").to_string();
        self.profiles.insert(id, profile);
        self
    }

    fn with_follower(mut self, user_id: &str, username: &str) -> Self {
        self.followers.push(FollowerEntry {
            user_id: user_id.to_string(),
            username: username.to_string(),
            full_name: format!("{username} full"),
        });
        self
    }
}

#[async_trait]
impl SocialClient for FakeClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionState> {
        if credentials.password != "secret" {
            return Err(UpstreamError::BadCredentials);
        }
        self.logins.fetch_add(1, Ordering::SeqCst);
        Ok(SessionState {
            username: credentials.username.clone(),
            session_id: "session".to_string(),
        })
    }

    async fn validate(&self, _session: &SessionState) -> Result<bool> {
        Ok(true)
    }

    async fn user_id_from_username(
        &self,
        _session: &SessionState,
        username: &str,
    ) -> Result<String> {
        self.profiles
            .values()
            .find(|profile| profile["username"] == username)
            .and_then(|profile| profile["pk"].as_str())
            .map(str::to_string)
            .ok_or_else(|| UpstreamError::UserNotFound(username.to_string()))
    }

    async fn user_info(&self, _session: &SessionState, user_id: &str) -> Result<RawProfile> {
        if self.private.iter().any(|id| id == user_id) {
            return Err(UpstreamError::PrivateAccount(user_id.to_string()));
        }
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| UpstreamError::UserNotFound(user_id.to_string()))
    }

    async fn user_followers(
        &self,
        _session: &SessionState,
        _user_id: &str,
        limit: usize,
    ) -> Result<Vec<FollowerEntry>> {
        if self.rate_limited {
            return Err(UpstreamError::RateLimited("Please wait a few minutes".into()));
        }
        Ok(self.followers.iter().take(limit).cloned().collect())
    }
}

struct FixedEnricher;

#[async_trait]
impl Enricher for FixedEnricher {
    async fn suggest(&self, _profile: &ProfileSummary) -> Result<EnrichmentSuggestion> {
        Ok(EnrichmentSuggestion {
            description: Some("Neighborhood bakery".to_string()),
            location: Some("Austin".to_string()),
            category: Some("bakery".to_string()),
        })
    }
}

fn bakery() -> Value {
    json!({
        "pk": "100",
        "username": "bakery",
        "full_name": "The Bakery",
        "biography": "Fresh bread daily. Orders: orders@bakery.example",
        "external_url": "https://bakery.example",
        "is_business": true,
        "business_contact_method": {"email": "biz@bakery.example", "phone_number": "5551234567"},
        "follower_count": 1200,
        "media_count": 88
    })
}

fn target() -> Value {
    json!({
        "pk": "1",
        "username": "target",
        "biography": "",
    })
}

struct Harness {
    app: Router,
    lists: ListStore,
    client: Arc<FakeClient>,
    _temp: TempDir,
}

fn harness(client: FakeClient, credentials: Option<Credentials>) -> Harness {
    harness_with(client, credentials, None)
}

fn harness_with(
    client: FakeClient,
    credentials: Option<Credentials>,
    enricher: Option<Arc<dyn Enricher>>,
) -> Harness {
    let temp = TempDir::new().expect("temp dir");
    let client = Arc::new(client);
    let sessions = Arc::new(SessionManager::new(client.clone(), credentials.clone(), None));
    let mut service = ProfileService::new(sessions, Duration::ZERO);
    if let Some(enricher) = enricher {
        service = service.with_enricher(enricher, CategoryIndex::parse("Bakery\nRestaurant\n"));
    }
    let lists = ListStore::new(temp.path());
    let state = Arc::new(AppState {
        service,
        lists: lists.clone(),
        default_credentials: credentials,
    });
    Harness {
        app: router(state),
        lists,
        client,
        _temp: temp,
    }
}

fn creds() -> Option<Credentials> {
    Some(Credentials::new("scout", "secret"))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let h = harness(FakeClient::default(), None);
    let (status, body) = send(&h.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn user_info_returns_extracted_contacts() {
    let h = harness(FakeClient::default().with_profile(bakery()), creds());
    let (status, body) = send(
        &h.app,
        "POST",
        "/user-info",
        Some(json!({"username": "@Bakery"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user = &body["user"];
    assert_eq!(body["status"], "success");
    assert_eq!(user["username"], "bakery");
    assert_eq!(user["email"], "orders@bakery.example");
    assert_eq!(user["business_email"], "biz@bakery.example");
    assert_eq!(user["business_phone"], "+15551234567");
    assert_eq!(user["website"], "https://bakery.example");
    assert_eq!(user["account_type"], "business");
    assert_eq!(user["post_count"], 88);
    assert!(user.get("error").is_none());
}

#[tokio::test]
async fn user_info_requires_a_target() {
    let h = harness(FakeClient::default(), creds());
    let (status, body) = send(&h.app, "POST", "/user-info", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("username or user_id"));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let h = harness(FakeClient::default(), creds());
    let (status, _) = send(
        &h.app,
        "POST",
        "/user-info",
        Some(json!({"username": "ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn private_account_is_forbidden() {
    let mut client = FakeClient::default().with_profile(bakery());
    client.private.push("100".to_string());
    let h = harness(client, creds());
    let (status, _) = send(&h.app, "POST", "/user-info", Some(json!({"user_id": 100}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_credentials_is_unauthorized() {
    let h = harness(FakeClient::default().with_profile(bakery()), None);
    let (status, _) = send(&h.app, "POST", "/user-info", Some(json!({"user_id": "100"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn followers_degrade_failed_entries_and_save() {
    let client = FakeClient::default()
        .with_profile(target())
        .with_profile(bakery())
        .with_follower("100", "bakery")
        .with_follower("404", "vanished");
    let h = harness(client, creds());

    let (status, body) = send(
        &h.app,
        "POST",
        "/followers",
        Some(json!({"username": "target", "limit": 5, "save": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target_user_id"], "1");
    assert_eq!(body["target_username"], "target");
    assert_eq!(body["count"], 2);

    let followers = body["followers"].as_array().expect("followers");
    assert_eq!(followers[0]["business_email"], "biz@bakery.example");
    assert_eq!(followers[1]["username"], "vanished");
    assert_eq!(followers[1]["full_name"], "vanished full");
    assert_eq!(followers[1]["follower_count"], 0);
    assert!(followers[1]["email"].is_null());
    assert!(followers[1]["error"]
        .as_str()
        .expect("error")
        .starts_with("Could not fetch detailed info"));

    let saved = h.lists.load("followers_target").expect("saved list");
    assert_eq!(saved.profiles.len(), 2);

    let (status, body) = send(&h.app, "GET", "/lists", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lists"], json!(["followers_target"]));

    let (status, body) = send(&h.app, "GET", "/lists/followers_target", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target_username"], "target");
}

#[tokio::test]
async fn followers_respect_limit() {
    let client = FakeClient::default()
        .with_profile(target())
        .with_profile(bakery())
        .with_follower("100", "bakery")
        .with_follower("100", "bakery");
    let h = harness(client, creds());
    let (status, body) = send(
        &h.app,
        "POST",
        "/followers",
        Some(json!({"user_id": "1", "limit": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert!(body["target_username"].is_null());
}

#[tokio::test]
async fn followers_limit_is_validated() {
    let h = harness(FakeClient::default(), creds());
    for limit in [0, 201] {
        let (status, _) = send(
            &h.app,
            "POST",
            "/followers",
            Some(json!({"user_id": "1", "limit": limit})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn followers_rate_limit_maps_to_429() {
    let mut client = FakeClient::default().with_profile(target());
    client.rate_limited = true;
    let h = harness(client, creds());
    let (status, body) = send(
        &h.app,
        "POST",
        "/followers",
        Some(json!({"username": "target"})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().expect("error").contains("rate limited"));
}

#[tokio::test]
async fn login_uses_request_then_configured_credentials() {
    let h = harness(FakeClient::default(), None);
    let (status, _) = send(&h.app, "POST", "/login", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &h.app,
        "POST",
        "/login",
        Some(json!({"username": "scout", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &h.app,
        "POST",
        "/login",
        Some(json!({"username": "scout", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(h.client.logins.load(Ordering::SeqCst), 1);

    let configured = harness(FakeClient::default(), creds());
    let (status, _) = send(&configured.app, "POST", "/login", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn batch_keeps_order_and_reports_failures() {
    let h = harness(FakeClient::default().with_profile(bakery()), creds());
    let (status, body) = send(
        &h.app,
        "POST",
        "/batch",
        Some(json!({"usernames": ["bakery", "ghost", "bad name!"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    let profiles = body["profiles"].as_array().expect("profiles");
    assert_eq!(profiles[0]["username"], "bakery");
    assert!(profiles[0].get("error").is_none());
    assert_eq!(profiles[1]["username"], "ghost");
    assert!(profiles[1]["error"].is_string());
    assert!(profiles[2]["error"].is_string());

    let (status, _) = send(&h.app, "POST", "/batch", Some(json!({"usernames": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_rejects_more_usernames_than_the_cap() {
    let h = harness(FakeClient::default().with_profile(bakery()), creds());
    let usernames: Vec<String> = (0..=MAX_BATCH_USERNAMES)
        .map(|idx| format!("user{idx}"))
        .collect();
    let (status, body) = send(
        &h.app,
        "POST",
        "/batch",
        Some(json!({ "usernames": usernames })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("at most"));
    assert_eq!(h.client.logins.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn logout_drops_session_and_next_call_logs_in_again() {
    let h = harness(FakeClient::default().with_profile(bakery()), creds());
    let (status, _) = send(&h.app, "POST", "/user-info", Some(json!({"user_id": "100"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.client.logins.load(Ordering::SeqCst), 1);

    let (status, body) = send(&h.app, "POST", "/logout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, _) = send(&h.app, "POST", "/user-info", Some(json!({"user_id": "100"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.client.logins.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn enrichment_fills_missing_fields() {
    let h = harness_with(
        FakeClient::default().with_profile(bakery()),
        creds(),
        Some(Arc::new(FixedEnricher)),
    );
    let (status, body) = send(&h.app, "POST", "/user-info", Some(json!({"user_id": "100"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["description"], "Neighborhood bakery");
    assert_eq!(body["user"]["location"], "Austin");
    assert_eq!(body["user"]["category"], "Bakery");
}

#[tokio::test]
async fn saved_list_lookup_errors() {
    let h = harness(FakeClient::default(), creds());
    let (status, _) = send(&h.app, "GET", "/lists/absent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&h.app, "GET", "/lists/.hidden", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
