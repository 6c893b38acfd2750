//! The API client against a mock backend: credential injection, 401
//! handling, error messages and listing tolerance.

use std::sync::Arc;

use healthportal_core::api::error::NETWORK_ERROR_MESSAGE;
use healthportal_core::api::DashboardStats;
use healthportal_core::auth::{LoginFlow, MemoryStorage, SessionStorage, Slot};
use healthportal_core::models::User;
use healthportal_core::{ApiClient, ApiError, SessionStore, StorageSignal};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store() -> (SessionStore, MemoryStorage) {
    let storage = MemoryStorage::new();
    let store = SessionStore::open(Arc::new(storage.clone()), StorageSignal::new());
    (store, storage)
}

fn signed_in(store: &SessionStore, token: &str) {
    store.set_identity(Some(User {
        id: "u1".to_string(),
        ..Default::default()
    }));
    store.set_credential(Some(token.to_string()));
}

async fn auth_headers(server: &MockServer) -> Vec<Option<String>> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .map(|v| v.to_str().unwrap().to_string())
        })
        .collect()
}

// ============================================================================
// Credential injection
// ============================================================================

#[tokio::test]
async fn test_bearer_header_follows_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (store, _) = store();
    let api = ApiClient::new(&server.uri(), store.clone()).unwrap();

    api.list_reviews().await.unwrap();
    signed_in(&store, "abc");
    api.list_reviews().await.unwrap();
    store.logout();
    api.list_reviews().await.unwrap();

    assert_eq!(
        auth_headers(&server).await,
        vec![None, Some("Bearer abc".to_string()), None]
    );
}

#[tokio::test]
async fn test_rejected_credential_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/support/my-tickets"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})))
        .mount(&server)
        .await;

    let (store, storage) = store();
    signed_in(&store, "stale");
    let api = ApiClient::new(&server.uri(), store.clone()).unwrap();

    let err = api.my_tickets().await.unwrap_err();
    assert_eq!(ApiError::describe(&err), "Token expired");
    assert!(!store.is_authenticated());
    assert_eq!(storage.get(Slot::Credential).unwrap(), None);
    assert_eq!(storage.get(Slot::Identity).unwrap(), None);
}

#[tokio::test]
async fn test_anonymous_401_leaves_session_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})))
        .mount(&server)
        .await;

    let (store, _) = store();
    let generation = store.generation();
    let api = ApiClient::new(&server.uri(), store.clone()).unwrap();

    let err = api.login("ada@example.com", "wrong", false).await.unwrap_err();
    assert_eq!(ApiError::describe(&err), "Invalid credentials");
    assert_eq!(store.generation(), generation);
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})))
        .mount(&server)
        .await;

    let (store, storage) = store();
    signed_in(&store, "good-token");
    let api = ApiClient::new(&server.uri(), store.clone()).unwrap();
    let mut flow = LoginFlow::new(api);

    let err = flow.login("other@example.com", "typo", false).await.unwrap_err();
    assert_eq!(ApiError::describe(&err), "Invalid credentials");
    assert!(store.is_authenticated());
    assert_eq!(storage.get(Slot::Credential).unwrap().as_deref(), Some("good-token"));
    // Sign-in endpoints never carry the session credential
    assert_eq!(auth_headers(&server).await, vec![None]);
}

// ============================================================================
// Error messages
// ============================================================================

#[tokio::test]
async fn test_backend_validation_message_is_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/signup"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Email already registered"})))
        .mount(&server)
        .await;

    let (store, _) = store();
    let api = ApiClient::new(&server.uri(), store).unwrap();
    let account = healthportal_core::models::NewAccount {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        password: "secret".to_string(),
        phone: "555".to_string(),
        gender: "female".to_string(),
    };

    let err = api.signup(&account).await.unwrap_err();
    assert_eq!(ApiError::describe(&err), "Email already registered");
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let (store, _) = store();
    // Nothing listens on port 1
    let api = ApiClient::new("http://127.0.0.1:1", store).unwrap();

    let err = api.list_medicines().await.unwrap_err();
    assert_eq!(ApiError::describe(&err), NETWORK_ERROR_MESSAGE);
}

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn test_non_array_listing_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/medicine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "No medicines"})))
        .mount(&server)
        .await;

    let (store, _) = store();
    let api = ApiClient::new(&server.uri(), store).unwrap();
    assert!(api.list_medicines().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_articles_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("category", "Clinical Trials"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "a1", "Title": "Phase III results", "Category": "Clinical Trials"}
        ])))
        .mount(&server)
        .await;

    let (store, _) = store();
    let api = ApiClient::new(&server.uri(), store).unwrap();
    let articles = api.list_articles(Some("Clinical Trials"), Some(3)).await.unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Phase III results");
}

#[tokio::test]
async fn test_articles_without_filters_send_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (store, _) = store();
    let api = ApiClient::new(&server.uri(), store).unwrap();
    api.list_articles(None, None).await.unwrap();
    api.list_articles(Some("a&b=c"), None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
    let pairs: Vec<_> = requests[1].url.query_pairs().into_owned().collect();
    assert_eq!(pairs, vec![("category".to_string(), "a&b=c".to_string())]);
}

#[tokio::test]
async fn test_dashboard_stats_counts_open_tickets() {
    let server = MockServer::start().await;
    let list = |p: &'static str, body: serde_json::Value| {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
    };
    list("/api/admin/users", json!([{"_id": "u1"}, {"_id": "u2"}]))
        .mount(&server)
        .await;
    list(
        "/api/support",
        json!([
            {"_id": "t1", "status": "open"},
            {"_id": "t2", "status": "resolved"},
            {"_id": "t3"}
        ]),
    )
    .mount(&server)
    .await;
    list("/api/reviews", json!([{"_id": "r1", "rating": 4}]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
        .mount(&server)
        .await;

    let (store, _) = store();
    signed_in(&store, "admin-token");
    let api = ApiClient::new(&server.uri(), store).unwrap();

    assert_eq!(
        api.dashboard_stats().await,
        DashboardStats {
            users: 2,
            articles: 0,
            reviews: 1,
            open_tickets: 2,
        }
    );
}
