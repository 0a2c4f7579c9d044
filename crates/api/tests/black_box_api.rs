use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use farmstand_auth::{Hs256TokenCodec, LoginCode, TokenCodec, User};
use farmstand_core::UserId;
use farmstand_infra::{
    InMemoryLedgerStore, InMemoryMessageStore, InMemoryPostStore, InMemoryUserStore, LogMailer,
};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    users: Arc<InMemoryUserStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port, over in-memory
        // stores we keep a handle to for seeding.
        let users = Arc::new(InMemoryUserStore::new());
        let services = Arc::new(farmstand_api::app::services::AppServices {
            ledger: Arc::new(InMemoryLedgerStore::new()),
            users: users.clone(),
            posts: Arc::new(InMemoryPostStore::new()),
            messages: Arc::new(InMemoryMessageStore::new()),
            mailer: Arc::new(LogMailer::new()),
        });

        let app = farmstand_api::app::build_app(services, JWT_SECRET, None);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            users,
            handle,
        }
    }

    /// Seed an account and mint a session token for it.
    fn login_as(&self, email: &str, admin: bool) -> String {
        let mut user = User::new(UserId::new(), email, Utc::now());
        user.admin = admin;
        let role = user.role();
        let id = user.id;
        self.users.seed(user);

        Hs256TokenCodec::new(JWT_SECRET.as_bytes())
            .issue(id, email, role)
            .expect("failed to mint token")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_item(srv: &TestServer, admin_token: &str, name: &str, total: i64) -> String {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/admin/items/create", srv.base_url))
        .bearer_auth(admin_token)
        .json(&json!({ "name": name, "total_quantity": total }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/api/items/claim", srv.base_url))
        .json(&json!({ "item_id": "x", "amount": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_customers() {
    let srv = TestServer::spawn().await;
    let token = srv.login_as("customer@example.com", false);

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/admin/items/create", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Eggs", "total_quantity": 12 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn session_cookie_is_accepted_like_a_bearer_token() {
    let srv = TestServer::spawn().await;
    let token = srv.login_as("cookie@example.com", false);

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .header("Cookie", format!("auth_token={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"].as_str().unwrap(), "cookie@example.com");
}

#[tokio::test]
async fn login_code_flow_issues_a_working_session() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Requesting a code always answers 200.
    let res = client
        .post(format!("{}/api/auth", srv.base_url))
        .json(&json!({ "email": "amy@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Wrong code is rejected.
    let res = client
        .post(format!("{}/api/auth/verify", srv.base_url))
        .json(&json!({ "email": "amy@example.com", "code": "xxxxxx" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Seed an account with a known pending code and verify with it.
    let mut user = User::new(UserId::new(), "bea@example.com", Utc::now());
    user.login_code = Some(LoginCode {
        code: "123456".to_string(),
        expires_at: Utc::now() + Duration::minutes(15),
    });
    srv.users.seed(user);

    let res = client
        .post(format!("{}/api/auth/verify", srv.base_url))
        .json(&json!({ "email": "bea@example.com", "code": "123456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("auth_token=")
    );
    let body: serde_json::Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let res = client
        .get(format!("{}/api/auth/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_login_code_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut user = User::new(UserId::new(), "late@example.com", Utc::now());
    user.login_code = Some(LoginCode {
        code: "123456".to_string(),
        expires_at: Utc::now() - Duration::minutes(1),
    });
    srv.users.seed(user);

    let res = client
        .post(format!("{}/api/auth/verify", srv.base_url))
        .json(&json!({ "email": "late@example.com", "code": "123456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn claim_lifecycle_maps_ledger_errors_to_statuses() {
    let srv = TestServer::spawn().await;
    let admin = srv.login_as("admin@example.com", true);
    let customer = srv.login_as("customer@example.com", false);
    let client = reqwest::Client::new();

    let item_id = create_item(&srv, &admin, "Tomatoes", 100).await;

    // Claim 30 of 100.
    let res = client
        .post(format!("{}/api/items/claim", srv.base_url))
        .bearer_auth(&customer)
        .json(&json!({ "item_id": item_id, "amount": 30 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let claim: serde_json::Value = res.json().await.unwrap();
    let claim_id = claim["id"].as_str().unwrap().to_string();
    assert_eq!(claim["item_name"].as_str().unwrap(), "Tomatoes");

    // Board shows remaining 70.
    let board: serde_json::Value = client
        .get(format!("{}/api/items", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(board["items"][0]["remaining_quantity"].as_i64(), Some(70));
    assert_eq!(board["claims"].as_array().unwrap().len(), 1);

    // Over-claiming is a 400 and leaves the board unchanged.
    let res = client
        .post(format!("{}/api/items/claim", srv.base_url))
        .bearer_auth(&customer)
        .json(&json!({ "item_id": item_id, "amount": 80 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "insufficient_stock");

    // Zero amounts are validation errors.
    let res = client
        .post(format!("{}/api/items/claim", srv.base_url))
        .bearer_auth(&customer)
        .json(&json!({ "item_id": item_id, "amount": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Reversal credits the amount back.
    let res = client
        .post(format!("{}/api/admin/claims/remove", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "id": claim_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let board: serde_json::Value = client
        .get(format!("{}/api/items", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(board["items"][0]["remaining_quantity"].as_i64(), Some(100));

    // Reversing it again is a conflict.
    let res = client
        .post(format!("{}/api/admin/claims/remove", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "id": claim_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Unknown claim is a 404.
    let res = client
        .post(format!("{}/api/admin/claims/remove", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "id": uuid::Uuid::now_v7().to_string() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Garbage ids are a 400.
    let res = client
        .post(format!("{}/api/admin/claims/remove", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "id": "not-a-uuid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_can_claim_on_behalf_of_a_user() {
    let srv = TestServer::spawn().await;
    let admin = srv.login_as("admin@example.com", true);
    let client = reqwest::Client::new();

    let item_id = create_item(&srv, &admin, "Honey", 10).await;

    let res = client
        .post(format!("{}/api/admin/users/create", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Amy", "email": "amy@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let user: serde_json::Value = res.json().await.unwrap();
    let user_id = user["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/admin/claims/create", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "item_id": item_id, "user_id": user_id, "amount": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // The stock check applies to admin claims too.
    let res = client
        .post(format!("{}/api/admin/claims/create", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "item_id": item_id, "user_id": user_id, "amount": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown user is a 404.
    let res = client
        .post(format!("{}/api/admin/claims/create", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "item_id": item_id,
            "user_id": uuid::Uuid::now_v7().to_string(),
            "amount": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removing_an_item_hides_it_and_its_claims() {
    let srv = TestServer::spawn().await;
    let admin = srv.login_as("admin@example.com", true);
    let customer = srv.login_as("customer@example.com", false);
    let client = reqwest::Client::new();

    let item_id = create_item(&srv, &admin, "Squash", 5).await;
    let res = client
        .post(format!("{}/api/items/claim", srv.base_url))
        .bearer_auth(&customer)
        .json(&json!({ "item_id": item_id, "amount": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/api/admin/items/remove", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "id": item_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let board: serde_json::Value = client
        .get(format!("{}/api/items", srv.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(board["items"].as_array().unwrap().is_empty());
    assert!(board["claims"].as_array().unwrap().is_empty());

    // A removed item no longer accepts claims.
    let res = client
        .post(format!("{}/api/items/claim", srv.base_url))
        .bearer_auth(&customer)
        .json(&json!({ "item_id": item_id, "amount": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updating_an_item_retotals_against_active_claims() {
    let srv = TestServer::spawn().await;
    let admin = srv.login_as("admin@example.com", true);
    let customer = srv.login_as("customer@example.com", false);
    let client = reqwest::Client::new();

    let item_id = create_item(&srv, &admin, "Flour", 50).await;
    client
        .post(format!("{}/api/items/claim", srv.base_url))
        .bearer_auth(&customer)
        .json(&json!({ "item_id": item_id, "amount": 20 }))
        .send()
        .await
        .unwrap();

    let res = client
        .post(format!("{}/api/admin/items/update", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "id": item_id, "name": "Flour", "total_quantity": 80 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["remaining_quantity"].as_i64(), Some(60));

    // Shrinking below the claimed quantity is rejected.
    let res = client
        .post(format!("{}/api/admin/items/update", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "id": item_id, "name": "Flour", "total_quantity": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn posts_and_messages_round_trip() {
    let srv = TestServer::spawn().await;
    let admin = srv.login_as("admin@example.com", true);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/admin/posts", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "title": "Harvest news",
            "blocks": [
                { "kind": "image", "content": "/202608/field.jpg", "position": 1 },
                { "kind": "text", "content": "First paragraph", "position": 0 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let post: serde_json::Value = res.json().await.unwrap();
    let post_id = post["id"].as_str().unwrap();
    // Blocks come back ordered by position.
    assert_eq!(post["blocks"][0]["kind"].as_str().unwrap(), "text");

    let res = client
        .get(format!("{}/api/posts/{}", srv.base_url, post_id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/admin/posts/{}/edit", srv.base_url, post_id))
        .bearer_auth(&admin)
        .json(&json!({ "title": "Harvest news, updated", "blocks": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Unknown block kinds are rejected.
    let res = client
        .post(format!("{}/api/admin/posts", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "title": "Bad",
            "blocks": [{ "kind": "video", "content": "x", "position": 0 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/api/admin/messages", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "title": "Closed saturday", "body": "See you next week" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let message: serde_json::Value = res.json().await.unwrap();
    let message_id = message["id"].as_str().unwrap();

    let res = client
        .get(format!("{}/api/messages", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);

    let res = client
        .delete(format!("{}/api/admin/messages/{}", srv.base_url, message_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(format!("{}/api/admin/messages/{}", srv.base_url, message_id))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn broadcast_email_reports_recipient_count() {
    let srv = TestServer::spawn().await;
    let admin = srv.login_as("admin@example.com", true);
    srv.login_as("a@example.com", false);
    srv.login_as("b@example.com", false);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/admin/email", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "subject": "Market day", "body": "Come early" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["recipients"].as_u64(), Some(3));
}
