use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

use storekeep_auth::{JwtClaims, Role};
use storekeep_core::{StoreId, UserId};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        // DATABASE_URL is unset under test, so this runs on the in-memory store.
        let app = storekeep_api::app::build_app(jwt_secret.to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, store_id: StoreId) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        store_id,
        role: Role::Admin,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn provision(
    client: &reqwest::Client,
    server: &TestServer,
    token: &str,
    product_id: Uuid,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/inventory/{}", server.base_url, product_id))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn inventory_routes_require_auth() {
    let server = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/inventory/{}/adjust", server.base_url, Uuid::now_v7()))
        .json(&json!({ "delta": 1, "reason": "restock" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn adjust_applies_delta_and_records_transaction() {
    let server = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = mint_jwt("test-secret", StoreId::new());
    let product_id = Uuid::now_v7();

    provision(&client, &server, &token, product_id).await;

    let res = client
        .post(format!("{}/inventory/{}/adjust", server.base_url, product_id))
        .bearer_auth(&token)
        .json(&json!({
            "delta": 10,
            "reason": "initial stock",
            "transactionType": "IN",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["inventory"]["quantity"], 10);
    assert_eq!(body["inventory"]["availableQuantity"], 10);
    assert!(!body["inventory"]["lastRestocked"].is_null());
    assert_eq!(body["transaction"]["previousQuantity"], 0);
    assert_eq!(body["transaction"]["newQuantity"], 10);
    assert_eq!(body["transaction"]["quantity"], 10);
    assert_eq!(body["transaction"]["transactionType"], "IN");
}

#[tokio::test]
async fn over_subtraction_clamps_to_zero() {
    let server = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = mint_jwt("test-secret", StoreId::new());
    let product_id = Uuid::now_v7();

    provision(&client, &server, &token, product_id).await;

    client
        .post(format!("{}/inventory/{}/adjust", server.base_url, product_id))
        .bearer_auth(&token)
        .json(&json!({ "delta": 20, "reason": "restock", "transactionType": "IN" }))
        .send()
        .await
        .unwrap();

    let res = client
        .post(format!("{}/inventory/{}/adjust", server.base_url, product_id))
        .bearer_auth(&token)
        .json(&json!({ "delta": -25, "reason": "sale", "transactionType": "OUT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["inventory"]["quantity"], 0);
    assert_eq!(body["transaction"]["previousQuantity"], 20);
    assert_eq!(body["transaction"]["newQuantity"], 0);
    assert_eq!(body["transaction"]["quantity"], 25);
}

#[tokio::test]
async fn adjust_unknown_record_is_not_found() {
    let server = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = mint_jwt("test-secret", StoreId::new());

    let res = client
        .post(format!("{}/inventory/{}/adjust", server.base_url, Uuid::now_v7()))
        .bearer_auth(&token)
        .json(&json!({ "delta": 5, "reason": "restock" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_provision_conflicts() {
    let server = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = mint_jwt("test-secret", StoreId::new());
    let product_id = Uuid::now_v7();

    provision(&client, &server, &token, product_id).await;

    let res = client
        .post(format!("{}/inventory/{}", server.base_url, product_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn bulk_update_reports_per_entry_outcomes() {
    let server = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = mint_jwt("test-secret", StoreId::new());

    let first = Uuid::now_v7();
    let missing = Uuid::now_v7();
    let third = Uuid::now_v7();
    provision(&client, &server, &token, first).await;
    provision(&client, &server, &token, third).await;

    let res = client
        .post(format!("{}/inventory/bulk", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "updates": [
                { "productId": first, "delta": 5, "reason": "restock", "transactionType": "IN" },
                { "productId": missing, "delta": 2, "reason": "restock" },
                { "productId": third, "delta": -1, "reason": "damage", "transactionType": "DAMAGE" },
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["previousQuantity"], 0);
    assert_eq!(results[0]["newQuantity"], 5);

    assert_eq!(results[1]["success"], false);
    assert!(results[1]["message"].as_str().unwrap().contains("not found"));

    // Entry 3 landed despite entry 2 failing (delta -1 on empty stock clamps to 0).
    assert_eq!(results[2]["success"], true);
    assert_eq!(results[2]["newQuantity"], 0);

    // And the successful entries are persisted.
    let res = client
        .get(format!("{}/inventory/{}", server.base_url, first))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["inventory"]["quantity"], 5);
    assert_eq!(body["recentTransactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn record_lookup_returns_recent_transactions_newest_first() {
    let server = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = mint_jwt("test-secret", StoreId::new());
    let product_id = Uuid::now_v7();

    provision(&client, &server, &token, product_id).await;

    for (delta, reason) in [(8, "restock"), (-3, "sale")] {
        let res = client
            .post(format!("{}/inventory/{}/adjust", server.base_url, product_id))
            .bearer_auth(&token)
            .json(&json!({ "delta": delta, "reason": reason }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(format!("{}/inventory/{}", server.base_url, product_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["inventory"]["quantity"], 5);

    let transactions = body["recentTransactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["reason"], "sale");
    assert_eq!(transactions[1]["reason"], "restock");
}

#[tokio::test]
async fn blank_reason_is_rejected_before_any_write() {
    let server = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let token = mint_jwt("test-secret", StoreId::new());
    let product_id = Uuid::now_v7();

    provision(&client, &server, &token, product_id).await;

    let res = client
        .post(format!("{}/inventory/{}/adjust", server.base_url, product_id))
        .bearer_auth(&token)
        .json(&json!({ "delta": 5, "reason": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // No transaction was written.
    let res = client
        .get(format!("{}/inventory/{}", server.base_url, product_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["inventory"]["quantity"], 0);
    assert!(body["recentTransactions"].as_array().unwrap().is_empty());
}
