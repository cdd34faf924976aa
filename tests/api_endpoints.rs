//! Integration tests for the blockchain demo API endpoints

use axum_test::TestServer;
use blockchain_demo::api::{build_api_router, AppState};
use blockchain_demo::config::Config;
use serde_json::{json, Value};
use std::sync::Arc;

fn test_server(config: &Config) -> TestServer {
    let state = Arc::new(AppState::new(config));
    TestServer::new(build_api_router(state)).expect("Failed to create test server")
}

async fn open_session(server: &TestServer) -> String {
    let response = server.post("/api/sessions").await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    json["session_id"]
        .as_str()
        .expect("session id is a string")
        .to_string()
}

#[tokio::test]
async fn test_health_and_hash_endpoints() {
    let server = test_server(&Config::default());

    let response = server.get("/api/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
    assert_eq!(json["sessions"], 0);
    assert_eq!(json["max_sessions"], 1024);

    let response = server.post("/api/hash").json(&json!({"text": "hello"})).await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["input"], "hello");
    assert_eq!(
        json["sha256"],
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );

    let response = server.post("/api/hash").json(&json!({"text": ""})).await;
    assert_eq!(response.status_code(), 400);
    let json: Value = response.json();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_new_session_has_genesis_block() {
    let server = test_server(&Config::default());
    let id = open_session(&server).await;

    let response = server.get(&format!("/api/sessions/{}/chain", id)).await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["length"], 1);
    let genesis = &json["blocks"][0];
    assert_eq!(genesis["index"], 1);
    assert_eq!(genesis["proof"], 100);
    assert_eq!(
        genesis["previous_hash"],
        "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks."
    );
    assert!(genesis["transactions"].as_array().unwrap().is_empty());
    assert_eq!(genesis["hash"].as_str().unwrap().len(), 64);

    let response = server.get(&format!("/api/sessions/{}/pending", id)).await;
    let json: Value = response.json();
    assert_eq!(json["count"], 0);
    assert_eq!(json["capacity"], 3);
}

#[tokio::test]
async fn test_submit_mine_and_verify() {
    let server = test_server(&Config::default());
    let id = open_session(&server).await;
    let tx_path = format!("/api/sessions/{}/transactions", id);

    // Nothing to mine yet
    let response = server.post(&format!("/api/sessions/{}/mine", id)).await;
    assert_eq!(response.status_code(), 409);

    for (position, (sender, recipient)) in [("A", "B"), ("C", "D"), ("E", "F")].iter().enumerate() {
        let response = server
            .post(&tx_path)
            .json(&json!({"sender": sender, "recipient": recipient, "amount": 1.0}))
            .await;
        assert_eq!(response.status_code(), 201);
        let json: Value = response.json();
        assert_eq!(json["position"], position + 1);
    }

    let response = server
        .post(&tx_path)
        .json(&json!({"sender": "G", "recipient": "H", "amount": 1.0}))
        .await;
    assert_eq!(response.status_code(), 409);
    let json: Value = response.json();
    assert_eq!(
        json["error"],
        "Pending transactions full. Mine a new block to add more."
    );

    let chain: Value = server
        .get(&format!("/api/sessions/{}/chain", id))
        .await
        .json();
    let genesis_hash = chain["blocks"][0]["hash"].clone();

    let response = server.post(&format!("/api/sessions/{}/mine", id)).await;
    assert_eq!(response.status_code(), 201);
    let json: Value = response.json();
    let block = &json["block"];
    assert_eq!(block["index"], 2);
    assert_eq!(block["previous_hash"], genesis_hash);
    let proof = block["proof"].as_u64().unwrap();
    assert!((1000..=9999).contains(&proof));
    let senders: Vec<&str> = block["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tx| tx["sender"].as_str().unwrap())
        .collect();
    assert_eq!(senders, vec!["A", "C", "E"]);

    let pending: Value = server
        .get(&format!("/api/sessions/{}/pending", id))
        .await
        .json();
    assert_eq!(pending["count"], 0);

    let response = server.get(&format!("/api/sessions/{}/verify", id)).await;
    let json: Value = response.json();
    assert_eq!(json["valid"], true);
    assert!(json.get("error").is_none());

    let stats: Value = server.get("/api/stats").await.json();
    assert_eq!(stats["transactions_submitted"], 3);
    assert_eq!(stats["blocks_mined"], 1);
    assert_eq!(stats["sessions_created"], 1);
    assert!(stats["failed_requests"].as_u64().unwrap() >= 2);
}

#[tokio::test]
async fn test_amount_below_minimum_rejected() {
    let server = test_server(&Config::default());
    let id = open_session(&server).await;

    let response = server
        .post(&format!("/api/sessions/{}/transactions", id))
        .json(&json!({"sender": "A", "recipient": "B", "amount": 0.01}))
        .await;
    assert_eq!(response.status_code(), 400);

    let pending: Value = server
        .get(&format!("/api/sessions/{}/pending", id))
        .await
        .json();
    assert_eq!(pending["count"], 0);
}

#[tokio::test]
async fn test_unknown_and_deleted_sessions() {
    let server = test_server(&Config::default());

    let response = server.get("/api/sessions/missing/chain").await;
    assert_eq!(response.status_code(), 404);
    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("missing"));

    let id = open_session(&server).await;
    let response = server.delete(&format!("/api/sessions/{}", id)).await;
    assert_eq!(response.status_code(), 204);
    let response = server.get(&format!("/api/sessions/{}/pending", id)).await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_session_limit_returns_unavailable() {
    let mut config = Config::default();
    config.server.max_sessions = 1;
    let server = test_server(&config);

    open_session(&server).await;
    let response = server.post("/api/sessions").await;
    assert_eq!(response.status_code(), 503);

    let health: Value = server.get("/api/health").await.json();
    assert_eq!(health["sessions"], 1);
    assert_eq!(health["max_sessions"], 1);
}

#[tokio::test]
async fn test_sessions_do_not_share_state() {
    let server = test_server(&Config::default());
    let first = open_session(&server).await;
    let second = open_session(&server).await;

    server
        .post(&format!("/api/sessions/{}/transactions", first))
        .json(&json!({"sender": "A", "recipient": "B", "amount": 2.0}))
        .await;

    let pending: Value = server
        .get(&format!("/api/sessions/{}/pending", second))
        .await
        .json();
    assert_eq!(pending["count"], 0);
}
