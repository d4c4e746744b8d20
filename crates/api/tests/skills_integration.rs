//! Integration tests for skill endpoints
//!
//! Tests: record submission, aggregation, snapshots, history cutoff, ranking

mod common;

use axum::{
    Router,
    http::{Method, StatusCode},
};
use serde_json::{Value, json};

use common::*;

async fn submit(app: &Router, token: &str, player_id: i64, records: Vec<Value>) -> StatusCode {
    send(
        app,
        Method::POST,
        &format!("/api/v1/players/{}/records", player_id),
        Some(token),
        Some(json!({ "records": records })),
    )
    .await
    .status()
}

async fn skills(app: &Router, token: &str, uri: &str) -> Value {
    let response = send(app, Method::GET, uri, Some(token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await
}

async fn snapshot(app: &Router, token: &str, player_id: i64) -> Value {
    let response = send(
        app,
        Method::POST,
        &format!("/api/v1/players/{}/snapshots?instrument=guitar", player_id),
        Some(token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await
}

/// Player with one hot slot (170) and one other slot (50)
async fn seeded() -> (Router, i64, String) {
    let app = test_app().await;
    setup_admin(&app).await;
    let (id, token) = register_player(&app, "alice").await;

    let status = submit(
        &app,
        &token,
        id,
        vec![
            record("Song A", 95.0, 170.0, true, "2024-01-01T00:00:00Z"),
            record("Song A", 90.0, 150.0, true, "2024-01-02T00:00:00Z"),
            record("Song B", 90.0, 50.0, false, "2024-01-03T00:00:00Z"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (app, id, token)
}

#[tokio::test]
async fn test_aggregated_skill() {
    let (app, id, token) = seeded().await;

    let json = skills(&app, &token, &format!("/api/v1/players/{}/skills", id)).await;
    assert_eq!(json["instrumentType"], "GUITAR");
    assert_eq!(json["totalSkill"].as_f64().unwrap(), 220.0);
    assert_eq!(json["hotSkill"].as_f64().unwrap(), 170.0);
    assert_eq!(json["otherSkill"].as_f64().unwrap(), 50.0);

    let hot = json["hotRecords"].as_array().unwrap();
    assert_eq!(hot.len(), 1);
    assert_eq!(hot[0]["achievementRate"].as_f64().unwrap(), 95.0);
    assert_eq!(json["otherRecords"].as_array().unwrap().len(), 1);
    assert!(json["history"].as_array().unwrap().is_empty());
    assert!(json.get("cutoff").is_none());
}

#[tokio::test]
async fn test_other_instrument_is_empty() {
    let (app, id, token) = seeded().await;

    let json = skills(
        &app,
        &token,
        &format!("/api/v1/players/{}/skills?instrument=BASS", id),
    )
    .await;
    assert_eq!(json["instrumentType"], "BASS");
    assert_eq!(json["totalSkill"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn test_skill_request_errors() {
    let (app, id, token) = seeded().await;

    let response = send(&app, Method::GET, "/api/v1/players/abc/skills", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"], "BAD_REQUEST");

    let response = send(&app, Method::GET, "/api/v1/players/999/skills", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/players/{}/skills?instrument=keyboard", id);
    let response = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/players/{}/skills?history_id=latest", id);
    let response = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/players/{}/skills?history_id=12345", id);
    let response = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_version_filter() {
    let (app, id, token) = seeded().await;

    let mut versioned = record("Song C", 98.0, 120.0, false, "2024-02-01T00:00:00Z");
    versioned["version"] = json!("GALAXY WAVE");
    assert_eq!(submit(&app, &token, id, vec![versioned]).await, StatusCode::CREATED);

    let uri = format!("/api/v1/players/{}/skills?version=GALAXY%20WAVE", id);
    let json = skills(&app, &token, &uri).await;
    assert_eq!(json["totalSkill"].as_f64().unwrap(), 120.0);
    assert_eq!(json["otherRecords"][0]["version"], "GALAXY WAVE");

    let json = skills(&app, &token, &format!("/api/v1/players/{}/skills", id)).await;
    assert_eq!(json["totalSkill"].as_f64().unwrap(), 340.0);
}

#[tokio::test]
async fn test_snapshot_and_history_cutoff() {
    let (app, id, token) = seeded().await;

    let snap = snapshot(&app, &token, id).await;
    assert_eq!(snap["playerId"], id);
    assert_eq!(snap["totalSkill"].as_f64().unwrap(), 220.0);
    let snapshot_id = snap["id"].as_i64().unwrap();

    // A play after the snapshot
    let status = submit(
        &app,
        &token,
        id,
        vec![record("Song D", 99.0, 300.0, true, "2099-01-01T00:00:00Z")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let json = skills(&app, &token, &format!("/api/v1/players/{}/skills", id)).await;
    assert_eq!(json["totalSkill"].as_f64().unwrap(), 520.0);
    assert_eq!(json["history"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/players/{}/skills?history_id={}", id, snapshot_id);
    let json = skills(&app, &token, &uri).await;
    assert_eq!(json["totalSkill"].as_f64().unwrap(), 220.0);
    assert_eq!(json["hotSkill"].as_f64().unwrap(), 170.0);
    assert!(json["cutoff"].is_string());

    let json = skills(
        &app,
        &token,
        &format!("/api/v1/players/{}/skills/history", id),
    )
    .await;
    let history = json.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], snapshot_id);
}

#[tokio::test]
async fn test_snapshot_ignores_plays_after_it() {
    let (app, id, token) = seeded().await;

    let status = submit(
        &app,
        &token,
        id,
        vec![record("Song D", 99.0, 300.0, true, "2099-01-01T00:00:00Z")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let snap = snapshot(&app, &token, id).await;
    assert_eq!(snap["totalSkill"].as_f64().unwrap(), 220.0);

    let uri = format!(
        "/api/v1/players/{}/skills?history_id={}",
        id,
        snap["id"].as_i64().unwrap()
    );
    let json = skills(&app, &token, &uri).await;
    assert_eq!(json["totalSkill"], snap["totalSkill"]);
    assert_eq!(json["hotSkill"], snap["hotSkill"]);
    assert_eq!(json["otherSkill"], snap["otherSkill"]);
}

#[tokio::test]
async fn test_history_id_of_other_player_not_found() {
    let (app, alice, alice_token) = seeded().await;
    let (bob, bob_token) = register_player(&app, "bob").await;
    let bob_snapshot = snapshot(&app, &bob_token, bob).await;

    let uri = format!(
        "/api/v1/players/{}/skills?history_id={}",
        alice, bob_snapshot["id"]
    );
    let response = send(&app, Method::GET, &uri, Some(&alice_token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_for_other_player_forbidden() {
    let (app, alice, _) = seeded().await;
    let (bob, bob_token) = register_player(&app, "bob").await;

    let records = vec![record("Song A", 100.0, 180.0, true, "2024-01-05T00:00:00Z")];
    assert_eq!(submit(&app, &bob_token, alice, records.clone()).await, StatusCode::FORBIDDEN);
    assert_eq!(submit(&app, &bob_token, bob, records).await, StatusCode::CREATED);

    let uri = format!("/api/v1/players/{}/snapshots", alice);
    let response = send(&app, Method::POST, &uri, Some(&bob_token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_submits_for_player() {
    let (app, alice, _) = seeded().await;
    let admin_token = login(&app, ADMIN_EMAIL).await;

    let records = vec![record("Song E", 80.0, 60.0, false, "2024-01-05T00:00:00Z")];
    assert_eq!(submit(&app, &admin_token, alice, records).await, StatusCode::CREATED);

    let snap = snapshot(&app, &admin_token, alice).await;
    assert_eq!(snap["totalSkill"].as_f64().unwrap(), 280.0);
}

#[tokio::test]
async fn test_submit_validation() {
    let (app, id, token) = seeded().await;

    assert_eq!(submit(&app, &token, id, vec![]).await, StatusCode::UNPROCESSABLE_ENTITY);

    let mut bad = record("Song A", 95.0, 170.0, true, "2024-01-01T00:00:00Z");
    bad["difficulty"] = json!("HARD");
    assert_eq!(submit(&app, &token, id, vec![bad]).await, StatusCode::UNPROCESSABLE_ENTITY);

    let too_many = (0..=1000)
        .map(|i| record(&format!("Song {}", i), 90.0, 10.0, false, "2024-01-01T00:00:00Z"))
        .collect();
    assert_eq!(submit(&app, &token, id, too_many).await, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_submit_response_echoes_stored_records() {
    let app = test_app().await;
    let (id, token) = register_player(&app, "carol").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/players/{}/records", id),
        Some(&token),
        Some(json!({ "records": [record("Song A", 95.0, 170.0, true, "2024-01-01T00:00:00Z")] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = response_json(response).await;
    assert_eq!(json["inserted"], 1);
    assert_eq!(json["records"][0]["playerId"], id);
    assert_eq!(json["records"][0]["difficulty"], "EXTREME");
    assert_eq!(json["records"][0]["instrumentType"], "GUITAR");
}

#[tokio::test]
async fn test_ranking() {
    let (app, alice, alice_token) = seeded().await;
    let (bob, bob_token) = register_player(&app, "bob").await;
    let records = vec![record("Song X", 99.0, 400.0, true, "2024-03-01T00:00:00Z")];
    assert_eq!(submit(&app, &bob_token, bob, records).await, StatusCode::CREATED);

    snapshot(&app, &alice_token, alice).await;
    snapshot(&app, &bob_token, bob).await;

    let json = skills(&app, &alice_token, "/api/v1/ranking").await;
    assert_eq!(json["instrumentType"], "GUITAR");

    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["playerId"], bob);
    assert_eq!(entries[0]["playerName"], "bob");
    assert_eq!(entries[1]["rank"], 2);
    assert_eq!(entries[1]["playerId"], alice);
    assert_eq!(entries[1]["totalSkill"].as_f64().unwrap(), 220.0);

    let json = skills(&app, &alice_token, "/api/v1/ranking?instrument=drum").await;
    assert!(json["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ranking_uses_latest_snapshot() {
    let (app, alice, token) = seeded().await;
    snapshot(&app, &token, alice).await;

    let records = vec![record("Song Z", 97.0, 100.0, false, "2024-04-01T00:00:00Z")];
    assert_eq!(submit(&app, &token, alice, records).await, StatusCode::CREATED);
    snapshot(&app, &token, alice).await;

    let json = skills(&app, &token, "/api/v1/ranking").await;
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["totalSkill"].as_f64().unwrap(), 320.0);
}
