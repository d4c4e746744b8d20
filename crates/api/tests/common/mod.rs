//! Shared helpers for API integration tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use gitadora_api::{AppState, RouterOptions, build_router_with_options};
use gitadora_auth::test_utils;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "correct-horse-battery";

pub async fn test_state() -> AppState {
    AppState::new(Arc::new(test_utils::test_service().await))
}

pub fn app(state: AppState) -> Router {
    build_router_with_options(state, RouterOptions::default())
}

pub async fn test_app() -> Router {
    app(test_state().await)
}

pub async fn response_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(json!({}))
}

/// Send a request, optionally with a bearer token and JSON body
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn login(app: &Router, email: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Create the first admin and return (id, token)
pub async fn setup_admin(app: &Router) -> (i64, String) {
    let response = send(
        app,
        Method::POST,
        "/api/v1/auth/setup",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": PASSWORD, "display_name": "Admin" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = response_json(response).await["id"].as_i64().unwrap();
    (id, login(app, ADMIN_EMAIL).await)
}

/// Register a player and return (id, token)
pub async fn register_player(app: &Router, name: &str) -> (i64, String) {
    let email = format!("{}@example.com", name);
    let response = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": email, "password": PASSWORD, "display_name": name })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = response_json(response).await["id"].as_i64().unwrap();
    (id, login(app, &email).await)
}

pub fn record(title: &str, rate: f64, score: f64, hot: bool, played_at: &str) -> Value {
    json!({
        "songTitle": title,
        "instrumentType": "guitar",
        "difficulty": "EXT",
        "achievementRate": rate,
        "skillScore": score,
        "isHot": hot,
        "playedAt": played_at,
    })
}
