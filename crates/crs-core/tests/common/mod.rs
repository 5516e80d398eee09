//! In-process stand-in for the registration API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{any, get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::{json, Value};

use crs_core::{ApiClient, TokenStore};

pub const GOOD_PASSWORD: &str = "correct horse";
pub const REFRESH_TOKEN: &str = "refresh-1";
pub const REFRESHED_TOKEN: &str = "refreshed-access";

/// Unsigned JWT with the given payload
pub fn make_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.sig", header, body)
}

pub fn issued_token() -> String {
    make_token(&json!({
        "firstName": "Sara",
        "lastName": "Karimi",
        "username": "skarimi",
        "role": "ADMIN"
    }))
}

fn header(headers: &HeaderMap, name: &str) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| Value::String(v.to_string()))
        .unwrap_or(Value::Null)
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "authorization": header(&headers, "authorization"),
        "contentType": header(&headers, "content-type"),
        "body": body,
    }))
}

async fn item(Path(id): Path<u64>) -> Json<Value> {
    // Later ids answer sooner so completions interleave
    tokio::time::sleep(Duration::from_millis(200u64.saturating_sub(id * 10))).await;
    Json(json!({ "id": id }))
}

async fn list_lessons(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let lessons = json!([
        {"_id": "l1", "title": "Calculus I", "unit": 3, "createdBy": "u1"},
        {"_id": "l2", "title": "Data Structures", "unit": 3,
         "prerequisite": [{"_id": "l0", "title": "Programming I"}]},
        {"id": "l3", "title": "Linear Algebra", "unit": 2}
    ]);
    match params.get("search") {
        Some(query) => {
            let query = query.to_lowercase();
            let filtered: Vec<Value> = lessons
                .as_array()
                .into_iter()
                .flatten()
                .filter(|l| {
                    l["title"]
                        .as_str()
                        .is_some_and(|t| t.to_lowercase().contains(&query))
                })
                .cloned()
                .collect();
            Json(Value::Array(filtered))
        }
        None => Json(lessons),
    }
}

async fn lesson_item(method: Method, Path(id): Path<String>, body: String) -> impl IntoResponse {
    if method == Method::DELETE {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(json!({ "method": method.as_str(), "id": id, "body": body })).into_response()
}

async fn sections() -> Json<Value> {
    Json(json!([
        {
            "_id": "s1",
            "lesson": {"_id": "l2", "title": "Data Structures", "unit": 3},
            "classroom": {"_id": "c1", "room_number": "B-204"},
            "professor": {"_id": "p1", "firstName": "Reza", "lastName": "Ahmadi"},
            "capacity": 30,
            "students": ["st1", "st2"],
            "schedules": [{"day_of_week": "SATURDAY", "start_time": "08:00", "endTime": "10:00"}]
        },
        {
            "_id": "s2",
            "lesson": "l1",
            "capacity": 25,
            "students": []
        }
    ]))
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == GOOD_PASSWORD {
        Json(json!({ "accessToken": issued_token(), "refreshToken": REFRESH_TOKEN })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))).into_response()
    }
}

async fn refresh(body: String) -> impl IntoResponse {
    let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    if parsed["refreshToken"] == REFRESH_TOKEN {
        Json(json!({ "accessToken": REFRESHED_TOKEN })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Refresh token missing or invalid" })))
            .into_response()
    }
}

async fn change_password(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    if headers.get("authorization").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response();
    }
    if body["oldPassword"] != GOOD_PASSWORD {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": ["old password is wrong"] })))
            .into_response();
    }
    Json(json!({ "message": "Password changed" })).into_response()
}

fn collection(count: usize) -> Json<Value> {
    Json(Value::Array((0..count).map(|i| json!({ "_id": i.to_string() })).collect()))
}

pub fn router() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/no-content", get(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "message": "not found" }))) }),
        )
        .route(
            "/boom",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error") }),
        )
        .route("/plain", get(|| async { "hello there" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        )
        .route("/item/{id}", get(item))
        .route("/lesson-admin", get(list_lessons).post(echo))
        .route("/lesson-admin/{id}", any(lesson_item))
        .route("/section", get(sections))
        .route("/faculty", get(|| async { collection(2) }))
        .route("/major", get(|| async { collection(5) }))
        .route("/classroom", get(|| async { collection(4) }))
        .route(
            "/student",
            get(|| async { collection(7) }).post(|| async { (StatusCode::CREATED, collection(0)) }),
        )
        .route("/professor", get(|| async { collection(3) }))
        .route(
            "/admin",
            get(|| async { (StatusCode::FORBIDDEN, Json(json!({ "message": "Forbidden resource" }))) }),
        )
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/change-password", post(change_password))
}

/// Serve `router()` on an ephemeral port and return its base URL.
pub async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("test listener address");
    tokio::spawn(async move {
        axum::serve(listener, router()).await.expect("test server");
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn dead_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}", addr)
}

pub fn client_with_timeout(base: &str, timeout: Duration) -> ApiClient {
    ApiClient::new(base, Arc::new(TokenStore::in_memory()), timeout).expect("client")
}

pub fn client(base: &str) -> ApiClient {
    client_with_timeout(base, Duration::from_secs(10))
}
