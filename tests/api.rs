use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, BodyDataStream},
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use liftlog::{
    app::build_app,
    auth::{repo::MemoryAccountStore, tokens::JwtKeys},
    config::AppConfig,
    error::AppError,
    state::AppState,
    store::{Collection, Document, DocumentStore, Gateway},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    build_app(AppState::fake())
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
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

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": email, "password": "correct-horse", "display_name": "Sam" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_type(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/workout-types",
        Some(token),
        Some(json!({
            "name": name,
            "category": "upper",
            "equipment": "barbell",
            "muscle_groups": ["chest", "triceps"],
            "tags": ["Push", "push"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = call(&app(), Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = app();
    let token = register(&app, "lifter@example.com").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": "LIFTER@example.com", "password": "another-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "lifter@example.com", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["refresh_token"].is_string());

    let (status, body) = call(&app, Method::GET, "/api/v1/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Sam");
    assert_eq!(body["weight_unit"], "kg");

    let (status, body) = call(
        &app,
        Method::PATCH,
        "/api/v1/me",
        Some(&token),
        Some(json!({ "weight_unit": "lb" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weight_unit"], "lb");
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let (status, body) = call(&app(), Method::GET, "/api/v1/sessions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn workout_types_are_owner_scoped() {
    let app = app();
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    let bench = create_type(&app, &alice, "  Bench Press ").await;

    let (status, body) = call(&app, Method::GET, "/api/v1/workout-types", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Bench Press");
    assert_eq!(body[0]["tags"], json!(["push"]));

    let (status, body) = call(&app, Method::GET, "/api/v1/workout-types", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let uri = format!("/api/v1/workout-types/{}", bench);
    let (status, _) = call(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::PATCH, &uri, Some(&bob), Some(json!({ "name": "Mine" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::PATCH, &uri, Some(&alice), Some(json!({ "name": "Incline Bench" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Incline Bench");

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn loading_defaults_twice_adds_nothing_new() {
    let app = app();
    let token = register(&app, "defaults@example.com").await;

    let (status, first) = call(&app, Method::POST, "/api/v1/workout-types/defaults", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(first["created"].as_u64().unwrap() > 0);

    let (_, second) = call(&app, Method::POST, "/api/v1/workout-types/defaults", Some(&token), None).await;
    assert_eq!(second["created"], 0);

    let (_, listed) = call(
        &app,
        Method::GET,
        "/api/v1/workout-types?category=cardio",
        Some(&token),
        None,
    )
    .await;
    let listed = listed.as_array().unwrap();
    assert!(!listed.is_empty());
    assert!(listed.iter().all(|t| t["category"] == "cardio" && t["is_default"] == true));
}

#[tokio::test]
async fn invalid_workout_type_reports_fields() {
    let app = app();
    let token = register(&app, "invalid@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/workout-types",
        Some(&token),
        Some(json!({
            "name": "   ",
            "category": "upper",
            "equipment": "barbell",
            "muscle_groups": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"muscle_groups"));
}

#[tokio::test]
async fn session_validation_points_at_nested_set() {
    let app = app();
    let token = register(&app, "nested@example.com").await;
    let squat = create_type(&app, &token, "Squat").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/sessions",
        Some(&token),
        Some(json!({
            "date": "2024-03-12",
            "duration_minutes": 0,
            "exercises": [{ "workout_type_id": squat, "sets": [{ "weight": 100, "reps": 0 }] }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"duration_minutes"));
    assert!(fields.contains(&"exercises[0].sets[0].reps"));
}

#[tokio::test]
async fn logged_session_feeds_stats() {
    let app = app();
    let token = register(&app, "stats@example.com").await;
    let bench = create_type(&app, &token, "Bench Press").await;

    let (_, before) = call(&app, Method::GET, "/api/v1/sessions", Some(&token), None).await;
    assert!(before.as_array().unwrap().is_empty());

    let (status, session) = call(
        &app,
        Method::POST,
        "/api/v1/sessions",
        Some(&token),
        Some(json!({
            "date": "2024-03-14",
            "duration_minutes": 55,
            "exercises": [{
                "workout_type_id": bench,
                "sets": [{ "weight": 100, "reps": 5 }, { "weight": 80, "reps": 8 }]
            }, {
                "workout_type_id": bench,
                "sets": [{ "distance": 5, "time_seconds": 1800 }]
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{session}");
    assert_eq!(session["exercises"][0]["workout_type_name"], "Bench Press");

    // the cached empty list was invalidated by the write
    let (_, after) = call(&app, Method::GET, "/api/v1/sessions", Some(&token), None).await;
    assert_eq!(after.as_array().unwrap().len(), 1);

    let (status, summary) = call(&app, Method::GET, "/api/v1/stats/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["sessions"], 1);
    assert_eq!(summary["total_volume"], 1140.0);

    let uri = format!("/api/v1/stats/records/{}", bench);
    let (status, records) = call(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records["max_weight"], 100.0);
    assert_eq!(records["max_reps"], 8);
    assert_eq!(records["max_volume"], 640.0);

    let (status, points) = call(
        &app,
        Method::GET,
        "/api/v1/stats/volume?from=2024-03-04&to=2024-03-17&granularity=week",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        points,
        json!([
            { "bucket_start": "2024-03-04", "volume": 0.0, "sessions": 0 },
            { "bucket_start": "2024-03-11", "volume": 1140.0, "sessions": 1 }
        ])
    );

    let (status, frequency) = call(&app, Method::GET, "/api/v1/stats/frequency", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(frequency["exercises"][0]["name"], "Bench Press");
    assert_eq!(frequency["muscle_groups"]["chest"], 2);
}

#[tokio::test]
async fn session_patch_and_delete() {
    let app = app();
    let token = register(&app, "patch@example.com").await;
    let other = register(&app, "other@example.com").await;

    let (_, session) = call(
        &app,
        Method::POST,
        "/api/v1/sessions",
        Some(&token),
        Some(json!({ "date": "2024-01-02", "duration_minutes": 30, "notes": "easy day" })),
    )
    .await;
    let uri = format!("/api/v1/sessions/{}", session["id"].as_str().unwrap());

    let (status, patched) = call(
        &app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "duration_minutes": 45, "notes": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["duration_minutes"], 45);
    assert_eq!(patched["date"], "2024-01-02");
    assert!(patched["notes"].is_null());

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_referencing_foreign_type_is_not_found() {
    let app = app();
    let alice = register(&app, "a2@example.com").await;
    let bob = register(&app, "b2@example.com").await;
    let alice_type = create_type(&app, &alice, "Deadlift").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/sessions",
        Some(&bob),
        Some(json!({
            "date": "2024-03-14",
            "duration_minutes": 20,
            "exercises": [{ "workout_type_id": alice_type, "sets": [{ "weight": 140, "reps": 3 }] }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn volume_chart_range_is_capped() {
    let app = app();
    let token = register(&app, "wide@example.com").await;
    let (status, body) = call(
        &app,
        Method::GET,
        "/api/v1/stats/volume?from=0001-01-01&to=9999-12-31&granularity=day",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "from");
}

async fn open_stream(app: &Router, uri: &str, token: &str) -> BodyDataStream {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    response.into_body().into_data_stream()
}

/// Next `(event, data)` pair from an SSE body, skipping comments.
async fn next_event(body: &mut BodyDataStream, buffer: &mut String) -> (String, Value) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(end) = buffer.find("\n\n") {
                let block: String = buffer.drain(..end + 2).collect();
                let mut event = None;
                let mut data = String::new();
                for line in block.lines() {
                    if let Some(name) = line.strip_prefix("event:") {
                        event = Some(name.trim().to_string());
                    } else if let Some(chunk) = line.strip_prefix("data:") {
                        data.push_str(chunk.trim_start());
                    }
                }
                if let Some(event) = event {
                    return (event, serde_json::from_str(&data).unwrap());
                }
                continue;
            }
            let chunk = body.next().await.expect("stream ended").unwrap();
            buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    })
    .await
    .expect("no event within 5s")
}

#[tokio::test]
async fn session_stream_pushes_snapshot_after_each_write() {
    let state = AppState::fake();
    let gateway = state.gateway.clone();
    let app = build_app(state);
    let token = register(&app, "stream@example.com").await;
    let bench = create_type(&app, &token, "Bench Press").await;

    let mut body = open_stream(&app, "/api/v1/sessions/stream", &token).await;
    let mut buffer = String::new();
    let (event, data) = next_event(&mut body, &mut buffer).await;
    assert_eq!(event, "snapshot");
    assert_eq!(data, json!([]));

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/sessions",
        Some(&token),
        Some(json!({
            "date": "2024-03-14",
            "duration_minutes": 40,
            "exercises": [{ "workout_type_id": bench, "sets": [{ "weight": 60, "reps": 10 }] }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (event, data) = next_event(&mut body, &mut buffer).await;
    assert_eq!(event, "snapshot");
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert_eq!(data[0]["exercises"][0]["workout_type_name"], "Bench Press");

    // disconnecting the client tears the subscription down
    assert_eq!(gateway.live_subscriptions(), 1);
    drop(body);
    tokio::time::timeout(Duration::from_secs(5), async {
        while gateway.live_subscriptions() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscription still alive after disconnect");
}

#[tokio::test]
async fn workout_type_stream_follows_catalogue_changes() {
    let app = app();
    let token = register(&app, "types-stream@example.com").await;

    let mut body = open_stream(&app, "/api/v1/workout-types/stream", &token).await;
    let mut buffer = String::new();
    let (event, data) = next_event(&mut body, &mut buffer).await;
    assert_eq!((event.as_str(), data), ("snapshot", json!([])));

    let squat = create_type(&app, &token, "Squat").await;
    let (_, data) = next_event(&mut body, &mut buffer).await;
    assert_eq!(data[0]["id"], squat.as_str());

    let uri = format!("/api/v1/workout-types/{}", squat);
    call(&app, Method::DELETE, &uri, Some(&token), None).await;
    let (_, data) = next_event(&mut body, &mut buffer).await;
    assert_eq!(data, json!([]));
}

/// Document store whose backend is unreachable.
struct OfflineStore;

fn offline<T>() -> Result<T, AppError> {
    Err(AppError::TransientIo("document store offline".into()))
}

#[async_trait]
impl DocumentStore for OfflineStore {
    async fn insert(&self, _: Uuid, _: Document) -> Result<Document, AppError> {
        offline()
    }
    async fn get(&self, _: Uuid, _: Collection, _: Uuid) -> Result<Document, AppError> {
        offline()
    }
    async fn list(&self, _: Uuid, _: Collection) -> Result<Vec<Document>, AppError> {
        offline()
    }
    async fn replace(&self, _: Uuid, _: Document) -> Result<Document, AppError> {
        offline()
    }
    async fn delete(&self, _: Uuid, _: Collection, _: Uuid) -> Result<(), AppError> {
        offline()
    }
}

#[tokio::test]
async fn failed_snapshot_is_sent_as_error_event() {
    let config = AppConfig::for_tests();
    let token = JwtKeys::new(&config.jwt)
        .issue_pair(Uuid::new_v4())
        .unwrap()
        .access_token;
    let state = AppState::from_parts(
        config,
        Gateway::new(Arc::new(OfflineStore)),
        Arc::new(MemoryAccountStore::default()),
        None,
    );
    let app = build_app(state);

    let (status, body) = call(&app, Method::GET, "/api/v1/sessions", Some(&token), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "service_unavailable");

    let mut body = open_stream(&app, "/api/v1/sessions/stream", &token).await;
    let mut buffer = String::new();
    let (event, data) = next_event(&mut body, &mut buffer).await;
    assert_eq!(event, "error");
    assert!(data["message"].as_str().unwrap().contains("offline"));
}
