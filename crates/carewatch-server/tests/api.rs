//! HTTP API tests driven through the router with `oneshot`.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use carewatch_config::{AssessmentConfig, CheckinsConfig};
use carewatch_core::{CheckinService, RiskAssessmentEngine};
use carewatch_server::build_router;
use carewatch_store::{MemoryObservationStore, MemoryProfileStore, ObservationStore};
use carewatch_test_utils::{FlakyStore, StoreFault};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn router_with(observations: Arc<dyn ObservationStore>) -> Router {
    let service = CheckinService::new(
        observations,
        Arc::new(MemoryProfileStore::new()),
        RiskAssessmentEngine::fallback_only(AssessmentConfig::default()),
        CheckinsConfig::default(),
    );
    build_router(Arc::new(service))
}

fn router() -> Router {
    router_with(Arc::new(MemoryObservationStore::new()))
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn checkin(date: &str, memory: u8) -> Value {
    json!({
        "date": date,
        "memory_score": memory,
        "orientation_score": 4,
        "activities_score": 5,
        "mood": "OK",
        "notes": "",
        "timezone": "Europe/Lisbon",
        "utc_offset_minutes": 60,
        "local_date": date,
    })
}

#[tokio::test]
async fn health_reports_provider_state() {
    let (status, body) = send(&router(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "provider_configured": false}));
}

#[tokio::test]
async fn create_then_fetch_checkin() {
    let router = router();
    let (status, created) =
        send(&router, Method::POST, "/api/checkins", Some(checkin("2024-06-01", 3))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], json!(true));
    let checkin = &created["checkin"];
    assert_eq!(checkin["memory_score"], json!(3));
    assert_eq!(checkin["mood"], json!("OK"));
    assert_eq!(checkin["date"], json!("2024-06-01"));
    assert_eq!(checkin["assessment"]["status"], json!("completed"));
    assert_eq!(checkin["assessment"]["risk_level"], json!("Low"));
    assert_eq!(checkin["observed_at"], json!("2024-06-01T11:00:00Z"));

    let id = checkin["id"].as_str().expect("string id");
    let (status, fetched) = send(&router, Method::GET, &format!("/api/checkins/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["checkin"], *checkin);
}

#[tokio::test]
async fn invalid_checkin_lists_every_problem() {
    let mut body = checkin("2024-06-01", 0);
    body["mood"] = json!("Fine");
    let (status, response) = send(&router(), Method::POST, "/api/checkins", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], json!(false));
    assert_eq!(
        response["errors"],
        json!([
            "memory_score must be between 1 and 5",
            "Mood must be one of: Good, OK, Low",
        ])
    );
}

#[tokio::test]
async fn non_json_body_is_rejected() {
    let router = router();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/checkins")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .expect("request");
    let response = router.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_is_newest_first_and_clamped() {
    let router = router();
    for date in ["2024-06-02", "2024-06-04", "2024-06-03"] {
        let (status, _) =
            send(&router, Method::POST, "/api/checkins", Some(checkin(date, 4))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = send(&router, Method::GET, "/api/checkins", None).await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<_> = body["checkins"]
        .as_array()
        .expect("array")
        .iter()
        .map(|checkin| checkin["date"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(dates, vec!["2024-06-04", "2024-06-03", "2024-06-02"]);

    let (_, limited) = send(&router, Method::GET, "/api/checkins?limit=0", None).await;
    assert_eq!(limited["checkins"].as_array().map(Vec::len), Some(1));
    let (_, lenient) = send(&router, Method::GET, "/api/checkins?limit=abc", None).await;
    assert_eq!(lenient["checkins"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn unknown_checkin_and_route_are_json_404s() {
    let router = router();
    let (status, body) = send(&router, Method::GET, "/api/checkins/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));

    let (status, body) = send(&router, Method::GET, "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn profile_defaults_blank_and_validates_updates() {
    let router = router();
    let (status, body) = send(&router, Method::GET, "/api/profile", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["id"], json!("primary"));
    assert_eq!(body["profile"]["name"], json!(""));

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/profile",
        Some(json!({"name": "Rosa", "age": 84, "education_years": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["age"], json!(84));

    let (status, body) = send(
        &router,
        Method::PUT,
        "/api/profile",
        Some(json!({"education_years": 40})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Education years must be between 0 and 30"));

    let (_, body) = send(&router, Method::GET, "/api/profile", None).await;
    assert_eq!(body["profile"]["name"], json!("Rosa"));
    assert_eq!(body["profile"]["education_years"], json!(10));
}

#[tokio::test]
async fn storage_failures_are_500s() {
    let store = Arc::new(FlakyStore::new());
    store.fail_always(StoreFault::Save);
    let router = router_with(store);
    let (status, body) =
        send(&router, Method::POST, "/api/checkins", Some(checkin("2024-06-01", 3))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Failed to create check-in"));
}

#[tokio::test]
async fn unsaved_assessment_reports_checkin_id() {
    let store = Arc::new(FlakyStore::new());
    store.fail_always(StoreFault::Update);
    let router = router_with(store.clone());
    let (status, body) =
        send(&router, Method::POST, "/api/checkins", Some(checkin("2024-06-01", 3))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let id = body["checkin_id"].as_str().expect("checkin id");
    store.heal();
    let (status, _) = send(&router, Method::GET, &format!("/api/checkins/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}
