//! Integration tests for alert sessions and alert preferences.
//!
//! These run without a database.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    empty_request, get_request, json_request, member_record, parse_response_body, TestApp,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn create_session(app: &TestApp, owner_id: &str, permission: &str) -> String {
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/alert-sessions",
            json!({ "ownerId": owner_id, "permission": permission }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    body["sessionId"].as_str().unwrap().to_string()
}

async fn poll_session(app: &TestApp, session_id: &str) -> Value {
    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!("/api/v1/alert-sessions/{}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    parse_response_body(response).await
}

fn critical_and_warning() -> Vec<domain::models::SubscriptionRecord> {
    vec![
        member_record("member-1", Some(1), None),
        member_record("member-2", Some(3), None),
    ]
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[tokio::test]
async fn test_create_session_returns_defaults() {
    let app = TestApp::new(Vec::new());

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/alert-sessions",
            json!({ "ownerId": "front-desk" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["ownerId"], "front-desk");
    assert_eq!(body["permission"], "default");
    assert_eq!(body["gateState"], "idle");
    assert_eq!(body["preferences"]["soundEnabled"], true);
    assert_eq!(body["preferences"]["alertThresholdDays"], 3);
    assert_eq!(app.state.sessions.len().await, 1);
}

#[tokio::test]
async fn test_create_session_requires_owner() {
    let app = TestApp::new(Vec::new());

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/alert-sessions",
            json!({ "ownerId": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_poll_unknown_session() {
    let app = TestApp::new(Vec::new());

    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/alert-sessions/{}",
            uuid::Uuid::new_v4()
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session() {
    let app = TestApp::new(Vec::new());
    let session_id = create_session(&app, "front-desk", "default").await;
    let uri = format!("/api/v1/alert-sessions/{}", session_id);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::DELETE, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(Method::DELETE, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.state.sessions.is_empty().await);
}

// ============================================================================
// Gate behavior
// ============================================================================

#[tokio::test]
async fn test_gate_fires_once_across_polls() {
    let app = TestApp::new(critical_and_warning());
    app.poll().await;
    let session_id = create_session(&app, "front-desk", "granted").await;

    let first = poll_session(&app, &session_id).await;
    assert_eq!(first["decision"]["playSound"], true);
    let notifications = first["decision"]["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["userId"], "member-1");
    assert_eq!(first["gateState"], "alerted");
    assert_eq!(first["snapshot"]["alerts"].as_array().unwrap().len(), 2);

    for _ in 0..4 {
        app.poll().await;
        let body = poll_session(&app, &session_id).await;
        assert_eq!(body["decision"]["playSound"], false);
        assert!(body["decision"]["notifications"]
            .as_array()
            .unwrap()
            .is_empty());
        assert_eq!(body["gateState"], "alerted");
        assert_eq!(body["snapshot"]["alerts"].as_array().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_reset_reopens_gate() {
    let app = TestApp::new(critical_and_warning());
    app.poll().await;
    let session_id = create_session(&app, "front-desk", "granted").await;

    poll_session(&app, &session_id).await;

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::POST,
            &format!("/api/v1/alert-sessions/{}/reset", session_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["gateState"], "idle");

    let again = poll_session(&app, &session_id).await;
    assert_eq!(again["decision"]["playSound"], true);
    assert_eq!(again["gateState"], "alerted");
}

#[tokio::test]
async fn test_sessions_have_independent_gates() {
    let app = TestApp::new(critical_and_warning());
    app.poll().await;
    let badge = create_session(&app, "front-desk", "granted").await;
    let panel = create_session(&app, "front-desk", "granted").await;

    assert_eq!(poll_session(&app, &badge).await["decision"]["playSound"], true);
    assert_eq!(poll_session(&app, &panel).await["decision"]["playSound"], true);
    assert_eq!(poll_session(&app, &badge).await["decision"]["playSound"], false);
}

#[tokio::test]
async fn test_denied_permission_plays_sound_only() {
    let app = TestApp::new(critical_and_warning());
    app.poll().await;
    let session_id = create_session(&app, "front-desk", "denied").await;

    let body = poll_session(&app, &session_id).await;
    assert_eq!(body["decision"]["playSound"], true);
    assert!(body["decision"]["notifications"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_permission_update_enables_notifications() {
    let app = TestApp::new(critical_and_warning());
    app.poll().await;
    let session_id = create_session(&app, "front-desk", "default").await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/alert-sessions/{}/permission", session_id),
            json!({ "permission": "granted" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["permission"], "granted");

    let body = poll_session(&app, &session_id).await;
    assert_eq!(
        body["decision"]["notifications"].as_array().unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_gate_waits_for_first_alert() {
    let app = TestApp::new(vec![member_record("member-1", Some(20), None)]);
    app.poll().await;
    let session_id = create_session(&app, "front-desk", "granted").await;

    let quiet = poll_session(&app, &session_id).await;
    assert_eq!(quiet["decision"]["playSound"], false);
    assert_eq!(quiet["gateState"], "idle");

    app.source
        .set(vec![member_record("member-1", Some(1), None)])
        .await;
    app.poll().await;

    let loud = poll_session(&app, &session_id).await;
    assert_eq!(loud["decision"]["playSound"], true);
    assert_eq!(loud["gateState"], "alerted");
}

#[tokio::test]
async fn test_muted_preferences_keep_gate_idle() {
    let app = TestApp::new(critical_and_warning());
    app.poll().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/alert-preferences/front-desk",
            json!({ "soundEnabled": false, "notificationEnabled": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let session_id = create_session(&app, "front-desk", "granted").await;
    for _ in 0..3 {
        let body = poll_session(&app, &session_id).await;
        assert_eq!(body["decision"]["playSound"], false);
        assert_eq!(body["gateState"], "idle");
        assert_eq!(body["snapshot"]["alerts"].as_array().unwrap().len(), 2);
    }
}

// ============================================================================
// Preferences
// ============================================================================

#[tokio::test]
async fn test_preferences_defaults() {
    let app = TestApp::new(Vec::new());

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/v1/alert-preferences/new-owner"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(
        body,
        json!({
            "soundEnabled": true,
            "notificationEnabled": true,
            "alertThresholdDays": 3,
            "reminderThresholdDays": 1
        })
    );
}

#[tokio::test]
async fn test_preferences_partial_update_persists() {
    let app = TestApp::new(Vec::new());

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/alert-preferences/front-desk",
            json!({ "alertThresholdDays": 7 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/v1/alert-preferences/front-desk"))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["alertThresholdDays"], 7);
    assert_eq!(body["reminderThresholdDays"], 1);
    assert_eq!(body["soundEnabled"], true);
}

#[tokio::test]
async fn test_preferences_reject_out_of_range() {
    let app = TestApp::new(Vec::new());

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/alert-preferences/front-desk",
            json!({ "reminderThresholdDays": 8 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(
        body["message"],
        "Reminder threshold must be between 1 and 7 days"
    );
}

#[tokio::test]
async fn test_session_snapshot_uses_owner_thresholds() {
    let app = TestApp::new(vec![
        member_record("member-1", Some(1), None),
        member_record("member-2", Some(10), None),
    ]);
    app.poll().await;

    app.router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/alert-preferences/manager",
            json!({ "alertThresholdDays": 14 }),
        ))
        .await
        .unwrap();

    let manager = create_session(&app, "manager", "default").await;
    let desk = create_session(&app, "front-desk", "default").await;

    let body = poll_session(&app, &manager).await;
    assert_eq!(body["snapshot"]["alerts"].as_array().unwrap().len(), 2);

    let body = poll_session(&app, &desk).await;
    assert_eq!(body["snapshot"]["alerts"].as_array().unwrap().len(), 1);
}
