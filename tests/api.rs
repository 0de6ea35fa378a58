//! End-to-end tests against the assembled router, driving the REST
//! surface the way a client would.

#![allow(clippy::panic)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt;

use boxoffice::api;
use boxoffice::app_state::AppState;
use boxoffice::domain::{
    BookingStore, CapacityLedger, NotificationLog, UserDirectory, WaitlistStore,
};
use boxoffice::mail::{LogMailTransport, MailTransport};
use boxoffice::service::{BookingService, NotifyService, WaitlistService};

fn app() -> Router {
    let ledger = Arc::new(CapacityLedger::new());
    let bookings = Arc::new(BookingStore::new());
    let users = Arc::new(UserDirectory::new());
    let mail: Arc<dyn MailTransport> = Arc::new(LogMailTransport);

    let waitlist_service = Arc::new(WaitlistService::new(
        Arc::clone(&ledger),
        Arc::new(WaitlistStore::new(Duration::hours(48))),
        Arc::clone(&users),
        Arc::clone(&mail),
    ));
    let booking_service = Arc::new(BookingService::new(
        Arc::clone(&ledger),
        Arc::clone(&bookings),
        Arc::clone(&waitlist_service),
        None,
        10,
    ));
    let notify_service = Arc::new(NotifyService::new(
        Arc::clone(&users),
        bookings,
        Arc::new(NotificationLog::new()),
        mail,
        None,
        Duration::minutes(30),
        4,
    ));

    Router::new()
        .merge(api::build_router())
        .with_state(AppState {
            booking_service,
            waitlist_service,
            notify_service,
            users,
        })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = match app.clone().oneshot(request).await {
        Ok(r) => r,
        Err(e) => panic!("request failed: {e}"),
    };
    let status = response.status();
    let bytes = match axum::body::to_bytes(response.into_body(), usize::MAX).await {
        Ok(b) => b,
        Err(e) => panic!("body read failed: {e}"),
    };
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("response is not JSON: {e}"),
        }
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value, user_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id);
    }
    match builder.body(Body::from(body.to_string())) {
        Ok(r) => r,
        Err(e) => panic!("request build failed: {e}"),
    }
}

fn get(uri: &str, user_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id);
    }
    match builder.body(Body::empty()) {
        Ok(r) => r,
        Err(e) => panic!("request build failed: {e}"),
    }
}

fn delete(uri: &str, user_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id);
    }
    match builder.body(Body::empty()) {
        Ok(r) => r,
        Err(e) => panic!("request build failed: {e}"),
    }
}

async fn register_user(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/v1/users",
            &json!({"email": email, "name": "Test User"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    match body.get("user_id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => panic!("missing user_id in {body}"),
    }
}

async fn create_event(app: &Router, body: Value) -> String {
    let (status, body) = send(app, post_json("/api/v1/events", &body, None)).await;
    assert_eq!(status, StatusCode::CREATED);
    match body.get("event_id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => panic!("missing event_id in {body}"),
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("healthy"));
}

#[tokio::test]
async fn recipient_type_catalog_is_complete() {
    let app = app();
    let (status, body) = send(&app, get("/config/recipient-types", None)).await;
    assert_eq!(status, StatusCode::OK);
    let Some(types) = body.as_array() else {
        panic!("expected array, got {body}");
    };
    assert_eq!(types.len(), 4);
}

#[tokio::test]
async fn booking_requires_caller_identity() {
    let app = app();
    let event_id = create_event(&app, json!({"name": "Gala", "capacity": 10})).await;
    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/bookings",
            &json!({"event_id": event_id, "quantity": 1}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body.pointer("/error/message")
            .and_then(Value::as_str)
            .is_some_and(|m| m.contains("x-user-id"))
    );
}

#[tokio::test]
async fn booking_with_seats_updates_availability_and_seat_map() {
    let app = app();
    let user_id = register_user(&app, "alice@example.com").await;
    let event_id = create_event(&app, json!({"name": "Recital", "capacity": 23})).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/bookings",
            &json!({"event_id": event_id, "quantity": 2, "seats": [21, 23]}),
            Some(&user_id),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("status").and_then(Value::as_str), Some("confirmed"));
    assert_eq!(
        body.get("ticket_ids").and_then(Value::as_array).map(Vec::len),
        Some(2)
    );

    let (status, body) = send(
        &app,
        get(&format!("/api/v1/events/{event_id}/availability"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("available").and_then(Value::as_u64), Some(21));

    let (status, mine) = send(&app, get("/api/v1/bookings/my-bookings", Some(&user_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    let (status, body) = send(
        &app,
        get(&format!("/api/v1/bookings/event/{event_id}/seats"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("booked_seats"), Some(&json!([21, 23])));

    // 23 seats at 10 per row: two full rows and a partial third.
    let (status, body) = send(
        &app,
        get(&format!("/api/v1/bookings/event/{event_id}/layout"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let Some(rows) = body.get("rows").and_then(Value::as_array) else {
        panic!("missing rows in {body}");
    };
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.last().and_then(Value::as_array).map(Vec::len), Some(3));
}

#[tokio::test]
async fn conflicting_seat_is_rejected_without_losing_capacity() {
    let app = app();
    let alice = register_user(&app, "alice@example.com").await;
    let bob = register_user(&app, "bob@example.com").await;
    let event_id = create_event(&app, json!({"name": "Recital", "capacity": 20})).await;

    let (status, _) = send(
        &app,
        post_json(
            "/api/v1/bookings",
            &json!({"event_id": event_id, "quantity": 1, "seats": [5]}),
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/bookings",
            &json!({"event_id": event_id, "quantity": 1, "seats": [5]}),
            Some(&bob),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body.pointer("/error/message")
            .and_then(Value::as_str)
            .is_some_and(|m| m.contains('5'))
    );

    // The failed attempt must not consume units.
    let (_, body) = send(
        &app,
        get(&format!("/api/v1/events/{event_id}/availability"), None),
    )
    .await;
    assert_eq!(body.get("available").and_then(Value::as_u64), Some(19));
}

#[tokio::test]
async fn cancellation_promotes_the_waitlist() {
    let app = app();
    let alice = register_user(&app, "alice@example.com").await;
    let bob = register_user(&app, "bob@example.com").await;
    let event_id = create_event(&app, json!({"name": "Club night", "capacity": 1})).await;

    let (status, booking) = send(
        &app,
        post_json(
            "/api/v1/bookings",
            &json!({"event_id": event_id, "quantity": 1}),
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let Some(booking_id) = booking.get("booking_id").and_then(Value::as_str) else {
        panic!("missing booking_id in {booking}");
    };

    // Sold out: Bob cannot book but can queue.
    let (status, _) = send(
        &app,
        post_json(
            "/api/v1/bookings",
            &json!({"event_id": event_id, "quantity": 1}),
            Some(&bob),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, entry) = send(
        &app,
        post_json(
            "/api/v1/waitlist/join",
            &json!({"event_id": event_id, "quantity": 1}),
            Some(&bob),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry.get("status").and_then(Value::as_str), Some("waiting"));
    assert_eq!(
        entry.get("current_position").and_then(Value::as_u64),
        Some(1)
    );

    let (status, _) = send(
        &app,
        delete(&format!("/api/v1/bookings/{booking_id}"), Some(&alice)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, entries) = send(
        &app,
        get("/api/v1/waitlist/my-waitlist?status=notified", Some(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let Some(first) = entries.as_array().and_then(|a| a.first()) else {
        panic!("expected one notified entry, got {entries}");
    };
    assert_eq!(first.get("status").and_then(Value::as_str), Some("notified"));
    assert!(first.get("expires_at").is_some_and(|v| !v.is_null()));
}

#[tokio::test]
async fn waitlist_join_rejected_while_units_remain() {
    let app = app();
    let alice = register_user(&app, "alice@example.com").await;
    let event_id = create_event(&app, json!({"name": "Gala", "capacity": 5})).await;

    let (status, _) = send(
        &app,
        post_json(
            "/api/v1/waitlist/join",
            &json!({"event_id": event_id, "quantity": 1}),
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_broadcast_within_window_conflicts() {
    let app = app();
    register_user(&app, "alice@example.com").await;

    let broadcast = json!({
        "subject": "Doors at 8",
        "title": "Schedule change",
        "html": "<p>Doors now open at 8pm.</p>",
        "message_type": "announcement",
        "recipient_type": "all"
    });

    let (status, body) = send(
        &app,
        post_json("/api/v1/notifications/broadcast", &broadcast, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("sent").and_then(Value::as_u64), Some(1));
    assert_eq!(body.get("failed").and_then(Value::as_u64), Some(0));

    let (status, _) = send(
        &app,
        post_json("/api/v1/notifications/broadcast", &broadcast, None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, records) = send(&app, get("/api/v1/notifications/recent", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records.as_array().map(Vec::len), Some(1));
}
