//! Integration tests for the public event listings and the authenticated
//! event mutations.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use bulletin::{
    repositories::{EventRepository, SessionRepository, UserRepository},
    routes::create_router,
    state::AppState,
};
use common::database::{DatabaseConfig, init_pool, run_migrations};

async fn setup() -> (Router, AppState) {
    let config = DatabaseConfig {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let pool = init_pool(&config).await.expect("failed to create pool");
    run_migrations(&pool).await.expect("failed to apply schema");

    let state = AppState {
        db_pool: pool.clone(),
        user_repository: UserRepository::new(pool.clone()),
        session_repository: SessionRepository::new(pool.clone()),
        event_repository: EventRepository::new(pool),
    };

    (create_router(state.clone()), state)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers alice and logs her in; returns (token, user id).
async fn register_and_login(app: &Router) -> (String, i64) {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(&json!({
                "fullName": "Alice A",
                "email": "a@x.com",
                "username": "alice",
                "password": "secret1"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(&json!({ "username": "alice", "password": "secret1" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login = body_json(response).await;

    (
        login["token"].as_str().unwrap().to_string(),
        login["user"]["id"].as_i64().unwrap(),
    )
}

fn quiz_event() -> Value {
    json!({
        "title": "Quiz",
        "description": "Ch.1",
        "date": "2025-09-01",
        "time": "09:00",
        "type": "assignment"
    })
}

#[tokio::test]
async fn test_mutations_require_bearer_token() {
    let (app, _state) = setup().await;

    // No header at all.
    let response = app
        .clone()
        .oneshot(request("POST", "/api/events", None, Some(&quiz_event())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Header without the Bearer shape.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/events")
                .method("POST")
                .header(header::AUTHORIZATION, "Token abc")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(quiz_event().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Well-shaped but unknown token.
    let unknown_token = "0".repeat(64);
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/events",
            Some(unknown_token.as_str()),
            Some(&quiz_event()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_with_creator_username() {
    let (app, _state) = setup().await;
    let (token, user_id) = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/events",
            Some(token.as_str()),
            Some(&quiz_event()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["title"], "Quiz");
    assert_eq!(created["type"], "assignment");
    assert_eq!(created["created_by"].as_i64().unwrap(), user_id);

    // Listing is public and joins the creator's username.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/events", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_json(response).await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["created_by_username"], "alice");
    assert_eq!(events[0]["date"], "2025-09-01");
    assert_eq!(events[0]["time"], "09:00");
}

#[tokio::test]
async fn test_events_ordered_by_date_then_time() {
    let (app, _state) = setup().await;
    let (token, _) = register_and_login(&app).await;

    for (title, date, time) in [
        ("Later day", "2025-09-02", "08:00"),
        ("Same day, afternoon", "2025-09-01", "14:00"),
        ("Same day, morning", "2025-09-01", "09:00"),
    ] {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/events",
                Some(token.as_str()),
                Some(&json!({
                    "title": title,
                    "description": "",
                    "date": date,
                    "time": time,
                    "type": "workshop"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(request("GET", "/api/events", None, None))
        .await
        .unwrap();
    let events = body_json(response).await;
    let titles: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();

    assert_eq!(
        titles,
        vec!["Same day, morning", "Same day, afternoon", "Later day"]
    );
}

#[tokio::test]
async fn test_list_by_type_filters_and_unknown_type_is_empty() {
    let (app, _state) = setup().await;
    let (token, _) = register_and_login(&app).await;

    for (title, event_type) in [("Quiz", "assignment"), ("Intro call", "webinar")] {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/events",
                Some(token.as_str()),
                Some(&json!({
                    "title": title,
                    "description": "",
                    "date": "2025-09-01",
                    "time": "09:00",
                    "type": event_type
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(request("GET", "/api/events/type/webinar", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_json(response).await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Intro call");

    // An unknown type is an empty listing, not an error.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/events/type/party", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_json(response).await;
    assert_eq!(events.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_rejects_unknown_type() {
    let (app, _state) = setup().await;
    let (token, _) = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/events",
            Some(token.as_str()),
            Some(&json!({
                "title": "Party",
                "description": "",
                "date": "2025-09-01",
                "time": "20:00",
                "type": "party"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_overwrites_fields_and_leaves_others_untouched() {
    let (app, _state) = setup().await;
    let (token, _) = register_and_login(&app).await;

    let mut ids = Vec::new();
    for title in ["First", "Second"] {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/events",
                Some(token.as_str()),
                Some(&json!({
                    "title": title,
                    "description": "",
                    "date": "2025-09-01",
                    "time": "09:00",
                    "type": "assignment"
                })),
            ))
            .await
            .unwrap();
        let created = body_json(response).await;
        ids.push(created["id"].as_i64().unwrap());
    }

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/events/{}", ids[0]),
            Some(token.as_str()),
            Some(&json!({
                "title": "First, rescheduled",
                "description": "Moved to the afternoon",
                "date": "2025-09-03",
                "time": "15:30",
                "type": "workshop"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "First, rescheduled");
    assert_eq!(updated["date"], "2025-09-03");
    assert_eq!(updated["time"], "15:30");
    assert_eq!(updated["type"], "workshop");

    // The other row is untouched.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/events/type/assignment", None, None))
        .await
        .unwrap();
    let events = body_json(response).await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"].as_i64().unwrap(), ids[1]);
    assert_eq!(events[0]["title"], "Second");
}

#[tokio::test]
async fn test_update_and_delete_missing_event_is_not_found() {
    let (app, _state) = setup().await;
    let (token, _) = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/events/9999",
            Some(token.as_str()),
            Some(&quiz_event()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/events/9999", Some(token.as_str()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_with_expired_then_fresh_token() {
    let (app, state) = setup().await;
    let (token, _) = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/events",
            Some(token.as_str()),
            Some(&quiz_event()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let event_id = created["id"].as_i64().unwrap();

    // Age the session past its expiry.
    sqlx::query("UPDATE sessions SET expires_at = ? WHERE token = ?")
        .bind(Utc::now() - Duration::hours(1))
        .bind(&token)
        .execute(&state.db_pool)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/events/{}", event_id),
            Some(token.as_str()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A fresh login mints a working token.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(&json!({ "username": "alice", "password": "secret1" })),
        ))
        .await
        .unwrap();
    let fresh = body_json(response).await;
    let fresh_token = fresh["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/events/{}", event_id),
            Some(fresh_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/events", None, None))
        .await
        .unwrap();
    let events = body_json(response).await;
    assert_eq!(events.as_array().unwrap().len(), 0);
}
