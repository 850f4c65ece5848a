use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use autsai_db::{Database, Storage};

use crate::auth::{AppState, AppStateInner};
use crate::router;

struct TestApp {
    state: AppState,
    app: Router,
    token: String,
    user_id: String,
}

impl TestApp {
    async fn start() -> Self {
        let dir = std::env::temp_dir().join(format!("autsai-api-{}", Uuid::new_v4()));
        let storage = Storage::new(dir, "http://localhost:3000").await.unwrap();
        let db = Database::open_in_memory().unwrap();
        let state: AppState = Arc::new(AppStateInner::new(
            Arc::new(db),
            Arc::new(storage),
            "test-secret".into(),
            Duration::from_secs(30),
        ));
        let app = router(state.clone());

        let (status, body) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({"email": "Carlos@SportsClub.com", "password": "correct horse"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        Self {
            state,
            app,
            token: body["token"].as_str().unwrap().to_string(),
            user_id: body["user_id"].as_str().unwrap().to_string(),
        }
    }

    async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.app, method, uri, Some(&self.token), body).await
    }

    fn seed(&self, collection: &str, body: Value) {
        let id = body["id"].as_str().unwrap().to_string();
        self.state.db.insert_document(collection, &id, &body).unwrap();
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn auth_flow() {
    let test = TestApp::start().await;

    let (status, body) = send(&test.app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = send(&test.app, "GET", "/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = test.call("GET", "/auth/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "carlos@sportsclub.com");
    assert_eq!(body["id"], test.user_id.as_str());

    let (status, _) = send(
        &test.app,
        "POST",
        "/auth/register",
        None,
        Some(json!({"email": "carlos@sportsclub.com", "password": "another one"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &test.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": "carlos@sportsclub.com", "password": "wrong password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &test.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"email": "carlos@sportsclub.com", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, _) = test.call("POST", "/auth/logout", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(test.state.sessions.count().await, 0);
}

#[tokio::test]
async fn shell_resolves_unknown_tabs() {
    let test = TestApp::start().await;

    let (_, body) = test.call("GET", "/shell", None).await;
    assert_eq!(body["gate"], "ready");
    assert_eq!(body["active_tab"], "dashboard");

    let (_, body) = test.call("PUT", "/shell/tab", Some(json!({"tab": "instructors"}))).await;
    assert_eq!(body["active_tab"], "instructors");
    assert_eq!(body["placeholder"]["title"], "Instructors");

    let (_, body) = test.call("PUT", "/shell/tab", Some(json!({"tab": "reports"}))).await;
    assert_eq!(body["active_tab"], "dashboard");
}

#[tokio::test]
async fn booking_status_round_trip() {
    let test = TestApp::start().await;
    test.seed(
        "bookings",
        json!({"id": "bk_1", "user_id": test.user_id, "facility_id": "fac_1", "sport": "padel",
               "participants": "[\"Team Alpha\"]", "start_time": "2031-03-01T10:00:00",
               "end_time": "2031-03-01T11:30:00", "status": "pending", "price": 40,
               "created_at": "2031-01-01T10:00:00", "updated_at": "2031-01-01T10:00:00"}),
    );

    let (status, body) = test.call("GET", "/bookings?view=all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "remote");
    assert_eq!(body["stats"]["pending"], 1);

    let (status, body) = test
        .call("PUT", "/bookings/bk_1/status", Some(json!({"status": "confirmed"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);
    assert_eq!(body["view"]["bookings"][0]["status"], "confirmed");

    let stored = test.state.db.get_document("bookings", "bk_1").unwrap().unwrap();
    assert_eq!(stored.body["status"], "confirmed");
    assert_ne!(stored.body["updated_at"], "2031-01-01T10:00:00");

    let (status, _) = test
        .call("PUT", "/bookings/bk_404/status", Some(json!({"status": "confirmed"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partners_are_isolated_from_each_other() {
    let test = TestApp::start().await;
    let (status, other) = send(
        &test.app,
        "POST",
        "/auth/register",
        None,
        Some(json!({"email": "lucia@padelsur.es", "password": "another horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let other_token = other["token"].as_str().unwrap().to_string();
    let other_id = other["user_id"].as_str().unwrap().to_string();

    test.seed(
        "bookings",
        json!({"id": "bk_other", "user_id": other_id, "facility_id": "fac_2", "sport": "tennis",
               "participants": "[]", "start_time": "2031-03-01T10:00:00",
               "end_time": "2031-03-01T11:00:00", "status": "pending", "price": 25,
               "created_at": "2031-01-01T10:00:00", "updated_at": "2031-01-01T10:00:00"}),
    );
    test.seed(
        "notifications",
        json!({"id": "n_other", "user_id": other_id, "type": "new_booking", "title": "New Booking",
               "is_read": 0, "created_at": "2031-01-01T10:00:00"}),
    );

    let (status, body) = test.call("GET", "/bookings?view=all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["bookings"]
            .as_array()
            .unwrap()
            .iter()
            .all(|b| b["id"] != "bk_other")
    );

    let (status, _) = test
        .call("PUT", "/bookings/bk_other/status", Some(json!({"status": "canceled"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = test.call("PUT", "/notifications/n_other/read", None).await;
    assert_eq!(body["applied"], false);

    let stored = test.state.db.get_document("bookings", "bk_other").unwrap().unwrap();
    assert_eq!(stored.body["status"], "pending");
    let stored = test.state.db.get_document("notifications", "n_other").unwrap().unwrap();
    assert_eq!(stored.body["is_read"], 0);

    let (status, body) = send(&test.app, "GET", "/bookings?view=all", Some(&other_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings"][0]["id"], "bk_other");
}

#[tokio::test]
async fn photo_upload_is_served_back() {
    let test = TestApp::start().await;
    test.seed(
        "facilities",
        json!({"id": "fac_1", "user_id": test.user_id, "name": "Club Norte",
               "created_at": "2025-01-01T00:00:00"}),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/facilities/fac_1/photos?file_name=court.png&sport_type=padel")
        .header(header::AUTHORIZATION, format!("Bearer {}", test.token))
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(vec![0x89, b'P', b'N', b'G']))
        .unwrap();
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["applied"], true);
    let photo = &body["view"]["photos"][0];
    assert_eq!(photo["is_primary"], 1);
    assert_eq!(
        photo["photo_url"],
        "http://localhost:3000/files/facilities/fac_1/court.png"
    );

    let request = Request::builder()
        .uri("/files/facilities/fac_1/court.png")
        .body(Body::empty())
        .unwrap();
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], &[0x89, b'P', b'N', b'G']);

    let (status, _) = test.call("GET", "/facilities?selected=fac_999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_sections_save_through_drafts() {
    let test = TestApp::start().await;
    test.seed(
        "partner_profiles",
        json!({"id": "pp_1", "user_id": test.user_id, "full_name": "Carlos Rodriguez",
               "terms_accepted": 0}),
    );

    let (status, body) = test
        .call("PUT", "/profile/legal", Some(json!({"terms_accepted": true})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);
    assert_eq!(body["view"]["editing"], false);
    assert!(body["view"]["partner"]["terms_accepted_at"].is_string());

    let stored = test.state.db.get_document("partner_profiles", "pp_1").unwrap().unwrap();
    assert_eq!(stored.body["terms_accepted"], 1);

    // no payout record: the sample stands in and its id is unknown to the store
    let (status, body) = test
        .call("PUT", "/profile/payout", Some(json!({"bank_name": "Santander"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);
    assert_eq!(body["view"]["payout"]["bank_name"], "BBVA España");

    let (status, _) = test.call("PUT", "/profile/billing", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notification_settings_reject_unknown_keys() {
    let test = TestApp::start().await;
    test.seed(
        "notification_settings",
        json!({"id": "ns_1", "user_id": test.user_id, "email_enabled": 1, "sms_enabled": 0}),
    );

    let (status, body) = test
        .call("PUT", "/notifications/settings", Some(json!({"key": "sms_enabled", "enabled": true})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);
    assert_eq!(body["view"]["settings"]["sms_enabled"], 1);

    let (status, _) = test
        .call("PUT", "/notifications/settings", Some(json!({"key": "fax_enabled", "enabled": true})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = test.call("GET", "/notifications/bell", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["unread_count"].is_number());
}
