use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};
use tokio::time::{timeout, Duration};
use tower::ServiceExt;
use uuid::Uuid;
use vendor_hub_backend::services::verification_service::{DocumentUpload, VerificationSubmission};

/// Letters-only marker so names pass validation and searches stay unique per run.
fn tag() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                (b'g' + (c as u8 - b'0')) as char
            } else {
                c
            }
        })
        .take(12)
        .collect()
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null))
}

fn decimal(value: &JsonValue) -> Decimal {
    value
        .as_str()
        .map(|s| s.parse().expect("decimal string"))
        .or_else(|| value.as_f64().map(|f| Decimal::try_from(f).expect("decimal")))
        .expect("decimal field")
}

async fn register(app: &Router, email: &str, name: &str, business: &str, services: &str) -> (Uuid, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "full_name": name,
            "mobile": "9876543210",
            "business": business,
            "experience_level": "",
            "services": services,
            "location": "Koregaon Park",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411001",
            "password": "correct-horse-battery"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    assert_eq!(body["vendor"]["experience_level"], "Beginner");
    let id = body["vendor"]["id"].as_str().unwrap().parse().unwrap();
    (id, body["access"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn vendor_marketplace_end_to_end() {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping end-to-end test");
        return;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("AUTH_RPS", "1000");
    env::set_var("API_RPS", "1000");
    env::set_var("UPLOADS_DIR", env::temp_dir().join("vendor-hub-uploads").to_string_lossy().to_string());

    vendor_hub_backend::config::init_config().expect("init config");
    let pool = vendor_hub_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    let state = vendor_hub_backend::AppState::new(pool.clone());
    let app = vendor_hub_backend::routes::router(state.clone());

    let marker = tag();
    let email_a = format!("asha.{}@example.com", marker);
    let services = format!("{m} Shoot, {m} Albums, {m} Prints, {m} Shoot", m = marker);
    let (a_id, a_token) = register(&app, &email_a, &format!("Asha {}", marker), "Photography", &services).await;
    let (b_id, b_token) = register(
        &app,
        &format!("bala.{}@example.com", marker),
        "Bala Krishnan",
        "Catering",
        "",
    )
    .await;

    // Duplicate email, differently cased.
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": email_a.to_uppercase(),
            "full_name": "Someone Else",
            "mobile": "9123456780",
            "business": "Florist",
            "password": "another-password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = $1")
        .bind(&email_a)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(accounts, 1);

    // Duplicate service names were collapsed at registration.
    let (status, profile) = call(&app, Method::GET, "/api/auth/profile", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["services"].as_array().unwrap().len(), 3);
    assert_eq!(profile["is_verified"], false);

    // Catalog: per-vendor unique names.
    for (name, price) in [("Budget Package", "5000"), ("Premium Package", "20000")] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/services",
            Some(&a_token),
            Some(json!({ "service_name": name, "service_price": price })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["category"], "Photography");
    }
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/services",
        Some(&a_token),
        Some(json!({ "service_name": "Budget Package" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/services",
        Some(&b_token),
        Some(json!({ "service_name": "Budget Package" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Discovery: one row per vendor, OR across service prices.
    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/vendors?search={}", marker),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["id"], a_id.to_string());

    let (_, body) = call(
        &app,
        Method::GET,
        &format!("/api/vendors?search={}&price_range=under_10000&limit=5", marker),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (_, body) = call(
        &app,
        Method::GET,
        &format!("/api/vendors?search={}&price_range=above_50000", marker),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(body["total"], 0);

    let (_, body) = call(
        &app,
        Method::GET,
        &format!("/api/vendors?search={}", marker),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(body["total"], 0, "callers never see themselves");

    // Chat with read state. B's socket for (A, B) gets the frame; B's socket
    // for an unrelated pair does not.
    let mut b_with_a = state.chat_service.subscribe(b_id, a_id);
    let mut b_with_other = state.chat_service.subscribe(b_id, Uuid::new_v4());
    let (status, sent) = call(
        &app,
        Method::POST,
        &format!("/api/chat/messages/{}", b_id),
        Some(&a_token),
        Some(json!({ "message": "  Are you free on the 14th?  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["message"], "Are you free on the 14th?");
    assert_eq!(sent["is_read"], false);

    let frame = timeout(Duration::from_secs(2), b_with_a.recv())
        .await
        .expect("frame delivered")
        .expect("group open");
    assert_eq!(frame.message, "Are you free on the 14th?");
    assert_eq!((frame.sender_id, frame.receiver_id), (a_id, b_id));
    let mut unrelated = tokio_test::task::spawn(b_with_other.recv());
    tokio_test::assert_pending!(unrelated.poll());
    drop(unrelated);

    let (_, history) = call(
        &app,
        Method::GET,
        &format!("/api/chat/messages/{}", a_id),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["is_read"], false);

    let read_uri = format!("/api/chat/messages/{}/read", a_id);
    let (status, body) = call(&app, Method::PUT, &read_uri, Some(&b_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);
    let (status, body) = call(&app, Method::PUT, &read_uri, Some(&b_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 0);

    let (_, history) = call(
        &app,
        Method::GET,
        &format!("/api/chat/messages/{}", a_id),
        Some(&b_token),
        None,
    )
    .await;
    assert_eq!(history[0]["is_read"], true);

    let (_, contacts) = call(&app, Method::GET, "/api/chat/vendors", Some(&a_token), None).await;
    let b_contact = contacts
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == b_id.to_string())
        .expect("counterparty listed");
    assert_eq!(b_contact["last_message"], "Are you free on the 14th?");
    assert_eq!(b_contact["unread_count"], 0);

    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/api/chat/messages/{}", Uuid::new_v4()),
        Some(&a_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bookings and dashboard stats.
    let mut booking_ids = Vec::new();
    for (amount, status) in [("15000", "completed"), ("5000", "completed"), ("1000", "pending")] {
        let (code, body) = call(
            &app,
            Method::POST,
            "/api/bookings",
            Some(&a_token),
            Some(json!({
                "customer_name": "Meera Iyer",
                "service_type": "Wedding Shoot",
                "event_date": "2030-02-14",
                "amount": amount,
                "status": status,
                "location": "Pune"
            })),
        )
        .await;
        assert_eq!(code, StatusCode::CREATED, "{}", body);
        booking_ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&a_token),
        Some(json!({
            "customer_name": "Meera Iyer",
            "service_type": "Wedding Shoot",
            "event_date": "2030-02-14",
            "amount": "1000000000",
            "location": "Pune"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert!(body["error"].is_string());

    let (_, stats) = call(&app, Method::GET, "/api/dashboard/stats", Some(&a_token), None).await;
    assert_eq!(stats["total_bookings"], 3);
    assert_eq!(stats["completed_bookings"], 2);
    assert_eq!(stats["pending_bookings"], 1);
    assert_eq!(decimal(&stats["total_revenue"]), Decimal::from(20_000));
    assert_eq!(decimal(&stats["monthly_revenue"]), decimal(&stats["total_revenue"]));

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/api/bookings/{}/status", booking_ids[2]),
        Some(&b_token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/api/bookings/{}/status", booking_ids[2]),
        Some(&a_token),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_progress");

    // Calendar events may only link the owner's bookings.
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/calendar/events",
        Some(&b_token),
        Some(json!({
            "title": "Tasting",
            "event_date": "2030-02-10T10:00:00Z",
            "booking_id": booking_ids[0]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/calendar/events",
        Some(&a_token),
        Some(json!({
            "title": "Wedding day",
            "event_date": "2030-02-14T09:00:00Z",
            "booking_id": booking_ids[0]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Two simultaneous first submissions: one creates, the other updates.
    let submission = || VerificationSubmission {
        identity_document: Some(DocumentUpload {
            file_name: "identity.pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4 identity"),
        }),
        tax_document: Some(DocumentUpload {
            file_name: "tax.png".to_string(),
            data: Bytes::from_static(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
        }),
        address: Some("12 MG Road, Pune".to_string()),
    };
    let (first, second) = tokio::join!(
        state.verification_service.submit(b_id, submission()),
        state.verification_service.submit(b_id, submission()),
    );
    let (first, first_created) = first.expect("first submission");
    let (second, second_created) = second.expect("second submission");
    assert_ne!(first_created, second_created);
    assert_eq!(first.id, second.id);
    assert!(second.is_verified);

    let (status, _) = call(&app, Method::POST, "/api/auth/logout", Some(&a_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let online: bool = sqlx::query_scalar("SELECT is_online FROM accounts WHERE id = $1")
        .bind(a_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!online);
}
