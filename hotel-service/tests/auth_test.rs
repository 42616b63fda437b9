//! Authentication, authorization and request validation. None of these reach the database.

mod common;

use axum::http::{Method, StatusCode};
use common::{spawn_app_without_db, ROOT_EMAIL, ROOT_PASSWORD};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn back_office_routes_require_a_token() {
    let app = spawn_app_without_db();

    for uri in ["/api/customers", "/api/reservations", "/api/invoices", "/api/stats", "/api/auth/me"] {
        let (status, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} -> {}", uri, body);
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = spawn_app_without_db();

    let (status, _) = app
        .send(Method::GET, "/api/auth/me", Some("not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Also on public routes: a bad token is an error, not an anonymous visit
    let (status, _) = app
        .send(Method::GET, "/api/rooms", Some("not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_caller_claims() {
    let app = spawn_app_without_db();
    let agent_id = Uuid::new_v4();
    let token = app.agent_token(agent_id);

    let (status, body) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "agent");
    assert_eq!(body["sub"], agent_id.to_string());
}

#[tokio::test]
async fn agents_cannot_use_root_operations() {
    let app = spawn_app_without_db();
    let token = app.agent_token(Uuid::new_v4());

    let (status, _) = app
        .send(
            Method::POST,
            "/api/rooms",
            Some(&token),
            Some(json!({"number": "101", "room_type": "single", "capacity": 1, "price": "80.00"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, "/api/agents", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, "/api/contacts", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn anonymous_visitors_cannot_manage_content() {
    let app = spawn_app_without_db();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/faqs",
            None,
            Some(json!({"question": "Breakfast?", "answer": "7-10am"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/blogs/{}", Uuid::new_v4()), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn root_login_issues_a_root_token() {
    let app = spawn_app_without_db();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": ROOT_EMAIL, "password": ROOT_PASSWORD})),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["role"], "root");

    let token = body["access_token"].as_str().expect("access_token");
    let (status, me) = app.send(Method::GET, "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "root");
}

#[tokio::test]
async fn root_login_with_wrong_password_fails() {
    let app = spawn_app_without_db();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": ROOT_EMAIL, "password": "wrong-password"})),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn malformed_login_is_a_validation_error() {
    let app = spawn_app_without_db();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "not-an-email", "password": ""})),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation error");
}

#[tokio::test]
async fn empty_stay_is_rejected_before_touching_the_database() {
    let app = spawn_app_without_db();
    let token = app.root_token();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/reservations",
            Some(&token),
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "room_id": Uuid::new_v4(),
                "check_in": "2026-08-10",
                "check_out": "2026-08-10",
                "amount": "100.00"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn out_of_range_discount_is_rejected() {
    let app = spawn_app_without_db();
    let token = app.root_token();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/reservations",
            Some(&token),
            Some(json!({
                "customer_id": Uuid::new_v4(),
                "room_id": Uuid::new_v4(),
                "check_in": "2026-08-10",
                "check_out": "2026-08-12",
                "discount": "120"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn money_beyond_storage_is_rejected() {
    let app = spawn_app_without_db();
    let token = app.root_token();

    let cases = [
        json!({"amount": "100000000000"}),
        json!({"tva": "1000"}),
        json!({"discount": "10.555"}),
        json!({"amount": "250.005"}),
        json!({"tva": "19.999"}),
        // Each field fits, the total does not
        json!({"amount": "9999999999.99", "tva": "999.99"}),
    ];

    for money in cases {
        let mut body = json!({
            "customer_id": Uuid::new_v4(),
            "room_id": Uuid::new_v4(),
            "check_in": "2026-08-10",
            "check_out": "2026-08-12"
        });
        for (key, value) in money.as_object().unwrap() {
            body[key] = value.clone();
        }

        let (status, response) = app
            .send(Method::POST, "/api/reservations", Some(&token), Some(body))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{} -> {}", money, response);
    }
}

#[tokio::test]
async fn oversized_room_price_is_a_validation_error() {
    let app = spawn_app_without_db();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/rooms",
            Some(&app.root_token()),
            Some(json!({
                "number": "999",
                "room_type": "suite",
                "capacity": 2,
                "price": "10000000000"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn empty_batches_and_bad_pages_are_validation_errors() {
    let app = spawn_app_without_db();
    let token = app.root_token();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/invoices/cancel",
            Some(&token),
            Some(json!({"ids": []})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(Method::GET, "/api/reservations?page_size=500", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(Method::GET, "/api/faqs?page=0", None, None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = spawn_app_without_db();

    let response = {
        use axum::body::Body;
        use axum::http::Request;
        use tower::util::ServiceExt;

        app.router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/me")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    };

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}
