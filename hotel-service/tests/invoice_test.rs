//! Invoice validation/cancellation keeps reservations in step (`TEST_DATABASE_URL`).

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal_of, spawn_app, uuid_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use serial_test::serial;
use uuid::Uuid;

/// Books `nights` starting July 1st + `offset` days; returns the reservation details.
async fn booked(app: &TestApp, room: &str, offset: u32) -> Value {
    let room_id = uuid_of(&app.create_room(room, "100.00").await, "room_id");
    let customer_id = uuid_of(
        &app.create_customer(&format!("guest-{}@hotel.test", room)).await,
        "customer_id",
    );

    let (status, body) = app
        .send(
            Method::POST,
            "/api/reservations",
            Some(&app.root_token()),
            Some(json!({
                "customer_id": customer_id,
                "room_id": room_id,
                "check_in": format!("2026-07-{:02}", 1 + offset),
                "check_out": format!("2026-07-{:02}", 3 + offset),
                "tva": "10"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

async fn reservation(app: &TestApp, reservation_id: Uuid) -> Value {
    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/reservations/{}", reservation_id),
            Some(&app.root_token()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
#[serial]
async fn validating_invoices_records_payments_and_pays_reservations() {
    let Some(app) = spawn_app().await else { return };
    let token = app.root_token();
    let first = booked(&app, "101", 0).await;
    let second = booked(&app, "102", 0).await;
    let ids = [uuid_of(&first, "invoice_id"), uuid_of(&second, "invoice_id")];

    let (status, body) = app
        .send(
            Method::POST,
            "/api/invoices/validate",
            Some(&token),
            Some(json!({"ids": ids, "mode": "card", "note": "checkout desk"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let invoices = body.as_array().unwrap();
    assert_eq!(invoices.len(), 2);
    assert!(invoices.iter().all(|i| i["status"] == "paid"));

    for details in [&first, &second] {
        let current = reservation(&app, uuid_of(details, "reservation_id")).await;
        assert_eq!(current["status"], "paid");
        assert_eq!(current["invoice_status"], "paid");
    }

    let (status, invoice) = app
        .send(Method::GET, &format!("/api/invoices/{}", ids[0]), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let payments = invoice["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["mode"], "card");
    assert_eq!(payments[0]["note"], "checkout desk");
    // 2 nights × 100 × 1.10
    assert_eq!(decimal_of(&payments[0], "amount"), dec!(220.00));

    let (_, listed) = app
        .send(
            Method::GET,
            &format!("/api/payments?invoice_id={}", ids[1]),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn paid_invoices_cannot_move_again() {
    let Some(app) = spawn_app().await else { return };
    let token = app.root_token();
    let details = booked(&app, "101", 0).await;
    let invoice_id = uuid_of(&details, "invoice_id");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/invoices/validate",
            Some(&token),
            Some(json!({"ids": [invoice_id], "mode": "cash"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/invoices/validate",
            Some(&token),
            Some(json!({"ids": [invoice_id], "mode": "cash"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/invoices/cancel",
            Some(&token),
            Some(json!({"ids": [invoice_id]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A paid reservation can no longer be canceled either
    let (status, _) = app
        .send(
            Method::POST,
            "/api/reservations/cancel",
            Some(&token),
            Some(json!({"ids": [uuid_of(&details, "reservation_id")]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn batch_with_unknown_id_changes_nothing() {
    let Some(app) = spawn_app().await else { return };
    let details = booked(&app, "101", 0).await;
    let invoice_id = uuid_of(&details, "invoice_id");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/invoices/validate",
            Some(&app.root_token()),
            Some(json!({"ids": [invoice_id, Uuid::new_v4()], "mode": "transfer"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let current = reservation(&app, uuid_of(&details, "reservation_id")).await;
    assert_eq!(current["status"], "confirmed");
    assert_eq!(current["invoice_status"], "pending");

    let payments = app.db().list_payments(Some(invoice_id), 10, 0).await.unwrap();
    assert!(payments.is_empty());
}

#[tokio::test]
#[serial]
async fn batch_with_one_settled_invoice_is_rejected_whole() {
    let Some(app) = spawn_app().await else { return };
    let token = app.root_token();
    let open = booked(&app, "101", 0).await;
    let settled = booked(&app, "102", 0).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/invoices/cancel",
            Some(&token),
            Some(json!({"ids": [uuid_of(&settled, "invoice_id")]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/invoices/validate",
            Some(&token),
            Some(json!({
                "ids": [uuid_of(&open, "invoice_id"), uuid_of(&settled, "invoice_id")],
                "mode": "cash"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let current = reservation(&app, uuid_of(&open, "reservation_id")).await;
    assert_eq!(current["invoice_status"], "pending");
}

#[tokio::test]
#[serial]
async fn canceling_an_invoice_cancels_its_reservation() {
    let Some(app) = spawn_app().await else { return };
    let details = booked(&app, "101", 0).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/invoices/cancel",
            Some(&app.root_token()),
            Some(json!({"ids": [uuid_of(&details, "invoice_id")]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body[0]["status"], "canceled");

    let current = reservation(&app, uuid_of(&details, "reservation_id")).await;
    assert_eq!(current["status"], "canceled");
}

#[tokio::test]
#[serial]
async fn paid_reservation_finishes_and_frees_the_room() {
    let Some(app) = spawn_app().await else { return };
    let token = app.root_token();
    let details = booked(&app, "101", 0).await;
    let reservation_id = uuid_of(&details, "reservation_id");

    app.send(
        Method::POST,
        "/api/invoices/validate",
        Some(&token),
        Some(json!({"ids": [uuid_of(&details, "invoice_id")], "mode": "cheque"})),
    )
    .await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/reservations/{}/finish", reservation_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "finished");

    // Same dates are bookable again
    let (status, _) = app
        .send(
            Method::POST,
            "/api/reservations",
            Some(&token),
            Some(json!({
                "customer_id": details["customer_id"],
                "room_id": details["room_id"],
                "check_in": "2026-07-01",
                "check_out": "2026-07-03"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
#[serial]
async fn stats_reflect_the_workflow() {
    let Some(app) = spawn_app().await else { return };
    let token = app.root_token();
    let paid = booked(&app, "101", 0).await;
    let _open = booked(&app, "102", 0).await;

    app.send(
        Method::POST,
        "/api/invoices/validate",
        Some(&token),
        Some(json!({"ids": [uuid_of(&paid, "invoice_id")], "mode": "cash"})),
    )
    .await;

    let stats = app
        .db()
        .hotel_stats("2026-07-02".parse().unwrap())
        .await
        .unwrap();

    assert_eq!(stats.rooms, 2);
    assert_eq!(stats.customers, 2);
    assert_eq!(stats.occupied_rooms_today, 2);
    assert_eq!(stats.revenue, dec!(220.00));

    let paid_count = stats
        .reservations_by_status
        .iter()
        .find(|s| s.status == "paid")
        .map(|s| s.count);
    assert_eq!(paid_count, Some(1));

    let (status, body) = app.send(Method::GET, "/api/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rooms"], 2);
}
