use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use dormitory::auth::{self, AuthSettings};
use dormitory::db;
use dormitory::infrastructure::AppState;
use dormitory::models::enums::UserRole;
use dormitory::server;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to build the full application over an in-memory database
async fn setup_app() -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db, AuthSettings::for_tests());
    server::build_router(state, &[])
}

fn staff_token() -> String {
    auth::create_jwt(&AuthSettings::for_tests(), 1, "warden", UserRole::Admin)
        .expect("Failed to create token")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::AUTHORIZATION, format!("Bearer {}", staff_token()));
    let req = match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// Building -> floor -> room, returns the room id
async fn create_room(app: &Router, room_number: &str) -> i64 {
    let (status, building) = send(
        app,
        "POST",
        "/api/buildings",
        Some(json!({"name": "Building A", "address": "1 Campus Road", "totalFloors": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, floor) = send(
        app,
        "POST",
        "/api/floors",
        Some(json!({"floorNumber": 1, "buildingId": building["data"]["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, room) = send(
        app,
        "POST",
        "/api/rooms",
        Some(json!({
            "roomNumber": room_number,
            "floorId": floor["data"]["id"],
            "capacity": 2,
            "rentPrice": 2_000_000,
            "roomType": "Double"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(room["data"]["status"], "Available");
    room["data"]["id"].as_i64().unwrap()
}

async fn create_student(app: &Router, code: &str) -> i64 {
    let (status, student) = send(
        app,
        "POST",
        "/api/students",
        Some(json!({
            "studentCode": code,
            "fullName": "Nguyen Van An",
            "email": format!("{}@example.edu", code.to_lowercase())
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    student["data"]["id"].as_i64().unwrap()
}

fn contract_body(number: &str, room_id: i64, students: &[i64]) -> Value {
    json!({
        "contractNumber": number,
        "studentIds": students,
        "roomId": room_id,
        "startDate": "2025-01-01",
        "endDate": "2025-06-30",
        "depositAmount": 1_000_000,
        "monthlyRent": 2_000_000
    })
}

async fn room_status(app: &Router, room_id: i64) -> String {
    let (status, room) = send(app, "GET", &format!("/api/rooms/{}", room_id), None).await;
    assert_eq!(status, StatusCode::OK);
    room["data"]["status"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_room_follows_contract_lifecycle() {
    let app = setup_app().await;
    let room_id = create_room(&app, "101").await;
    let student_id = create_student(&app, "SV001").await;

    // C1 occupies the room
    let (status, c1) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-001", room_id, &[student_id])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(c1["success"], true);
    assert_eq!(c1["data"]["status"], "Active");
    assert_eq!(c1["data"]["roomNumber"], "101");
    assert_eq!(c1["data"]["students"][0]["studentCode"], "SV001");
    assert_eq!(room_status(&app, room_id).await, "Occupied");
    let c1_id = c1["data"]["id"].as_i64().unwrap();

    // C2 on the same room is rejected and nothing is persisted
    let (status, err) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-002", room_id, &[student_id])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["success"], false);
    assert_eq!(err["message"], "Room is not available");

    let (_, listing) = send(&app, "GET", "/api/contracts", None).await;
    assert_eq!(listing["pagination"]["totalCount"], 1);

    // Completing frees the room; completing again is harmless
    let uri = format!("/api/contracts/{}/complete", c1_id);
    let (status, done) = send(&app, "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["data"]["status"], "Completed");
    assert_eq!(room_status(&app, room_id).await, "Available");

    let (status, again) = send(&app, "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["data"]["status"], "Completed");
    assert_eq!(room_status(&app, room_id).await, "Available");

    // Now C2 goes through
    let (status, c2) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-002", room_id, &[student_id])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(c2["data"]["status"], "Active");
    assert_eq!(room_status(&app, room_id).await, "Occupied");
}

#[tokio::test]
async fn test_invoice_period_is_unique_per_contract() {
    let app = setup_app().await;
    let room_id = create_room(&app, "102").await;
    let student_id = create_student(&app, "SV010").await;
    let (_, contract) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-100", room_id, &[student_id])),
    )
    .await;
    let contract_id = contract["data"]["id"].as_i64().unwrap();

    let invoice = |number: &str| {
        json!({
            "invoiceNumber": number,
            "contractId": contract_id,
            "month": 1,
            "year": 2025,
            "rentAmount": 2_000_000,
            "serviceAmount": 100_000,
            "dueDate": "2025-01-10"
        })
    };

    // The total is always rent + service
    let mut first = invoice("INV-001");
    first["totalAmount"] = json!(1);
    let (status, created) = send(&app, "POST", "/api/invoices", Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["totalAmount"], 2_100_000.0);
    assert_eq!(created["data"]["status"], "Unpaid");
    let invoice_id = created["data"]["id"].as_i64().unwrap();

    // Same period, whatever the number
    let (status, err) = send(&app, "POST", "/api/invoices", Some(invoice("INV-002"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "Invoice already exists for this month/year");

    // A deleted invoice frees its period, but not its number
    let (status, _) = send(&app, "DELETE", &format!("/api/invoices/{}", invoice_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, err) = send(&app, "POST", "/api/invoices", Some(invoice("INV-001"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "Invoice number already exists");
    let (status, _) = send(&app, "POST", "/api/invoices", Some(invoice("INV-003"))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_mark_paid_stamps_payment_date() {
    let app = setup_app().await;
    let room_id = create_room(&app, "103").await;
    let student_id = create_student(&app, "SV020").await;
    let (_, contract) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-200", room_id, &[student_id])),
    )
    .await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/invoices",
        Some(json!({
            "invoiceNumber": "INV-200",
            "contractId": contract["data"]["id"],
            "month": 2,
            "year": 2025,
            "rentAmount": 2_000_000,
            "serviceAmount": 0,
            "dueDate": "2025-02-10"
        })),
    )
    .await;
    let invoice_id = created["data"]["id"].as_i64().unwrap();

    let (_, unpaid) = send(&app, "GET", "/api/invoices/unpaid", None).await;
    assert_eq!(unpaid["pagination"]["totalCount"], 1);

    let uri = format!("/api/invoices/{}/mark-paid", invoice_id);
    let (status, paid) = send(&app, "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["data"]["status"], "Paid");
    assert!(paid["data"]["paymentDate"].is_string());

    let (_, unpaid) = send(&app, "GET", "/api/invoices/unpaid", None).await;
    assert_eq!(unpaid["pagination"]["totalCount"], 0);

    // Paying is accepted whatever the current status
    let invoice_uri = format!("/api/invoices/{}", invoice_id);
    let (status, cancelled) = send(
        &app,
        "PUT",
        &invoice_uri,
        Some(json!({"status": "Cancelled"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["data"]["status"], "Cancelled");
    let (status, repaid) = send(&app, "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repaid["data"]["status"], "Paid");
    assert!(repaid["data"]["paymentDate"].is_string());

    let (status, err) = send(&app, "PUT", "/api/invoices/9999/mark-paid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Invoice not found");
}

#[tokio::test]
async fn test_cancel_and_delete_release_the_room() {
    let app = setup_app().await;
    let room_id = create_room(&app, "201").await;
    let student_id = create_student(&app, "SV030").await;

    let (_, c1) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-300", room_id, &[student_id])),
    )
    .await;
    let c1_id = c1["data"]["id"].as_i64().unwrap();

    let (status, cancelled) = send(
        &app,
        "PUT",
        &format!("/api/contracts/{}/cancel", c1_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["data"]["status"], "Cancelled");
    assert_eq!(room_status(&app, room_id).await, "Available");

    // Terminal contracts do not reopen
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/contracts/{}/complete", c1_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, c2) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-301", room_id, &[student_id])),
    )
    .await;
    let c2_id = c2["data"]["id"].as_i64().unwrap();
    assert_eq!(room_status(&app, room_id).await, "Occupied");

    // The room and the student are pinned while the lease is active
    let (status, _) = send(&app, "DELETE", &format!("/api/rooms/{}", room_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/students/{}", student_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "DELETE", &format!("/api/contracts/{}", c2_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contract deleted successfully");
    assert_eq!(room_status(&app, room_id).await, "Available");

    let (status, _) = send(&app, "GET", &format!("/api/contracts/{}", c2_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contract_input_rules() {
    let app = setup_app().await;
    let room_id = create_room(&app, "202").await;
    let student_id = create_student(&app, "SV040").await;

    // End before start
    let mut body = contract_body("HD-400", room_id, &[student_id]);
    body["endDate"] = json!("2024-12-31");
    let (status, err) = send(&app, "POST", "/api/contracts", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Start date must be before end date");

    // No students
    let (status, err) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-401", room_id, &[])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["errors"]["studentIds"].is_array());

    // Missing room
    let (status, err) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-402", 9_999, &[student_id])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["message"], "Room not found");

    // Missing student
    let (status, _) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-403", room_id, &[student_id, 9_999])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(room_status(&app, room_id).await, "Available");

    // Duplicate students collapse into one join row
    let (status, contract) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-404", room_id, &[student_id, student_id])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(contract["data"]["students"].as_array().unwrap().len(), 1);

    // Contract numbers are unique
    let other_room = create_room(&app, "203").await;
    let (status, err) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-404", other_room, &[student_id])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "Contract number already exists");
}

#[tokio::test]
async fn test_room_occupancy_cannot_be_set_by_hand() {
    let app = setup_app().await;
    let room_id = create_room(&app, "301").await;

    let (status, err) = send(
        &app,
        "PUT",
        &format!("/api/rooms/{}", room_id),
        Some(json!({"status": "Occupied"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "Room occupancy is managed by contracts");

    let (status, room) = send(
        &app,
        "PUT",
        &format!("/api/rooms/{}", room_id),
        Some(json!({"status": "Maintenance"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["data"]["status"], "Maintenance");

    // A room under maintenance cannot be leased
    let student_id = create_student(&app, "SV050").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/contracts",
        Some(contract_body("HD-500", room_id, &[student_id])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
