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
use dormitory::services::user_service;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test app plus a handle on its database
async fn setup_test_app() -> (Router, DatabaseConnection) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db.clone(), AuthSettings::for_tests());
    (server::build_router(state, &[]), db)
}

fn token_for(role: UserRole) -> String {
    auth::create_jwt(&AuthSettings::for_tests(), 1, "tester", role).expect("Failed to create token")
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
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
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = setup_test_app().await;
    let (status, body) = call(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "dormitory");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let (app, _) = setup_test_app().await;

    let (status, body) = call(&app, "GET", "/api/buildings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, "GET", "/api/buildings", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_roles_gate_mutations() {
    let (app, _) = setup_test_app().await;
    let student = token_for(UserRole::Student);
    let staff = token_for(UserRole::Staff);
    let building = json!({"name": "Building B", "address": "2 Campus Road", "totalFloors": 4});

    let (status, body) = call(&app, "POST", "/api/buildings", Some(&student), Some(building.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    // Staff manage students and contracts, not the building structure
    let (status, _) = call(&app, "POST", "/api/buildings", Some(&staff), Some(building)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, "GET", "/api/users", Some(&staff), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, "GET", "/api/buildings", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bad_pagination_is_rejected() {
    let (app, _) = setup_test_app().await;
    let token = token_for(UserRole::Admin);

    for uri in [
        "/api/buildings?pageNumber=0",
        "/api/rooms?pageSize=0",
        "/api/invoices?pageNumber=-1&pageSize=10",
    ] {
        let (status, body) = call(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(
            body["message"],
            "Page number and page size must be greater than 0"
        );
    }
}

#[tokio::test]
async fn test_extreme_page_coordinates() {
    let (app, _) = setup_test_app().await;
    let token = token_for(UserRole::Admin);
    let (status, _) = call(
        &app,
        "POST",
        "/api/buildings",
        Some(&token),
        Some(json!({"name": "Building D", "address": "4 Campus Road", "totalFloors": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Far past the last page: empty slice, real totals
    let (status, page) = call(
        &app,
        "GET",
        "/api/buildings?pageNumber=9223372036854775807&pageSize=10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"], json!([]));
    assert_eq!(page["pagination"]["totalCount"], 1);
    assert_eq!(page["pagination"]["totalPages"], 1);
    assert_eq!(page["pagination"]["hasNextPage"], false);

    for uri in [
        "/api/rooms?pageNumber=3&pageSize=9223372036854775807",
        "/api/buildings?pageSize=101",
    ] {
        let (status, body) = call(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["errors"]["pageSize"][0], "Page size must not exceed 100");
    }

    let (status, page) = call(&app, "GET", "/api/buildings?pageSize=100", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_validation_errors_are_keyed_by_field() {
    let (app, _) = setup_test_app().await;
    let token = token_for(UserRole::Admin);

    let (status, body) = call(
        &app,
        "POST",
        "/api/buildings",
        Some(&token),
        Some(json!({"name": "B", "address": "x", "totalFloors": 80})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["errors"]["name"].is_array());
    assert!(body["errors"]["address"].is_array());
    assert_eq!(body["errors"]["totalFloors"][0], "Total floors must be between 1 and 50");

    // Every missing field is reported alongside the out-of-range ones
    let (status, body) = call(
        &app,
        "POST",
        "/api/contracts",
        Some(&token),
        Some(json!({"monthlyRent": -5, "roomId": null})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_object().unwrap();
    for field in [
        "contractNumber",
        "studentIds",
        "roomId",
        "startDate",
        "endDate",
        "depositAmount",
    ] {
        assert_eq!(errors[field][0], format!("{} is required", field), "{}", field);
    }
    assert_eq!(errors["monthlyRent"][0], "Monthly rent must be greater than 0");
    assert_eq!(errors.len(), 7);

    // Wrong value type
    let (status, body) = call(
        &app,
        "POST",
        "/api/floors",
        Some(&token),
        Some(json!({"floorNumber": "first", "buildingId": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["body"].is_array());

    // Unknown enum value in a filter
    let (status, _) = call(&app, "GET", "/api/rooms?status=Flooded", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_resources_are_not_found() {
    let (app, _) = setup_test_app().await;
    let token = token_for(UserRole::Admin);

    let (status, body) = call(&app, "GET", "/api/buildings/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Building not found");

    let (status, _) = call(
        &app,
        "PUT",
        "/api/students/999",
        Some(&token),
        Some(json!({"fullName": "Nobody Here"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "GET", "/api/floors/building/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Building not found");

    let (status, _) = call(&app, "DELETE", "/api/invoices/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "GET", "/api/students/code/NOPE", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Student not found");

    // Ids that are not numbers still get the error envelope
    for uri in ["/api/contracts/abc", "/api/rooms/building/xyz"] {
        let (status, body) = call(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert!(body["errors"]["id"].is_array());
    }
    let (status, body) = call(&app, "PUT", "/api/invoices/1.5/mark-paid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_soft_delete_cascades_and_include_deleted() {
    let (app, _) = setup_test_app().await;
    let admin = token_for(UserRole::Admin);
    let manager = token_for(UserRole::Manager);

    let (_, building) = call(
        &app,
        "POST",
        "/api/buildings",
        Some(&admin),
        Some(json!({"name": "Building C", "address": "3 Campus Road", "totalFloors": 2})),
    )
    .await;
    let building_id = building["data"]["id"].as_i64().unwrap();
    for floor_number in 1..=2 {
        let (_, floor) = call(
            &app,
            "POST",
            "/api/floors",
            Some(&admin),
            Some(json!({"floorNumber": floor_number, "buildingId": building_id})),
        )
        .await;
        let (status, _) = call(
            &app,
            "POST",
            "/api/rooms",
            Some(&admin),
            Some(json!({
                "roomNumber": format!("{}01", floor_number),
                "floorId": floor["data"]["id"],
                "capacity": 1,
                "rentPrice": 1_500_000
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!("/api/rooms/building/{}", building_id);
    let (_, rooms) = call(&app, "GET", &uri, Some(&admin), None).await;
    assert_eq!(rooms["pagination"]["totalCount"], 2);
    assert_eq!(rooms["data"][0]["roomType"], "Single");

    let (status, body) = call(
        &app,
        "DELETE",
        &format!("/api/buildings/{}", building_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Building deleted successfully");
    assert_eq!(body["data"], json!({}));

    let (_, floors) = call(&app, "GET", "/api/floors", Some(&admin), None).await;
    assert_eq!(floors["pagination"]["totalCount"], 0);
    let (_, rooms) = call(&app, "GET", "/api/rooms", Some(&admin), None).await;
    assert_eq!(rooms["pagination"]["totalCount"], 0);

    // Only admins may look behind the soft delete
    let (status, _) = call(&app, "GET", "/api/rooms?includeDeleted=true", Some(&manager), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, rooms) = call(&app, "GET", "/api/rooms?includeDeleted=true", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms["pagination"]["totalCount"], 2);
}

#[tokio::test]
async fn test_pagination_envelope() {
    let (app, _) = setup_test_app().await;
    let token = token_for(UserRole::Admin);

    for i in 0..12 {
        let (status, _) = call(
            &app,
            "POST",
            "/api/students",
            Some(&token),
            Some(json!({
                "studentCode": format!("SV{:03}", i),
                "fullName": format!("Student {}", i),
                "email": format!("s{}@example.edu", i)
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = call(
        &app,
        "GET",
        "/api/students?pageNumber=3&pageSize=5",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["success"], true);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"]["totalCount"], 12);
    assert_eq!(page["pagination"]["totalPages"], 3);
    assert_eq!(page["pagination"]["pageNumber"], 3);
    assert_eq!(page["pagination"]["hasPreviousPage"], true);
    assert_eq!(page["pagination"]["hasNextPage"], false);

    // Defaults: first page of ten
    let (_, page) = call(&app, "GET", "/api/students", Some(&token), None).await;
    assert_eq!(page["data"].as_array().unwrap().len(), 10);
    assert_eq!(page["pagination"]["pageSize"], 10);

    // Duplicate code
    let (status, body) = call(
        &app,
        "POST",
        "/api/students",
        Some(&token),
        Some(json!({"studentCode": "SV000", "fullName": "Copy Cat", "email": "copy@example.edu"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Student code already exists");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let (app, db) = setup_test_app().await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "sv_an",
            "email": "an@example.edu",
            "password": "secret1",
            "fullName": "Nguyen Van An"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "Student");
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "sv_an", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "sv_an", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, me) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["username"], "sv_an");

    // Bootstrap is a one-off
    assert!(user_service::ensure_admin(&db, "root", "rootpass", "root@example.edu").await.unwrap());
    assert!(!user_service::ensure_admin(&db, "root2", "rootpass", "r2@example.edu").await.unwrap());
}
