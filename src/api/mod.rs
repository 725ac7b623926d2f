pub mod auth;
pub mod building;
pub mod contract;
pub mod envelope;
pub mod floor;
pub mod health;
pub mod invoice;
pub mod room;
pub mod student;
pub mod user;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::get_me))
        // Buildings
        .route(
            "/buildings",
            get(building::list_buildings).post(building::create_building),
        )
        .route(
            "/buildings/:id",
            get(building::get_building)
                .put(building::update_building)
                .delete(building::delete_building),
        )
        // Floors
        .route("/floors", get(floor::list_floors).post(floor::create_floor))
        .route(
            "/floors/building/:building_id",
            get(floor::list_floors_by_building),
        )
        .route(
            "/floors/:id",
            get(floor::get_floor)
                .put(floor::update_floor)
                .delete(floor::delete_floor),
        )
        // Rooms
        .route("/rooms", get(room::list_rooms).post(room::create_room))
        .route("/rooms/available", get(room::list_available_rooms))
        .route(
            "/rooms/building/:building_id",
            get(room::list_rooms_by_building),
        )
        .route(
            "/rooms/:id",
            get(room::get_room)
                .put(room::update_room)
                .delete(room::delete_room),
        )
        // Students
        .route(
            "/students",
            get(student::list_students).post(student::create_student),
        )
        .route("/students/code/:code", get(student::get_student_by_code))
        .route(
            "/students/:id",
            get(student::get_student)
                .put(student::update_student)
                .delete(student::delete_student),
        )
        // Contracts
        .route(
            "/contracts",
            get(contract::list_contracts).post(contract::create_contract),
        )
        .route(
            "/contracts/student/:student_id",
            get(contract::list_contracts_by_student),
        )
        .route(
            "/contracts/room/:room_id",
            get(contract::list_contracts_by_room),
        )
        .route(
            "/contracts/:id",
            get(contract::get_contract)
                .put(contract::update_contract)
                .delete(contract::delete_contract),
        )
        .route("/contracts/:id/complete", put(contract::complete_contract))
        .route("/contracts/:id/cancel", put(contract::cancel_contract))
        // Invoices
        .route(
            "/invoices",
            get(invoice::list_invoices).post(invoice::create_invoice),
        )
        .route("/invoices/unpaid", get(invoice::list_unpaid_invoices))
        .route(
            "/invoices/contract/:contract_id",
            get(invoice::list_invoices_by_contract),
        )
        .route(
            "/invoices/:id",
            get(invoice::get_invoice)
                .put(invoice::update_invoice)
                .delete(invoice::delete_invoice),
        )
        .route("/invoices/:id/mark-paid", put(invoice::mark_invoice_paid))
        // Users
        .route("/users", get(user::list_users).post(user::create_user))
        .route(
            "/users/:id",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        .with_state(state)
}
