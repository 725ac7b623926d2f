use crate::api;
use crate::models;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::auth::login,
        api::contract::create_contract,
        api::contract::complete_contract,
        api::contract::cancel_contract,
        api::invoice::create_invoice,
        api::invoice::mark_invoice_paid,
    ),
    components(
        schemas(
            models::contract::CreateContractRequest,
            models::contract::ContractDto,
            models::contract::ContractStudentDto,
            models::invoice::CreateInvoiceRequest,
            models::invoice::InvoiceDto,
            models::room::RoomDto,
            models::user::LoginRequest,
            models::user::UserDto,
            models::enums::ContractStatus,
            models::enums::InvoiceStatus,
            models::enums::RoomStatus,
            models::enums::RoomType,
            models::enums::UserRole,
        )
    ),
    tags(
        (name = "dormitory", description = "Dormitory management API")
    )
)]
pub struct ApiDoc;
