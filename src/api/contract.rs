use axum::extract::State;
use serde::Deserialize;

use super::envelope::{ApiPath, ApiQuery, ApiResponse, Created, Empty, Paginated, ValidatedJson, deleted};
use crate::auth::{Claims, Policy};
use crate::domain::{DomainError, PageQuery};
use crate::infrastructure::AppState;
use crate::models::contract::{ContractDto, CreateContractRequest, UpdateContractRequest};
use crate::models::enums::ContractStatus;
use crate::services::contract_service::{self, ContractFilter};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractsQuery {
    pub status: Option<ContractStatus>,
    pub room_id: Option<i32>,
    pub student_id: Option<i32>,
}

pub async fn list_contracts(
    State(state): State<AppState>,
    claims: Claims,
    ApiQuery(query): ApiQuery<PageQuery>,
    ApiQuery(params): ApiQuery<ContractsQuery>,
) -> Result<Paginated<ContractDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let filter = ContractFilter {
        status: params.status,
        room_id: params.room_id,
        student_id: params.student_id,
    };
    let page =
        contract_service::list_contracts(state.db(), filter, visibility, query.to_request()?)
            .await?;
    Ok(page.into())
}

pub async fn list_contracts_by_student(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(student_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Paginated<ContractDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let page = contract_service::list_contracts_by_student(
        state.db(),
        student_id,
        visibility,
        query.to_request()?,
    )
    .await?;
    Ok(page.into())
}

pub async fn list_contracts_by_room(
    State(state): State<AppState>,
    _claims: Claims,
    ApiPath(room_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Paginated<ContractDto>, DomainError> {
    let page =
        contract_service::list_active_contracts_by_room(state.db(), room_id, query.to_request()?)
            .await?;
    Ok(page.into())
}

pub async fn get_contract(
    State(state): State<AppState>,
    _claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<ContractDto>, DomainError> {
    Ok(ApiResponse::ok(
        contract_service::get_contract(state.db(), id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/contracts",
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Contract created and room occupied"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Room or student not found"),
        (status = 409, description = "Room not available or duplicate contract number")
    )
)]
pub async fn create_contract(
    State(state): State<AppState>,
    claims: Claims,
    ValidatedJson(payload): ValidatedJson<CreateContractRequest>,
) -> Result<Created<ContractDto>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    let contract = contract_service::create_contract(state.db(), payload).await?;
    Ok(Created(contract, "Contract created successfully"))
}

pub async fn update_contract(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateContractRequest>,
) -> Result<ApiResponse<ContractDto>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    let contract = contract_service::update_contract(state.db(), id, payload).await?;
    Ok(ApiResponse::with_message(
        contract,
        "Contract updated successfully",
    ))
}

#[utoipa::path(
    put,
    path = "/api/contracts/{id}/complete",
    params(("id" = i32, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract completed and room released"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract cannot be completed from its current status")
    )
)]
pub async fn complete_contract(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<ContractDto>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    let contract = contract_service::complete_contract(state.db(), id).await?;
    Ok(ApiResponse::with_message(
        contract,
        "Contract completed successfully",
    ))
}

#[utoipa::path(
    put,
    path = "/api/contracts/{id}/cancel",
    params(("id" = i32, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract cancelled"),
        (status = 404, description = "Contract not found"),
        (status = 409, description = "Contract cannot be cancelled from its current status")
    )
)]
pub async fn cancel_contract(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<ContractDto>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    let contract = contract_service::cancel_contract(state.db(), id).await?;
    Ok(ApiResponse::with_message(
        contract,
        "Contract cancelled successfully",
    ))
}

pub async fn delete_contract(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<Empty>, DomainError> {
    claims.require(Policy::StaffOrAbove)?;
    contract_service::delete_contract(state.db(), id).await?;
    Ok(deleted("Contract"))
}
