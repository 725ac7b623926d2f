use axum::extract::State;

use super::envelope::{ApiPath, ApiQuery, ApiResponse, Created, Empty, Paginated, ValidatedJson, deleted};
use crate::auth::{Claims, Policy};
use crate::domain::{DomainError, PageQuery};
use crate::infrastructure::AppState;
use crate::models::building::{BuildingDto, CreateBuildingRequest, UpdateBuildingRequest};
use crate::services::building_service;

pub async fn list_buildings(
    State(state): State<AppState>,
    claims: Claims,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Paginated<BuildingDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let page = building_service::list_buildings(state.db(), visibility, query.to_request()?).await?;
    Ok(page.into())
}

pub async fn get_building(
    State(state): State<AppState>,
    _claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<BuildingDto>, DomainError> {
    Ok(ApiResponse::ok(
        building_service::get_building(state.db(), id).await?,
    ))
}

pub async fn create_building(
    State(state): State<AppState>,
    claims: Claims,
    ValidatedJson(payload): ValidatedJson<CreateBuildingRequest>,
) -> Result<Created<BuildingDto>, DomainError> {
    claims.require(Policy::ManagerOrAdmin)?;
    let building = building_service::create_building(state.db(), payload).await?;
    Ok(Created(building, "Building created successfully"))
}

pub async fn update_building(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateBuildingRequest>,
) -> Result<ApiResponse<BuildingDto>, DomainError> {
    claims.require(Policy::ManagerOrAdmin)?;
    let building = building_service::update_building(state.db(), id, payload).await?;
    Ok(ApiResponse::with_message(
        building,
        "Building updated successfully",
    ))
}

pub async fn delete_building(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<Empty>, DomainError> {
    claims.require(Policy::ManagerOrAdmin)?;
    building_service::delete_building(state.db(), id).await?;
    Ok(deleted("Building"))
}
