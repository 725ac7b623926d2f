use axum::extract::State;
use serde::Deserialize;

use super::envelope::{ApiPath, ApiQuery, ApiResponse, Created, Empty, Paginated, ValidatedJson, deleted};
use crate::auth::{Claims, Policy};
use crate::domain::{DomainError, PageQuery};
use crate::infrastructure::AppState;
use crate::models::floor::{CreateFloorRequest, FloorDto, UpdateFloorRequest};
use crate::services::floor_service::{self, FloorFilter};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorsQuery {
    pub building_id: Option<i32>,
}

pub async fn list_floors(
    State(state): State<AppState>,
    claims: Claims,
    ApiQuery(query): ApiQuery<PageQuery>,
    ApiQuery(params): ApiQuery<FloorsQuery>,
) -> Result<Paginated<FloorDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let filter = FloorFilter {
        building_id: params.building_id,
    };
    let page = floor_service::list_floors(state.db(), filter, visibility, query.to_request()?).await?;
    Ok(page.into())
}

pub async fn list_floors_by_building(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(building_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Paginated<FloorDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let page = floor_service::list_floors_by_building(
        state.db(),
        building_id,
        visibility,
        query.to_request()?,
    )
    .await?;
    Ok(page.into())
}

pub async fn get_floor(
    State(state): State<AppState>,
    _claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<FloorDto>, DomainError> {
    Ok(ApiResponse::ok(floor_service::get_floor(state.db(), id).await?))
}

pub async fn create_floor(
    State(state): State<AppState>,
    claims: Claims,
    ValidatedJson(payload): ValidatedJson<CreateFloorRequest>,
) -> Result<Created<FloorDto>, DomainError> {
    claims.require(Policy::ManagerOrAdmin)?;
    let floor = floor_service::create_floor(state.db(), payload).await?;
    Ok(Created(floor, "Floor created successfully"))
}

pub async fn update_floor(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateFloorRequest>,
) -> Result<ApiResponse<FloorDto>, DomainError> {
    claims.require(Policy::ManagerOrAdmin)?;
    let floor = floor_service::update_floor(state.db(), id, payload).await?;
    Ok(ApiResponse::with_message(floor, "Floor updated successfully"))
}

pub async fn delete_floor(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<Empty>, DomainError> {
    claims.require(Policy::ManagerOrAdmin)?;
    floor_service::delete_floor(state.db(), id).await?;
    Ok(deleted("Floor"))
}
