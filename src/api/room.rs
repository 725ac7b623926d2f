use axum::extract::State;
use serde::Deserialize;

use super::envelope::{ApiPath, ApiQuery, ApiResponse, Created, Empty, Paginated, ValidatedJson, deleted};
use crate::auth::{Claims, Policy};
use crate::domain::{DomainError, PageQuery};
use crate::infrastructure::AppState;
use crate::models::enums::{RoomStatus, RoomType};
use crate::models::room::{CreateRoomRequest, RoomDto, UpdateRoomRequest};
use crate::services::room_service::{self, RoomFilter};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsQuery {
    pub status: Option<RoomStatus>,
    pub room_type: Option<RoomType>,
    pub floor_id: Option<i32>,
    pub building_id: Option<i32>,
}

pub async fn list_rooms(
    State(state): State<AppState>,
    claims: Claims,
    ApiQuery(query): ApiQuery<PageQuery>,
    ApiQuery(params): ApiQuery<RoomsQuery>,
) -> Result<Paginated<RoomDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let filter = RoomFilter {
        status: params.status,
        room_type: params.room_type,
        floor_id: params.floor_id,
        building_id: params.building_id,
    };
    let page = room_service::list_rooms(state.db(), filter, visibility, query.to_request()?).await?;
    Ok(page.into())
}

pub async fn list_available_rooms(
    State(state): State<AppState>,
    _claims: Claims,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Paginated<RoomDto>, DomainError> {
    let page = room_service::list_available_rooms(state.db(), query.to_request()?).await?;
    Ok(page.into())
}

pub async fn list_rooms_by_building(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(building_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Paginated<RoomDto>, DomainError> {
    let visibility = claims.visibility(query.include_deleted)?;
    let page = room_service::list_rooms_by_building(
        state.db(),
        building_id,
        visibility,
        query.to_request()?,
    )
    .await?;
    Ok(page.into())
}

pub async fn get_room(
    State(state): State<AppState>,
    _claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<RoomDto>, DomainError> {
    Ok(ApiResponse::ok(room_service::get_room(state.db(), id).await?))
}

pub async fn create_room(
    State(state): State<AppState>,
    claims: Claims,
    ValidatedJson(payload): ValidatedJson<CreateRoomRequest>,
) -> Result<Created<RoomDto>, DomainError> {
    claims.require(Policy::ManagerOrAdmin)?;
    let room = room_service::create_room(state.db(), payload).await?;
    Ok(Created(room, "Room created successfully"))
}

pub async fn update_room(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateRoomRequest>,
) -> Result<ApiResponse<RoomDto>, DomainError> {
    claims.require(Policy::ManagerOrAdmin)?;
    let room = room_service::update_room(state.db(), id, payload).await?;
    Ok(ApiResponse::with_message(room, "Room updated successfully"))
}

pub async fn delete_room(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<Empty>, DomainError> {
    claims.require(Policy::ManagerOrAdmin)?;
    room_service::delete_room(state.db(), id).await?;
    Ok(deleted("Room"))
}
