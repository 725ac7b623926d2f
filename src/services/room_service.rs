//! Room Service - rooms and their manually managed status

use chrono::Utc;
use sea_orm::*;

use super::listing::{active_contracts_for_rooms, fetch_page, find_live};
use crate::domain::lifecycle::check_manual_room_status;
use crate::domain::{DomainError, Page, PageRequest};
use crate::models::enums::{RoomStatus, RoomType};
use crate::models::room::{self, CreateRoomRequest, Entity as Room, RoomDto, UpdateRoomRequest};
use crate::models::{Visibility, building, floor, scoped};

/// Filter parameters for listing rooms
#[derive(Debug, Default, Clone)]
pub struct RoomFilter {
    pub status: Option<RoomStatus>,
    pub room_type: Option<RoomType>,
    pub floor_id: Option<i32>,
    pub building_id: Option<i32>,
}

pub async fn list_rooms(
    db: &DatabaseConnection,
    filter: RoomFilter,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<RoomDto>, DomainError> {
    let mut condition = Condition::all();
    if let Some(status) = filter.status {
        condition = condition.add(room::Column::Status.eq(status));
    }
    if let Some(room_type) = filter.room_type {
        condition = condition.add(room::Column::RoomType.eq(room_type));
    }
    if let Some(floor_id) = filter.floor_id {
        condition = condition.add(room::Column::FloorId.eq(floor_id));
    }

    let mut select = scoped::<Room>(visibility);
    if let Some(building_id) = filter.building_id {
        select = select
            .inner_join(floor::Entity)
            .filter(floor::Column::BuildingId.eq(building_id));
    }
    let select = select.filter(condition).order_by_asc(room::Column::Id);
    Ok(fetch_page(db, select, page).await?.map(RoomDto::from))
}

pub async fn list_available_rooms(
    db: &DatabaseConnection,
    page: PageRequest,
) -> Result<Page<RoomDto>, DomainError> {
    let filter = RoomFilter {
        status: Some(RoomStatus::Available),
        ..Default::default()
    };
    list_rooms(db, filter, Visibility::Live, page).await
}

pub async fn list_rooms_by_building(
    db: &DatabaseConnection,
    building_id: i32,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<RoomDto>, DomainError> {
    find_live::<building::Entity, _>(db, building_id, "Building").await?;
    let filter = RoomFilter {
        building_id: Some(building_id),
        ..Default::default()
    };
    list_rooms(db, filter, visibility, page).await
}

pub async fn get_room(db: &DatabaseConnection, id: i32) -> Result<RoomDto, DomainError> {
    Ok(find_live::<Room, _>(db, id, "Room").await?.into())
}

async fn ensure_room_number_free<C: ConnectionTrait>(
    conn: &C,
    floor_id: i32,
    room_number: &str,
    except: Option<i32>,
) -> Result<(), DomainError> {
    let mut query = Room::find()
        .filter(room::Column::FloorId.eq(floor_id))
        .filter(room::Column::RoomNumber.eq(room_number));
    if let Some(id) = except {
        query = query.filter(room::Column::Id.ne(id));
    }
    if query.count(conn).await? > 0 {
        return Err(DomainError::Conflict(
            "Room number already exists on this floor".into(),
        ));
    }
    Ok(())
}

pub async fn create_room(
    db: &DatabaseConnection,
    request: CreateRoomRequest,
) -> Result<RoomDto, DomainError> {
    find_live::<floor::Entity, _>(db, request.floor_id, "Floor").await?;
    ensure_room_number_free(db, request.floor_id, &request.room_number, None).await?;

    let created = request.into_active_model(Utc::now()).insert(db).await?;
    tracing::info!(
        "Room {} created on floor {}",
        created.room_number,
        created.floor_id
    );
    Ok(created.into())
}

pub async fn update_room(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateRoomRequest,
) -> Result<RoomDto, DomainError> {
    let existing = find_live::<Room, _>(db, id, "Room").await?;

    if let Some(requested) = request.requested_status() {
        check_manual_room_status(existing.status, requested).map_err(|reason| {
            tracing::warn!(
                "Room {} status change {:?} -> {:?} rejected",
                id,
                existing.status,
                requested
            );
            DomainError::Conflict(reason)
        })?;
    }
    if let Some(number) = request.room_number.as_deref() {
        if number != existing.room_number {
            ensure_room_number_free(db, existing.floor_id, number, Some(id)).await?;
        }
    }

    let mut active: room::ActiveModel = existing.into();
    request.apply(&mut active, Utc::now());
    Ok(active.update(db).await?.into())
}

pub async fn delete_room(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;
    let existing = find_live::<Room, _>(&txn, id, "Room").await?;

    if active_contracts_for_rooms(&txn, &[id]).await? > 0 {
        tracing::warn!("Refusing to delete room {}: active contract", id);
        return Err(DomainError::Conflict("Room has an active contract".into()));
    }

    let now = Utc::now();
    let mut active: room::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.deleted_at = Set(Some(now));
    active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!("Room {} deleted", id);
    Ok(())
}
