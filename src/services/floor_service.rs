use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;

use super::listing::{active_contracts_for_rooms, fetch_page, find_live};
use crate::domain::{DomainError, Page, PageRequest};
use crate::models::floor::{
    self, CreateFloorRequest, Entity as Floor, FloorDto, UpdateFloorRequest,
};
use crate::models::{Visibility, building, room, scoped};

#[derive(Debug, Default, Clone)]
pub struct FloorFilter {
    pub building_id: Option<i32>,
}

pub async fn list_floors(
    db: &DatabaseConnection,
    filter: FloorFilter,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<FloorDto>, DomainError> {
    let mut condition = Condition::all();
    if let Some(building_id) = filter.building_id {
        condition = condition.add(floor::Column::BuildingId.eq(building_id));
    }

    let select = scoped::<Floor>(visibility)
        .filter(condition)
        .order_by_asc(floor::Column::BuildingId)
        .order_by_asc(floor::Column::FloorNumber)
        .order_by_asc(floor::Column::Id);
    Ok(fetch_page(db, select, page).await?.map(FloorDto::from))
}

/// Floors of one building; the building itself must exist.
pub async fn list_floors_by_building(
    db: &DatabaseConnection,
    building_id: i32,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<FloorDto>, DomainError> {
    find_live::<building::Entity, _>(db, building_id, "Building").await?;
    let filter = FloorFilter {
        building_id: Some(building_id),
    };
    list_floors(db, filter, visibility, page).await
}

pub async fn get_floor(db: &DatabaseConnection, id: i32) -> Result<FloorDto, DomainError> {
    Ok(find_live::<Floor, _>(db, id, "Floor").await?.into())
}

pub async fn create_floor(
    db: &DatabaseConnection,
    request: CreateFloorRequest,
) -> Result<FloorDto, DomainError> {
    find_live::<building::Entity, _>(db, request.building_id, "Building").await?;
    let created = request.into_active_model(Utc::now()).insert(db).await?;
    tracing::info!(
        "Floor {} created in building {}",
        created.floor_number,
        created.building_id
    );
    Ok(created.into())
}

pub async fn update_floor(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateFloorRequest,
) -> Result<FloorDto, DomainError> {
    let existing = find_live::<Floor, _>(db, id, "Floor").await?;
    let mut active: floor::ActiveModel = existing.into();
    request.apply(&mut active, Utc::now());
    Ok(active.update(db).await?.into())
}

/// Soft-deletes the floor and its rooms.
pub async fn delete_floor(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;
    find_live::<Floor, _>(&txn, id, "Floor").await?;

    let room_ids: Vec<i32> = room::Entity::find()
        .select_only()
        .column(room::Column::Id)
        .filter(room::Column::FloorId.eq(id))
        .filter(room::Column::IsDeleted.eq(false))
        .into_tuple()
        .all(&txn)
        .await?;

    if active_contracts_for_rooms(&txn, &room_ids).await? > 0 {
        tracing::warn!("Refusing to delete floor {}: rooms under active contract", id);
        return Err(DomainError::Conflict(
            "Floor has rooms with active contracts".into(),
        ));
    }

    let now = Utc::now();
    if !room_ids.is_empty() {
        room::Entity::update_many()
            .col_expr(room::Column::IsDeleted, Expr::value(true))
            .col_expr(room::Column::DeletedAt, Expr::value(now))
            .filter(room::Column::Id.is_in(room_ids.clone()))
            .exec(&txn)
            .await?;
    }
    Floor::update_many()
        .col_expr(floor::Column::IsDeleted, Expr::value(true))
        .col_expr(floor::Column::DeletedAt, Expr::value(now))
        .filter(floor::Column::Id.eq(id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    tracing::info!("Floor {} deleted with {} rooms", id, room_ids.len());
    Ok(())
}
