//! Building Service - the top of the building / floor / room hierarchy

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;

use super::listing::{active_contracts_for_rooms, fetch_page, find_live};
use crate::domain::{DomainError, Page, PageRequest};
use crate::models::building::{
    self, BuildingDto, CreateBuildingRequest, Entity as Building, UpdateBuildingRequest,
};
use crate::models::{Visibility, floor, room, scoped};

pub async fn list_buildings(
    db: &DatabaseConnection,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<BuildingDto>, DomainError> {
    let select = scoped::<Building>(visibility).order_by_asc(building::Column::Id);
    Ok(fetch_page(db, select, page).await?.map(BuildingDto::from))
}

pub async fn get_building(db: &DatabaseConnection, id: i32) -> Result<BuildingDto, DomainError> {
    Ok(find_live::<Building, _>(db, id, "Building").await?.into())
}

pub async fn create_building(
    db: &DatabaseConnection,
    request: CreateBuildingRequest,
) -> Result<BuildingDto, DomainError> {
    let created = request.into_active_model(Utc::now()).insert(db).await?;
    tracing::info!("Building {} created: {}", created.id, created.name);
    Ok(created.into())
}

pub async fn update_building(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateBuildingRequest,
) -> Result<BuildingDto, DomainError> {
    let existing = find_live::<Building, _>(db, id, "Building").await?;
    let mut active: building::ActiveModel = existing.into();
    request.apply(&mut active, Utc::now());
    Ok(active.update(db).await?.into())
}

/// Soft-deletes the building with its floors and their rooms.
pub async fn delete_building(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let txn = db.begin().await?;
    find_live::<Building, _>(&txn, id, "Building").await?;

    let floor_ids: Vec<i32> = floor::Entity::find()
        .select_only()
        .column(floor::Column::Id)
        .filter(floor::Column::BuildingId.eq(id))
        .filter(floor::Column::IsDeleted.eq(false))
        .into_tuple()
        .all(&txn)
        .await?;
    let room_ids: Vec<i32> = if floor_ids.is_empty() {
        Vec::new()
    } else {
        room::Entity::find()
            .select_only()
            .column(room::Column::Id)
            .filter(room::Column::FloorId.is_in(floor_ids.clone()))
            .filter(room::Column::IsDeleted.eq(false))
            .into_tuple()
            .all(&txn)
            .await?
    };

    if active_contracts_for_rooms(&txn, &room_ids).await? > 0 {
        tracing::warn!("Refusing to delete building {}: rooms under active contract", id);
        return Err(DomainError::Conflict(
            "Building has rooms with active contracts".into(),
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
    if !floor_ids.is_empty() {
        floor::Entity::update_many()
            .col_expr(floor::Column::IsDeleted, Expr::value(true))
            .col_expr(floor::Column::DeletedAt, Expr::value(now))
            .filter(floor::Column::Id.is_in(floor_ids.clone()))
            .exec(&txn)
            .await?;
    }
    Building::update_many()
        .col_expr(building::Column::IsDeleted, Expr::value(true))
        .col_expr(building::Column::DeletedAt, Expr::value(now))
        .filter(building::Column::Id.eq(id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    tracing::info!(
        "Building {} deleted with {} floors and {} rooms",
        id,
        floor_ids.len(),
        room_ids.len()
    );
    Ok(())
}
