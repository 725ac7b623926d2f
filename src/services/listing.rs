//! Shared query helpers: paging, live lookups and occupancy checks.

use sea_orm::*;

use crate::domain::{DomainError, Page, PageRequest};
use crate::models::enums::ContractStatus;
use crate::models::{SoftDelete, contract};

/// Runs `select` through the store paginator and wraps the slice with totals.
/// Pages past the end come back empty without querying rows.
pub async fn fetch_page<E, C>(
    conn: &C,
    select: Select<E>,
    request: PageRequest,
) -> Result<Page<E::Model>, DomainError>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let paginator = select.paginate(conn, request.size());
    let total = paginator.num_items().await?;
    let items = match request.offset() {
        Some(offset) if offset < total => paginator.fetch_page(request.index()).await?,
        _ => Vec::new(),
    };
    Ok(Page::new(items, total, request))
}

/// Loads a non-deleted row by id, or `NotFound` named after `entity`.
pub async fn find_live<E, C>(conn: &C, id: i32, entity: &str) -> Result<E::Model, DomainError>
where
    E: SoftDelete,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
{
    E::find_by_id(id)
        .filter(E::deleted_flag().eq(false))
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found(entity))
}

/// Number of live Active contracts holding any of `room_ids`.
pub async fn active_contracts_for_rooms<C>(conn: &C, room_ids: &[i32]) -> Result<u64, DomainError>
where
    C: ConnectionTrait,
{
    if room_ids.is_empty() {
        return Ok(0);
    }
    Ok(contract::Entity::find()
        .filter(contract::Column::RoomId.is_in(room_ids.to_vec()))
        .filter(contract::Column::Status.eq(ContractStatus::Active))
        .filter(contract::Column::IsDeleted.eq(false))
        .count(conn)
        .await?)
}
