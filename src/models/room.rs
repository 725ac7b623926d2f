use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{RoomStatus, RoomType, parse_variant};
use crate::domain::validation::{RequiredFields, validate_room_status, validate_room_type};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique within its floor.
    pub room_number: String,
    pub floor_id: i32,
    pub capacity: i32,
    pub rent_price: f64,
    /// Occupied is driven exclusively by contract transitions.
    pub status: RoomStatus,
    pub room_type: RoomType,
    pub has_air_conditioner: bool,
    pub has_water_heater: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::floor::Entity",
        from = "Column::FloorId",
        to = "super::floor::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Floor,
    #[sea_orm(has_many = "super::contract::Entity")]
    Contracts,
}

impl Related<super::floor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Floor.def()
    }
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::SoftDelete for Entity {
    fn deleted_flag() -> Column {
        Column::IsDeleted
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: i32,
    pub room_number: String,
    pub floor_id: i32,
    pub capacity: i32,
    pub rent_price: f64,
    pub status: RoomStatus,
    pub room_type: RoomType,
    pub has_air_conditioner: bool,
    pub has_water_heater: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl From<Model> for RoomDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            room_number: model.room_number,
            floor_id: model.floor_id,
            capacity: model.capacity,
            rent_price: model.rent_price,
            status: model.status,
            room_type: model.room_type,
            has_air_conditioner: model.has_air_conditioner,
            has_water_heater: model.has_water_heater,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRoomRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Room number must be between 1 and 50 characters"
    ))]
    pub room_number: String,
    #[validate(range(min = 1, message = "Floor ID must be greater than 0"))]
    pub floor_id: i32,
    #[validate(range(min = 1, max = 10, message = "Capacity must be between 1 and 10"))]
    pub capacity: i32,
    #[validate(range(exclusive_min = 0.0, message = "Rent price must be greater than 0"))]
    pub rent_price: f64,
    #[validate(custom(function = "validate_room_type"))]
    pub room_type: Option<String>,
    #[serde(default)]
    pub has_air_conditioner: bool,
    #[serde(default)]
    pub has_water_heater: bool,
}

impl CreateRoomRequest {
    /// New rooms are always Available; status is not client-settable here.
    pub fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        let room_type = self
            .room_type
            .as_deref()
            .and_then(parse_variant::<RoomType>)
            .unwrap_or(RoomType::Single);
        ActiveModel {
            room_number: Set(self.room_number),
            floor_id: Set(self.floor_id),
            capacity: Set(self.capacity),
            rent_price: Set(self.rent_price),
            status: Set(RoomStatus::Available),
            room_type: Set(room_type),
            has_air_conditioner: Set(self.has_air_conditioner),
            has_water_heater: Set(self.has_water_heater),
            created_at: Set(now),
            updated_at: Set(None),
            deleted_at: Set(None),
            is_deleted: Set(false),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Room number must be between 1 and 50 characters"
    ))]
    pub room_number: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Capacity must be between 1 and 10"))]
    pub capacity: Option<i32>,
    #[validate(range(exclusive_min = 0.0, message = "Rent price must be greater than 0"))]
    pub rent_price: Option<f64>,
    #[validate(custom(function = "validate_room_status"))]
    pub status: Option<String>,
    #[validate(custom(function = "validate_room_type"))]
    pub room_type: Option<String>,
    pub has_air_conditioner: Option<bool>,
    pub has_water_heater: Option<bool>,
}

impl UpdateRoomRequest {
    pub fn requested_status(&self) -> Option<RoomStatus> {
        self.status.as_deref().and_then(parse_variant::<RoomStatus>)
    }

    /// Status must already have passed the occupancy guard.
    pub fn apply(self, active: &mut ActiveModel, now: DateTimeUtc) {
        if let Some(status) = self.requested_status() {
            active.status = Set(status);
        }
        if let Some(room_number) = self.room_number {
            active.room_number = Set(room_number);
        }
        if let Some(capacity) = self.capacity {
            active.capacity = Set(capacity);
        }
        if let Some(rent_price) = self.rent_price {
            active.rent_price = Set(rent_price);
        }
        if let Some(room_type) = self.room_type.as_deref().and_then(parse_variant::<RoomType>) {
            active.room_type = Set(room_type);
        }
        if let Some(flag) = self.has_air_conditioner {
            active.has_air_conditioner = Set(flag);
        }
        if let Some(flag) = self.has_water_heater {
            active.has_water_heater = Set(flag);
        }
        active.updated_at = Set(Some(now));
    }
}

impl RequiredFields for CreateRoomRequest {
    const REQUIRED: &'static [&'static str] = &["roomNumber", "floorId", "capacity", "rentPrice"];
}

impl RequiredFields for UpdateRoomRequest {}
