use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::validation::RequiredFields;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "floors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub floor_number: i32,
    pub building_id: i32,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::building::Entity",
        from = "Column::BuildingId",
        to = "super::building::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Building,
    #[sea_orm(has_many = "super::room::Entity")]
    Rooms,
}

impl Related<super::building::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Building.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
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
pub struct FloorDto {
    pub id: i32,
    pub floor_number: i32,
    pub building_id: i32,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl From<Model> for FloorDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            floor_number: model.floor_number,
            building_id: model.building_id,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateFloorRequest {
    #[validate(range(min = 1, max = 100, message = "Floor number must be between 1 and 100"))]
    pub floor_number: i32,
    #[validate(range(min = 1, message = "Building ID must be greater than 0"))]
    pub building_id: i32,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl CreateFloorRequest {
    pub fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        ActiveModel {
            floor_number: Set(self.floor_number),
            building_id: Set(self.building_id),
            description: Set(self.description),
            created_at: Set(now),
            updated_at: Set(None),
            deleted_at: Set(None),
            is_deleted: Set(false),
            ..Default::default()
        }
    }
}

/// The owning building is fixed once a floor exists.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFloorRequest {
    #[validate(range(min = 1, max = 100, message = "Floor number must be between 1 and 100"))]
    pub floor_number: Option<i32>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

impl UpdateFloorRequest {
    pub fn apply(self, active: &mut ActiveModel, now: DateTimeUtc) {
        if let Some(floor_number) = self.floor_number {
            active.floor_number = Set(floor_number);
        }
        if let Some(description) = self.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Some(now));
    }
}

impl RequiredFields for CreateFloorRequest {
    const REQUIRED: &'static [&'static str] = &["floorNumber", "buildingId"];
}

impl RequiredFields for UpdateFloorRequest {}
