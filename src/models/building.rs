use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::validation::RequiredFields;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "buildings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub address: String,
    pub total_floors: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::floor::Entity")]
    Floors,
}

impl Related<super::floor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Floors.def()
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
pub struct BuildingDto {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub total_floors: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl From<Model> for BuildingDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            total_floors: model.total_floors,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBuildingRequest {
    #[validate(length(
        min = 2,
        max = 255,
        message = "Building name must be between 2 and 255 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 5,
        max = 500,
        message = "Address must be between 5 and 500 characters"
    ))]
    pub address: String,
    #[validate(range(min = 1, max = 50, message = "Total floors must be between 1 and 50"))]
    pub total_floors: i32,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

impl CreateBuildingRequest {
    /// New buildings start active; timestamps and flags are server-owned.
    pub fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        ActiveModel {
            name: Set(self.name),
            address: Set(self.address),
            total_floors: Set(self.total_floors),
            description: Set(self.description),
            is_active: Set(true),
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
pub struct UpdateBuildingRequest {
    #[validate(length(
        min = 2,
        max = 255,
        message = "Building name must be between 2 and 255 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(
        min = 5,
        max = 500,
        message = "Address must be between 5 and 500 characters"
    ))]
    pub address: Option<String>,
    #[validate(range(min = 1, max = 50, message = "Total floors must be between 1 and 50"))]
    pub total_floors: Option<i32>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateBuildingRequest {
    pub fn apply(self, active: &mut ActiveModel, now: DateTimeUtc) {
        if let Some(name) = self.name {
            active.name = Set(name);
        }
        if let Some(address) = self.address {
            active.address = Set(address);
        }
        if let Some(total_floors) = self.total_floors {
            active.total_floors = Set(total_floors);
        }
        if let Some(description) = self.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = self.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(now));
    }
}

impl RequiredFields for CreateBuildingRequest {
    const REQUIRED: &'static [&'static str] = &["name", "address", "totalFloors"];
}

impl RequiredFields for UpdateBuildingRequest {}
