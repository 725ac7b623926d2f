use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{ContractStatus, parse_variant};
use crate::domain::validation::{RequiredFields, validate_contract_status};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub contract_number: String,
    pub room_id: i32,
    pub start_date: Date,
    pub end_date: Date,
    pub deposit_amount: f64,
    pub monthly_rent: f64,
    pub status: ContractStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Room,
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
    #[sea_orm(has_many = "super::contract_student::Entity")]
    ContractStudents,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::contract_student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractStudents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::SoftDelete for Entity {
    fn deleted_flag() -> Column {
        Column::IsDeleted
    }
}

/// A co-signing student as seen from the contract.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractStudentDto {
    pub student_id: i32,
    pub student_code: String,
    pub full_name: String,
    pub joined_at: DateTimeUtc,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractDto {
    pub id: i32,
    pub contract_number: String,
    pub room_id: i32,
    pub room_number: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub deposit_amount: f64,
    pub monthly_rent: f64,
    pub status: ContractStatus,
    pub students: Vec<ContractStudentDto>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl ContractDto {
    pub fn assemble(
        model: Model,
        room_number: Option<String>,
        students: Vec<ContractStudentDto>,
    ) -> Self {
        Self {
            id: model.id,
            contract_number: model.contract_number,
            room_id: model.room_id,
            room_number,
            start_date: model.start_date,
            end_date: model.end_date,
            deposit_amount: model.deposit_amount,
            monthly_rent: model.monthly_rent,
            status: model.status,
            students,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateContractRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Contract number must be between 1 and 50 characters"
    ))]
    pub contract_number: String,
    #[validate(length(min = 1, message = "At least one student is required"))]
    pub student_ids: Vec<i32>,
    #[validate(range(min = 1, message = "Room ID must be greater than 0"))]
    pub room_id: i32,
    pub start_date: Date,
    pub end_date: Date,
    #[validate(range(min = 0.0, message = "Deposit amount cannot be negative"))]
    pub deposit_amount: f64,
    #[validate(range(exclusive_min = 0.0, message = "Monthly rent must be greater than 0"))]
    pub monthly_rent: f64,
}

impl CreateContractRequest {
    /// Student ids in first-seen order with duplicates removed.
    pub fn distinct_student_ids(&self) -> Vec<i32> {
        distinct(&self.student_ids)
    }

    pub fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        ActiveModel {
            contract_number: Set(self.contract_number),
            room_id: Set(self.room_id),
            start_date: Set(self.start_date),
            end_date: Set(self.end_date),
            deposit_amount: Set(self.deposit_amount),
            monthly_rent: Set(self.monthly_rent),
            status: Set(ContractStatus::Active),
            created_at: Set(now),
            updated_at: Set(None),
            deleted_at: Set(None),
            is_deleted: Set(false),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractRequest {
    #[validate(length(min = 1, message = "At least one student is required"))]
    pub student_ids: Option<Vec<i32>>,
    pub end_date: Option<Date>,
    #[validate(range(min = 0.0, message = "Deposit amount cannot be negative"))]
    pub deposit_amount: Option<f64>,
    #[validate(range(exclusive_min = 0.0, message = "Monthly rent must be greater than 0"))]
    pub monthly_rent: Option<f64>,
    #[validate(custom(function = "validate_contract_status"))]
    pub status: Option<String>,
}

impl UpdateContractRequest {
    pub fn requested_status(&self) -> Option<ContractStatus> {
        self.status.as_deref().and_then(parse_variant::<ContractStatus>)
    }

    pub fn distinct_student_ids(&self) -> Option<Vec<i32>> {
        self.student_ids.as_deref().map(distinct)
    }

    /// Plain column changes only; status and students go through the service.
    pub fn apply(&self, active: &mut ActiveModel, now: DateTimeUtc) {
        if let Some(end_date) = self.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(deposit) = self.deposit_amount {
            active.deposit_amount = Set(deposit);
        }
        if let Some(rent) = self.monthly_rent {
            active.monthly_rent = Set(rent);
        }
        active.updated_at = Set(Some(now));
    }
}

fn distinct(ids: &[i32]) -> Vec<i32> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

impl RequiredFields for CreateContractRequest {
    const REQUIRED: &'static [&'static str] = &["contractNumber", "studentIds", "roomId", "startDate", "endDate", "depositAmount", "monthlyRent"];
}

impl RequiredFields for UpdateContractRequest {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_students_collapse_in_order() {
        assert_eq!(distinct(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
    }

    #[test]
    fn empty_student_list_is_rejected() {
        let request = CreateContractRequest {
            contract_number: "HD-001".into(),
            student_ids: vec![],
            room_id: 1,
            start_date: Date::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: Date::from_ymd_opt(2025, 6, 30).unwrap(),
            deposit_amount: 0.0,
            monthly_rent: 1_500_000.0,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("student_ids"));
    }
}
