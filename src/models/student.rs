use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{StudentStatus, parse_variant};
use crate::domain::validation::{RequiredFields, validate_phone, validate_student_status};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub student_code: String,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    pub id_card_number: Option<String>,
    pub address: Option<String>,
    pub guardian: Option<String>,
    pub guardian_phone: Option<String>,
    pub profile_image: Option<String>,
    pub status: StudentStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contract_student::Entity")]
    ContractStudents,
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

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
    pub id: i32,
    pub student_code: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    pub id_card_number: Option<String>,
    pub address: Option<String>,
    pub guardian: Option<String>,
    pub guardian_phone: Option<String>,
    pub profile_image: Option<String>,
    pub status: StudentStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl From<Model> for StudentDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            student_code: model.student_code,
            full_name: model.full_name,
            email: model.email,
            phone_number: model.phone_number,
            date_of_birth: model.date_of_birth,
            id_card_number: model.id_card_number,
            address: model.address,
            guardian: model.guardian,
            guardian_phone: model.guardian_phone,
            profile_image: model.profile_image,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStudentRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Student code must be between 1 and 50 characters"
    ))]
    pub student_code: String,
    #[validate(length(
        min = 2,
        max = 255,
        message = "Full name must be between 2 and 255 characters"
    ))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    #[validate(length(max = 20, message = "ID card number must be at most 20 characters"))]
    pub id_card_number: Option<String>,
    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 255, message = "Guardian name must be at most 255 characters"))]
    pub guardian: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub guardian_phone: Option<String>,
    #[validate(url(message = "Invalid profile image URL"))]
    pub profile_image: Option<String>,
}

impl CreateStudentRequest {
    pub fn into_active_model(self, now: DateTimeUtc) -> ActiveModel {
        ActiveModel {
            student_code: Set(self.student_code),
            full_name: Set(self.full_name),
            email: Set(self.email),
            phone_number: Set(self.phone_number),
            date_of_birth: Set(self.date_of_birth),
            id_card_number: Set(self.id_card_number),
            address: Set(self.address),
            guardian: Set(self.guardian),
            guardian_phone: Set(self.guardian_phone),
            profile_image: Set(self.profile_image),
            status: Set(StudentStatus::Active),
            created_at: Set(now),
            updated_at: Set(None),
            deleted_at: Set(None),
            is_deleted: Set(false),
            ..Default::default()
        }
    }
}

/// Student code is immutable; everything else is patchable.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[validate(length(
        min = 2,
        max = 255,
        message = "Full name must be between 2 and 255 characters"
    ))]
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,
    pub date_of_birth: Option<Date>,
    #[validate(length(max = 20, message = "ID card number must be at most 20 characters"))]
    pub id_card_number: Option<String>,
    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 255, message = "Guardian name must be at most 255 characters"))]
    pub guardian: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub guardian_phone: Option<String>,
    #[validate(url(message = "Invalid profile image URL"))]
    pub profile_image: Option<String>,
    #[validate(custom(function = "validate_student_status"))]
    pub status: Option<String>,
}

impl UpdateStudentRequest {
    pub fn apply(self, active: &mut ActiveModel, now: DateTimeUtc) {
        if let Some(full_name) = self.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(email) = self.email {
            active.email = Set(email);
        }
        if let Some(phone) = self.phone_number {
            active.phone_number = Set(Some(phone));
        }
        if let Some(dob) = self.date_of_birth {
            active.date_of_birth = Set(Some(dob));
        }
        if let Some(id_card) = self.id_card_number {
            active.id_card_number = Set(Some(id_card));
        }
        if let Some(address) = self.address {
            active.address = Set(Some(address));
        }
        if let Some(guardian) = self.guardian {
            active.guardian = Set(Some(guardian));
        }
        if let Some(phone) = self.guardian_phone {
            active.guardian_phone = Set(Some(phone));
        }
        if let Some(image) = self.profile_image {
            active.profile_image = Set(Some(image));
        }
        if let Some(status) = self.status.as_deref().and_then(parse_variant::<StudentStatus>) {
            active.status = Set(status);
        }
        active.updated_at = Set(Some(now));
    }
}

impl RequiredFields for CreateStudentRequest {
    const REQUIRED: &'static [&'static str] = &["studentCode", "fullName", "email"];
}

impl RequiredFields for UpdateStudentRequest {}
