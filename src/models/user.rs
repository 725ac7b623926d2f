use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::enums::UserRole;
use crate::domain::validation::{RequiredFields, validate_phone, validate_user_role};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
    pub deleted_at: Option<DateTimeUtc>,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl super::SoftDelete for Entity {
    fn deleted_flag() -> Column {
        Column::IsDeleted
    }
}

/// Public view of an account; never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub profile_image: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl From<Model> for UserDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            phone_number: model.phone_number,
            profile_image: model.profile_image,
            role: model.role,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 100,
        message = "Username must be between 3 and 100 characters"
    ))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(
        min = 2,
        max = 255,
        message = "Full name must be between 2 and 255 characters"
    ))]
    pub full_name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,
    #[validate(url(message = "Invalid profile image URL"))]
    pub profile_image: Option<String>,
    #[validate(custom(function = "validate_user_role"))]
    pub role: Option<String>,
}

impl CreateUserRequest {
    pub fn requested_role(&self) -> UserRole {
        self.role
            .as_deref()
            .and_then(UserRole::parse)
            .unwrap_or(UserRole::Student)
    }

    /// `password_hash` must already be the argon2 PHC string.
    pub fn into_active_model(
        self,
        password_hash: String,
        role: UserRole,
        now: DateTimeUtc,
    ) -> ActiveModel {
        ActiveModel {
            username: Set(self.username),
            email: Set(self.email),
            password_hash: Set(password_hash),
            full_name: Set(self.full_name),
            phone_number: Set(self.phone_number),
            profile_image: Set(self.profile_image),
            role: Set(role),
            is_active: Set(true),
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
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    #[validate(length(
        min = 2,
        max = 255,
        message = "Full name must be between 2 and 255 characters"
    ))]
    pub full_name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,
    #[validate(url(message = "Invalid profile image URL"))]
    pub profile_image: Option<String>,
    #[validate(custom(function = "validate_user_role"))]
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    /// The caller hashes `password` first and passes the result in.
    pub fn apply(self, active: &mut ActiveModel, password_hash: Option<String>, now: DateTimeUtc) {
        if let Some(email) = self.email {
            active.email = Set(email);
        }
        if let Some(hash) = password_hash {
            active.password_hash = Set(hash);
        }
        if let Some(full_name) = self.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(phone) = self.phone_number {
            active.phone_number = Set(Some(phone));
        }
        if let Some(image) = self.profile_image {
            active.profile_image = Set(Some(image));
        }
        if let Some(role) = self.role.as_deref().and_then(UserRole::parse) {
            active.role = Set(role);
        }
        if let Some(is_active) = self.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(now));
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Self-service sign-up; the role is always `Student`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 100,
        message = "Username must be between 3 and 100 characters"
    ))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(
        min = 2,
        max = 255,
        message = "Full name must be between 2 and 255 characters"
    ))]
    pub full_name: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,
}

impl From<RegisterRequest> for CreateUserRequest {
    fn from(r: RegisterRequest) -> Self {
        Self {
            username: r.username,
            email: r.email,
            password: r.password,
            full_name: r.full_name,
            phone_number: r.phone_number,
            profile_image: None,
            role: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

impl RequiredFields for CreateUserRequest {
    const REQUIRED: &'static [&'static str] = &["username", "email", "password", "fullName"];
}

impl RequiredFields for LoginRequest {
    const REQUIRED: &'static [&'static str] = &["username", "password"];
}

impl RequiredFields for RegisterRequest {
    const REQUIRED: &'static [&'static str] = &["username", "email", "password", "fullName"];
}

impl RequiredFields for UpdateUserRequest {}
