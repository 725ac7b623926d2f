use axum::extract::State;
use serde::Deserialize;

use super::envelope::{ApiPath, ApiQuery, ApiResponse, Created, Empty, Paginated, ValidatedJson, deleted};
use crate::auth::{Claims, Policy};
use crate::domain::{DomainError, PageQuery};
use crate::infrastructure::AppState;
use crate::models::enums::UserRole;
use crate::models::user::{CreateUserRequest, UpdateUserRequest, UserDto};
use crate::services::user_service::{self, UserFilter};

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub role: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    claims: Claims,
    ApiQuery(query): ApiQuery<PageQuery>,
    ApiQuery(params): ApiQuery<UsersQuery>,
) -> Result<Paginated<UserDto>, DomainError> {
    claims.require(Policy::AdminOnly)?;
    let role = match params.role.as_deref() {
        Some(raw) => Some(UserRole::parse(raw).ok_or_else(|| {
            DomainError::invalid_field("role", "Role must be Admin, Manager, Staff, or Student")
        })?),
        None => None,
    };
    let visibility = claims.visibility(query.include_deleted)?;
    let page = user_service::list_users(
        state.db(),
        UserFilter { role },
        visibility,
        query.to_request()?,
    )
    .await?;
    Ok(page.into())
}

pub async fn get_user(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<UserDto>, DomainError> {
    claims.require(Policy::AdminOnly)?;
    Ok(ApiResponse::ok(user_service::get_user(state.db(), id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    claims: Claims,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<Created<UserDto>, DomainError> {
    claims.require(Policy::AdminOnly)?;
    let user = user_service::create_user(state.db(), payload).await?;
    Ok(Created(user, "User created successfully"))
}

pub async fn update_user(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<ApiResponse<UserDto>, DomainError> {
    claims.require(Policy::AdminOnly)?;
    let user = user_service::update_user(state.db(), id, payload).await?;
    Ok(ApiResponse::with_message(user, "User updated successfully"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    claims: Claims,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<Empty>, DomainError> {
    claims.require(Policy::AdminOnly)?;
    if claims.user_id()? == id {
        return Err(DomainError::Conflict("You cannot delete your own account".into()));
    }
    user_service::delete_user(state.db(), id).await?;
    Ok(deleted("User"))
}
