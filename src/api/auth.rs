use axum::extract::State;

use super::envelope::{ApiResponse, Created, ValidatedJson};
use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::user::{LoginRequest, LoginResponse, RegisterRequest, UserDto};
use crate::services::user_service;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token and account"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, DomainError> {
    tracing::info!("Login attempt for user: {}", payload.username);
    let session = user_service::login(state.db(), state.auth(), payload).await?;
    Ok(ApiResponse::with_message(session, "Login successful"))
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Created<UserDto>, DomainError> {
    let user = user_service::register(state.db(), payload).await?;
    Ok(Created(user, "Registration successful"))
}

pub async fn get_me(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<ApiResponse<UserDto>, DomainError> {
    let id = claims.user_id()?;
    let user = user_service::get_user(state.db(), id)
        .await
        .map_err(|e| match e {
            DomainError::NotFound(_) => DomainError::Unauthorized("Account no longer exists".into()),
            other => other,
        })?;
    Ok(ApiResponse::ok(user))
}
