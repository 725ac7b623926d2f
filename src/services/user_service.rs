use chrono::Utc;
use sea_orm::*;

use super::listing::{fetch_page, find_live};
use crate::auth::{self, AuthSettings};
use crate::domain::{DomainError, Page, PageRequest};
use crate::models::enums::UserRole;
use crate::models::user::{
    self, CreateUserRequest, Entity as User, LoginRequest, LoginResponse, RegisterRequest,
    UpdateUserRequest, UserDto,
};
use crate::models::{Visibility, scoped};

#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub role: Option<UserRole>,
}

pub async fn list_users(
    db: &DatabaseConnection,
    filter: UserFilter,
    visibility: Visibility,
    page: PageRequest,
) -> Result<Page<UserDto>, DomainError> {
    let mut select = scoped::<User>(visibility);
    if let Some(role) = filter.role {
        select = select.filter(user::Column::Role.eq(role));
    }
    let select = select.order_by_asc(user::Column::Id);
    Ok(fetch_page(db, select, page).await?.map(UserDto::from))
}

pub async fn get_user(db: &DatabaseConnection, id: i32) -> Result<UserDto, DomainError> {
    Ok(find_live::<User, _>(db, id, "User").await?.into())
}

fn hash(password: &str) -> Result<String, DomainError> {
    auth::hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        DomainError::Internal(e)
    })
}

async fn ensure_unique(
    db: &DatabaseConnection,
    username: Option<&str>,
    email: Option<&str>,
    except: Option<i32>,
) -> Result<(), DomainError> {
    let scope = |column: user::Column, value: &str| {
        let mut query = User::find().filter(column.eq(value));
        if let Some(id) = except {
            query = query.filter(user::Column::Id.ne(id));
        }
        query
    };
    if let Some(username) = username {
        if scope(user::Column::Username, username).count(db).await? > 0 {
            return Err(DomainError::Conflict("Username already exists".into()));
        }
    }
    if let Some(email) = email {
        if scope(user::Column::Email, email).count(db).await? > 0 {
            return Err(DomainError::Conflict("Email already exists".into()));
        }
    }
    Ok(())
}

pub async fn create_user(
    db: &DatabaseConnection,
    request: CreateUserRequest,
) -> Result<UserDto, DomainError> {
    let role = request.requested_role();
    insert_user(db, request, role).await
}

async fn insert_user(
    db: &DatabaseConnection,
    request: CreateUserRequest,
    role: UserRole,
) -> Result<UserDto, DomainError> {
    ensure_unique(db, Some(&request.username), Some(&request.email), None).await?;
    let password_hash = hash(&request.password)?;

    let created = request
        .into_active_model(password_hash, role, Utc::now())
        .insert(db)
        .await?;
    tracing::info!("User {} created with role {:?}", created.username, created.role);
    Ok(created.into())
}

pub async fn update_user(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateUserRequest,
) -> Result<UserDto, DomainError> {
    let existing = find_live::<User, _>(db, id, "User").await?;
    if let Some(email) = request.email.as_deref() {
        if email != existing.email {
            ensure_unique(db, None, Some(email), Some(id)).await?;
        }
    }
    let password_hash = request.password.as_deref().map(hash).transpose()?;

    let mut active: user::ActiveModel = existing.into();
    request.apply(&mut active, password_hash, Utc::now());
    Ok(active.update(db).await?.into())
}

pub async fn delete_user(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let existing = find_live::<User, _>(db, id, "User").await?;
    let mut active: user::ActiveModel = existing.into();
    active.is_deleted = Set(true);
    active.is_active = Set(false);
    active.deleted_at = Set(Some(Utc::now()));
    active.update(db).await?;
    tracing::info!("User {} deleted", id);
    Ok(())
}

/// Verifies credentials and issues a bearer token.
pub async fn login(
    db: &DatabaseConnection,
    settings: &AuthSettings,
    request: LoginRequest,
) -> Result<LoginResponse, DomainError> {
    let invalid = || DomainError::Unauthorized("Invalid credentials".into());

    let Some(account) = User::find()
        .filter(user::Column::Username.eq(request.username.as_str()))
        .filter(user::Column::IsDeleted.eq(false))
        .one(db)
        .await?
    else {
        tracing::warn!("Login failed for unknown user {}", request.username);
        return Err(invalid());
    };

    let verified = auth::verify_password(&request.password, &account.password_hash)
        .map_err(|e| {
            tracing::error!("Stored hash for {} is unreadable: {}", account.username, e);
            invalid()
        })?;
    if !verified || !account.is_active {
        tracing::warn!("Login failed for {}", account.username);
        return Err(invalid());
    }

    let token = auth::create_jwt(settings, account.id, &account.username, account.role)
        .map_err(DomainError::Internal)?;
    tracing::info!("{} logged in", account.username);
    Ok(LoginResponse {
        token,
        user: account.into(),
    })
}

/// Self-service sign-up, always as a Student.
pub async fn register(
    db: &DatabaseConnection,
    request: RegisterRequest,
) -> Result<UserDto, DomainError> {
    insert_user(db, request.into(), UserRole::Student).await
}

/// Creates the first administrator when no live admin exists yet.
pub async fn ensure_admin(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    email: &str,
) -> Result<bool, DomainError> {
    let admins = User::find()
        .filter(user::Column::Role.eq(UserRole::Admin))
        .filter(user::Column::IsDeleted.eq(false))
        .count(db)
        .await?;
    if admins > 0 {
        return Ok(false);
    }

    let request = CreateUserRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        full_name: "Administrator".to_string(),
        phone_number: None,
        profile_image: None,
        role: None,
    };
    insert_user(db, request, UserRole::Admin).await?;
    Ok(true)
}
