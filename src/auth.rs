use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::domain::DomainError;
use crate::models::Visibility;
use crate::models::enums::UserRole;

/// Token signing parameters, read once at startup.
#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expire_minutes: i64,
}

impl AuthSettings {
    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "dormitory-dev-secret".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });
        Self {
            secret,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "dormitory".to_string()),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "dormitory-users".to_string()),
            expire_minutes: env::var("JWT_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    pub fn for_tests() -> Self {
        Self {
            secret: "test-secret".to_string(),
            issuer: "dormitory".to_string(),
            audience: "dormitory-users".to_string(),
            expire_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub role: UserRole,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i32, DomainError> {
        self.sub
            .parse()
            .map_err(|_| DomainError::Unauthorized("Invalid or expired token".into()))
    }

    pub fn require(&self, policy: Policy) -> Result<(), DomainError> {
        if policy.allows(self.role) {
            Ok(())
        } else {
            tracing::warn!(
                "{} ({:?}) denied by {:?} policy",
                self.username,
                self.role,
                policy
            );
            Err(DomainError::Forbidden(
                "You do not have permission to perform this action".into(),
            ))
        }
    }

    /// Only administrators may look at soft-deleted rows.
    pub fn visibility(&self, include_deleted: bool) -> Result<Visibility, DomainError> {
        if include_deleted {
            self.require(Policy::AdminOnly)?;
        }
        Ok(Visibility::from_flag(include_deleted))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    AdminOnly,
    ManagerOrAdmin,
    StaffOrAbove,
    Authenticated,
}

impl Policy {
    pub fn allows(self, role: UserRole) -> bool {
        match self {
            Policy::AdminOnly => role == UserRole::Admin,
            Policy::ManagerOrAdmin => matches!(role, UserRole::Admin | UserRole::Manager),
            Policy::StaffOrAbove => {
                matches!(role, UserRole::Admin | UserRole::Manager | UserRole::Staff)
            }
            Policy::Authenticated => true,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    AuthSettings: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| DomainError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            DomainError::Unauthorized("Invalid Authorization header format".into())
        })?;

        let settings = AuthSettings::from_ref(state);
        decode_jwt(&settings, token).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            DomainError::Unauthorized("Invalid or expired token".into())
        })
    }
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn create_jwt(
    settings: &AuthSettings,
    user_id: i32,
    username: &str,
    role: UserRole,
) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::minutes(settings.expire_minutes))
        .ok_or_else(|| "token expiry overflows".to_string())?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_owned(),
        role,
        exp: expiration as usize,
        iss: settings.issuer.clone(),
        aud: settings.audience.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn decode_jwt(settings: &AuthSettings, token: &str) -> Result<Claims, String> {
    let mut validation = Validation::default();
    validation.set_issuer(&[settings.issuer.as_str()]);
    validation.set_audience(&[settings.audience.as_str()]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_rejects_other_passwords() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(verify_password("s3cret!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn token_from_another_audience_is_rejected() {
        let settings = AuthSettings::for_tests();
        let token = create_jwt(&settings, 4, "warden", UserRole::Manager).unwrap();
        let claims = decode_jwt(&settings, &token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 4);
        assert_eq!(claims.role, UserRole::Manager);

        let other = AuthSettings {
            audience: "someone-else".into(),
            ..AuthSettings::for_tests()
        };
        assert!(decode_jwt(&other, &token).is_err());
    }

    #[test]
    fn policies_follow_role_ladder() {
        assert!(Policy::AdminOnly.allows(UserRole::Admin));
        assert!(!Policy::AdminOnly.allows(UserRole::Manager));
        assert!(Policy::ManagerOrAdmin.allows(UserRole::Manager));
        assert!(!Policy::ManagerOrAdmin.allows(UserRole::Staff));
        assert!(Policy::StaffOrAbove.allows(UserRole::Staff));
        assert!(!Policy::StaffOrAbove.allows(UserRole::Student));
        assert!(Policy::Authenticated.allows(UserRole::Student));
    }
}
