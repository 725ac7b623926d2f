//! Response envelopes and request extractors shared by every handler.
//!
//! Success: `{success: true, message?, data}`
//! Paged:   `{success: true, message?, data: [...], pagination: {...}}`
//! Error:   `{success: false, message, errors?}`

use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use validator::Validate;

use crate::domain::validation::RequiredFields;
use crate::domain::{DomainError, FieldErrors, Page, PaginationMeta, errors::to_camel_case};

const INTERNAL_MESSAGE: &str = "An internal server error occurred. Please try again later.";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// 201 with the created resource.
pub struct Created<T>(pub T, pub &'static str);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (
            StatusCode::CREATED,
            Json(ApiResponse::with_message(self.0, self.1)),
        )
            .into_response()
    }
}

/// Empty `data` object for deletions.
#[derive(Debug, Serialize, Default)]
pub struct Empty {}

pub fn deleted(entity: &str) -> ApiResponse<Empty> {
    ApiResponse::with_message(Empty {}, format!("{} deleted successfully", entity))
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            success: true,
            message: None,
            data: page.items,
            pagination: page.meta,
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    errors: FieldErrors,
}

impl DomainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Database(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, errors) = match self {
            DomainError::Validation { message, errors } => (message, errors),
            DomainError::NotFound(m)
            | DomainError::Conflict(m)
            | DomainError::Unauthorized(m)
            | DomainError::Forbidden(m) => (m, FieldErrors::new()),
            e @ (DomainError::Database(_) | DomainError::Internal(_)) => {
                tracing::error!("Request failed: {}", e);
                (INTERNAL_MESSAGE.to_string(), FieldErrors::new())
            }
        };
        let body = ErrorBody {
            success: false,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

/// JSON body that is deserialized and then validated.
///
/// Every absent required key becomes `{"field": ["field is required"]}` and is
/// reported together with the validator's field errors. Bodies that are not
/// JSON objects, or carry values of the wrong type, are reported under `body`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + RequiredFields,
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| DomainError::invalid_field("body", rejection.body_text()))?;

        let Some(fields) = raw.as_object_mut() else {
            return Err(DomainError::invalid_field("body", "Request body must be a JSON object"));
        };
        let missing: Vec<&str> = T::REQUIRED
            .iter()
            .copied()
            .filter(|key| fields.get(*key).is_none_or(Value::is_null))
            .collect();
        for key in &missing {
            fields.remove(*key);
        }

        let mut errors = FieldErrors::new();
        match serde_json::from_value::<T>(raw) {
            Ok(value) => {
                if let Err(e) = value.validate() {
                    if let DomainError::Validation { errors: found, .. } = DomainError::from(e) {
                        // Defaults stand in for absent keys; only "is required" applies to them.
                        errors.extend(found.into_iter().filter(|(key, _)| !missing.contains(&key.as_str())));
                    }
                }
                if missing.is_empty() && errors.is_empty() {
                    return Ok(ValidatedJson(value));
                }
            }
            Err(e) => {
                if let DomainError::Validation { errors: found, .. } = decode_error(&e.to_string()) {
                    errors.extend(found);
                }
            }
        }
        for key in missing {
            errors.insert(key.to_string(), vec![format!("{} is required", key)]);
        }
        Err(DomainError::Validation {
            message: "Validation failed".to_string(),
            errors,
        })
    }
}

fn decode_error(detail: &str) -> DomainError {
    if let Some(rest) = detail.strip_prefix("missing field `") {
        if let Some(field) = rest.split('`').next() {
            let field = to_camel_case(field);
            return DomainError::invalid_field(&field, format!("{} is required", field));
        }
    }
    DomainError::invalid_field("body", detail.to_string())
}

/// Query string extractor that reports bad parameters in the error envelope.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection| DomainError::invalid_field("query", rejection.body_text()))
    }
}

/// Path parameters that report parse failures in the error envelope.
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ApiPath(value))
            .map_err(|rejection| DomainError::invalid_field("id", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PageRequest;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn conflict_renders_409_envelope() {
        let response = DomainError::Conflict("Room is not available".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Room is not available");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let response = DomainError::Database("disk I/O error at page 7".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn paginated_envelope_carries_totals() {
        let page = Page::new(vec![1, 2], 12, PageRequest::new(2, 5).unwrap());
        let json = body_json(Paginated::from(page).into_response()).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["pagination"]["totalCount"], 12);
        assert_eq!(json["pagination"]["totalPages"], 3);
        assert_eq!(json["pagination"]["hasPreviousPage"], true);
        assert_eq!(json["pagination"]["hasNextPage"], true);
    }

    #[test]
    fn missing_field_is_reported_by_wire_name() {
        match decode_error("missing field `room_id`") {
            DomainError::Validation { errors, .. } => {
                assert_eq!(errors["roomId"], vec!["roomId is required".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
