//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The HTTP rendering lives in `api::envelope`.

use std::collections::BTreeMap;

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Per-field validation messages, keyed by the JSON field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or missing input, bad pagination parameters, date ordering
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },
    /// Referenced resource does not exist (or is soft-deleted)
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness violation or illegal state transition
    #[error("{0}")]
    Conflict(String),
    /// Missing or invalid credential
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &str) -> Self {
        DomainError::NotFound(format!("{} not found", entity))
    }

    /// Validation failure with a single offending field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        DomainError::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    /// Validation failure that is not tied to a particular field.
    pub fn invalid(message: impl Into<String>) -> Self {
        DomainError::Validation {
            message: message.into(),
            errors: FieldErrors::new(),
        }
    }
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::warn!("Unique constraint rejected write: {}", detail);
                DomainError::Conflict("A record with the same unique value already exists".into())
            }
            _ => DomainError::Database(e.to_string()),
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(e: ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        collect_field_errors(&e, None, &mut errors);
        DomainError::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }
}

fn collect_field_errors(e: &ValidationErrors, prefix: Option<&str>, out: &mut FieldErrors) {
    for (field, kind) in e.errors() {
        let key = match prefix {
            Some(p) => format!("{}.{}", p, to_camel_case(field)),
            None => to_camel_case(field),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let messages = out.entry(key).or_default();
                for err in errs {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid ({})", to_camel_case(field), err.code));
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, Some(&key), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let indexed = format!("{}[{}]", key, index);
                    collect_field_errors(inner, Some(&indexed), out);
                }
            }
        }
    }
}

/// `monthly_rent` -> `monthlyRent`, matching the wire names of the DTOs.
pub fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{Validate, ValidationError};

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
        month: i32,
        #[validate(length(min = 1, message = "At least one student is required"))]
        student_ids: Vec<i32>,
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(to_camel_case("monthly_rent"), "monthlyRent");
        assert_eq!(to_camel_case("has_air_conditioner"), "hasAirConditioner");
        assert_eq!(to_camel_case("year"), "year");
    }

    #[test]
    fn validation_errors_are_keyed_by_wire_name() {
        let sample = Sample {
            month: 13,
            student_ids: vec![],
        };
        let err = DomainError::from(sample.validate().unwrap_err());
        match err {
            DomainError::Validation { errors, .. } => {
                assert_eq!(errors["month"], vec!["Month must be between 1 and 12"]);
                assert_eq!(errors["studentIds"], vec!["At least one student is required"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_message_falls_back_to_code() {
        let mut errs = ValidationErrors::new();
        errs.add("due_date", ValidationError::new("past"));
        let err = DomainError::from(errs);
        let DomainError::Validation { errors, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors["dueDate"], vec!["dueDate is invalid (past)"]);
    }
}
