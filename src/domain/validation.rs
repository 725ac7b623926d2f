//! Custom field validators used by the request DTOs.

use std::borrow::Cow;

use validator::ValidationError;

use crate::models::enums::{
    parse_variant, ContractStatus, InvoiceStatus, RoomStatus, RoomType, StudentStatus, UserRole,
};

/// Request bodies that name the wire keys a client must send.
///
/// The body is decoded with serde defaults so that absent keys do not stop
/// validation; the extractor reports each absent key on its own.
pub trait RequiredFields {
    const REQUIRED: &'static [&'static str] = &[];
}

fn reject(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Digits with optional leading `+` and `space - . ( )` separators, 7-15 digits.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(reject("phone", "Invalid phone number")),
        }
    }
    if (7..=15).contains(&digits) {
        Ok(())
    } else {
        Err(reject("phone", "Invalid phone number"))
    }
}

pub fn validate_room_type(value: &str) -> Result<(), ValidationError> {
    parse_variant::<RoomType>(value)
        .map(|_| ())
        .ok_or_else(|| reject("room_type", "Room type must be Single, Double, Triple, or Quad"))
}

pub fn validate_room_status(value: &str) -> Result<(), ValidationError> {
    parse_variant::<RoomStatus>(value).map(|_| ()).ok_or_else(|| {
        reject(
            "room_status",
            "Status must be Available, Occupied, or Maintenance",
        )
    })
}

pub fn validate_student_status(value: &str) -> Result<(), ValidationError> {
    parse_variant::<StudentStatus>(value)
        .map(|_| ())
        .ok_or_else(|| reject("student_status", "Status must be Active, Inactive, or Graduated"))
}

pub fn validate_contract_status(value: &str) -> Result<(), ValidationError> {
    parse_variant::<ContractStatus>(value).map(|_| ()).ok_or_else(|| {
        reject(
            "contract_status",
            "Status must be Active, Completed, Cancelled, or Pending",
        )
    })
}

pub fn validate_invoice_status(value: &str) -> Result<(), ValidationError> {
    parse_variant::<InvoiceStatus>(value).map(|_| ()).ok_or_else(|| {
        reject(
            "invoice_status",
            "Status must be Unpaid, Paid, Overdue, or Cancelled",
        )
    })
}

pub fn validate_user_role(value: &str) -> Result<(), ValidationError> {
    UserRole::parse(value)
        .map(|_| ())
        .ok_or_else(|| reject("role", "Role must be Admin, Manager, Staff, or Student"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers() {
        assert!(validate_phone("0912345678").is_ok());
        assert!(validate_phone("+84 912-345-678").is_ok());
        assert!(validate_phone("(028) 3835 1234").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("09123abc78").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
    }

    #[test]
    fn enum_fields_carry_messages() {
        let err = validate_room_type("Penthouse").unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("Room type must be Single, Double, Triple, or Quad")
        );
        assert!(validate_room_status("Maintenance").is_ok());
        assert!(validate_student_status("Graduated").is_ok());
        assert!(validate_contract_status("Done").is_err());
        assert!(validate_invoice_status("Overdue").is_ok());
        assert!(validate_user_role("User").is_ok());
        assert!(validate_user_role("Root").is_err());
    }
}
