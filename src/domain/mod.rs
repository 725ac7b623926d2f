//! Domain layer - business rules that do not touch HTTP
//!
//! Error taxonomy, the paging contract and the contract/room lifecycle rules.

pub mod errors;
pub mod lifecycle;
pub mod pagination;
pub mod validation;

pub use errors::{DomainError, FieldErrors};
pub use pagination::{Page, PageQuery, PageRequest, PaginationMeta};
