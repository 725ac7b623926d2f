//! Services Layer
//!
//! Business rules over the store, free of HTTP concerns. Handlers call these
//! with the shared connection; multi-row writes open their own transaction.

pub mod building_service;
pub mod contract_service;
pub mod floor_service;
pub mod invoice_service;
pub mod listing;
pub mod room_service;
pub mod student_service;
pub mod user_service;
