//! Infrastructure layer
//!
//! - HTTP server assembly (server)
//! - Application state (state)

pub mod server;
pub mod state;

pub use state::AppState;
