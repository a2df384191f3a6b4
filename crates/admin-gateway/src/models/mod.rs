//! Data Transfer Objects (DTOs) for API requests and responses

pub mod admin;
pub mod auth;
pub mod common;

// Re-exports
pub use admin::*;
pub use auth::*;
pub use common::*;
