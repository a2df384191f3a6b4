//! Request handlers for API endpoints

pub mod admin;
pub mod auth;
pub mod health;
pub mod helpers;

// Re-export commonly used handlers
pub use admin::*;
pub use auth::*;
pub use health::*;
