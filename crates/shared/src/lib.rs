//! Shared library for the dating-site admin backend
//!
//! This crate provides common functionality used by the gateway binary:
//! - Database connection handle and health probe
//! - Data models matching the PostgreSQL schema
//! - Error handling types
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod db;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, GateConfig, ServerConfig};
pub use db::DbPool;
pub use error::{Error, Result};
pub use models::{Collection, User};

/// Initialize tracing subscriber for structured logging
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shared=debug,admin_gateway=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
