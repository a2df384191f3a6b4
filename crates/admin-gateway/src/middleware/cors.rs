//! CORS Middleware
//!
//! The dashboard frontend authenticates with an HTTP-only cookie, so
//! credentials are allowed and origins must match an explicit whitelist.
//!
//! # Environment Configuration
//!
//! - `CORS_ALLOWED_ORIGINS`: Comma-separated list of allowed origins
//!   - Development default: `http://localhost:3000,http://localhost:5173`
//!   - Production: must be set, HTTPS only
//! - `ENVIRONMENT`: Set to "production" to enforce HTTPS-only origins

use actix_cors::Cors;
use actix_web::http::header;
use std::env;
use tracing::{debug, warn};

/// Create CORS middleware from the environment
pub fn cors() -> Cors {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let is_production = environment.eq_ignore_ascii_case("production");

    let raw = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| {
        if is_production {
            warn!("CORS_ALLOWED_ORIGINS not set in production! Cross-origin requests will be refused.");
            String::new()
        } else {
            "http://localhost:3000,http://localhost:5173".to_string()
        }
    });

    cors_for_origins(&allowed_origins(&raw, is_production))
}

/// Build CORS middleware for an explicit origin list
pub fn cors_for_origins(origins: &[String]) -> Cors {
    debug!("CORS middleware initialized with {} allowed origins", origins.len());

    let mut cors = Cors::default();
    for origin in origins {
        cors = cors.allowed_origin(origin);
    }

    cors.allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}

/// Parse and filter a comma-separated origin list
///
/// Wildcards and malformed origins are always dropped; plain HTTP origins are
/// dropped in production.
fn allowed_origins(raw: &str, is_production: bool) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|origin| {
            if *origin == "*" {
                warn!("Wildcard (*) origin is not allowed with credentialed CORS");
                return false;
            }
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                warn!(origin = %origin, "Invalid origin format, must start with http:// or https://");
                return false;
            }
            if is_production && !origin.starts_with("https://") {
                warn!(origin = %origin, "Rejecting non-HTTPS origin in production");
                return false;
            }
            true
        })
        .map(str::to_string)
        .collect()
}
