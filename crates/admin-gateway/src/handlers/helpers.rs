//! Common Handler Helpers
//!
//! - [`validate_request`] - Validate a request or return 400
//! - [`internal_error`] - Log a failure and return a generic 500

use actix_web::HttpResponse;
use std::fmt::Display;
use validator::Validate;

use crate::models::ErrorResponse;

/// Validate a request struct or return 400 Bad Request
pub fn validate_request<T: Validate>(req: &T) -> Result<(), HttpResponse> {
    req.validate().map_err(|e| {
        HttpResponse::BadRequest().json(ErrorResponse::new(
            "validation_error",
            format!("Validation failed: {}", e),
        ))
    })
}

/// Log the underlying error and return a 500 that does not leak it
pub fn internal_error(context: &str, err: impl Display) -> HttpResponse {
    tracing::error!(error = %err, "{}", context);
    HttpResponse::InternalServerError().json(ErrorResponse::new("internal_error", context))
}
