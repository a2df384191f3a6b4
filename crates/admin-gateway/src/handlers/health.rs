//! Health check endpoint

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::repositories::UserStore;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}

/// Health check endpoint
///
/// GET /api/health
///
/// Returns 503 when the document store cannot be reached.
pub async fn health_check(store: web::Data<dyn UserStore>) -> impl Responder {
    let connected = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let response = HealthResponse {
        status: if connected { "healthy" } else { "unhealthy" }.to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    if connected {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
