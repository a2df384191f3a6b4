//! Route configuration for the API
//!
//! Access control is not wired per scope. The `AccessGate` middleware wraps
//! the whole app and decides from the request path alone, so the prefixes
//! below must line up with the configured gate rules.

use actix_web::web;

use crate::handlers;

/// Configure all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Redirect targets of the gate
    cfg.route("/login", web::get().to(handlers::login_entry))
        .route("/unauthorized", web::get().to(handlers::unauthorized_entry));

    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::register))
                    .route("/login", web::post().to(handlers::login))
                    .route("/logout", web::post().to(handlers::logout)),
            )
            // Gated: authenticated
            .service(web::scope("/protected").route("/me", web::get().to(handlers::me))),
    );

    // Gated: privileged
    cfg.service(
        web::scope("/admin/api")
            .route("/stats", web::get().to(handlers::get_stats))
            .route("/users", web::get().to(handlers::list_users))
            .route("/dashboard", web::get().to(handlers::get_dashboard)),
    );
}
