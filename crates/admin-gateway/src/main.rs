//! Admin Gateway for the dating-site backend
//!
//! Serves the member auth API and the admin dashboard API behind the
//! path-based access gate.

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use shared::{db, Config};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use admin_gateway::{
    middleware::{self, AccessGate, AccessRules, GatePolicy, RedirectTargets, SecurityHeaders},
    repositories::{PgUserStore, UserStore},
    routes,
    services::{CredentialVerifier, JwtCredentials, SessionCookie},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    shared::init_tracing();

    tracing::info!("Starting Admin Gateway...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let rules = AccessRules::parse(&config.gate.rules).context("Invalid GATE_RULES")?;
    let targets = RedirectTargets::from(&config.gate);
    targets
        .ensure_public(&rules)
        .context("Invalid gate redirect targets")?;
    for rule in rules.rules() {
        tracing::info!(prefix = %rule.prefix(), level = %rule.level(), "Gate rule");
    }

    // One pool for the whole process, handed to every worker
    let db_pool = db::create_pool(&config.database).context("Failed to create database pool")?;
    let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db_pool.clone()));

    let credentials = JwtCredentials::new(&config.server.jwt_secret, config.server.token_ttl_hours);
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(credentials.clone());
    let session_cookie = SessionCookie::from(&config.server);
    let policy = Arc::new(GatePolicy::new(
        rules,
        targets,
        session_cookie.name.clone(),
    ));

    let store_data = web::Data::from(store);
    let credentials_data = web::Data::new(credentials);
    let cookie_data = web::Data::new(session_cookie);

    let server_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Admin Gateway listening on {}", server_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(AccessGate::new(policy.clone(), verifier.clone()))
            .wrap(middleware::cors())
            .wrap(SecurityHeaders::default())
            .wrap(TracingLogger::default())
            .app_data(store_data.clone())
            .app_data(credentials_data.clone())
            .app_data(cookie_data.clone())
            .configure(routes::configure)
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind to {}", server_addr))?
    .run()
    .await
    .context("Server error")?;

    db::close_pool(&db_pool).await;

    Ok(())
}
