//! Common test utilities for integration tests
//!
//! Provides an in-memory [`UserStore`], credential helpers and the
//! [`gateway_app!`] macro that assembles the app the way `main` does.

#![allow(dead_code)]

use admin_gateway::{
    middleware::{AccessRules, GatePolicy, RedirectTargets},
    models::{Claims, SessionIdentity},
    repositories::UserStore,
    services::{CredentialVerifier, JwtCredentials, SessionCookie},
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared::models::{Collection, User};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const TEST_JWT_SECRET: &str = "integration_test_secret_k3J9x2Qv8LmZ0pRt";
pub const COOKIE_NAME: &str = "token";

/// Users kept in memory, newest first
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
    profiles: i64,
    messages: i64,
    transactions: i64,
}

impl InMemoryUserStore {
    pub fn with_documents(profiles: i64, messages: i64, transactions: i64) -> Self {
        Self {
            profiles,
            messages,
            transactions,
            ..Self::default()
        }
    }

    /// Out-of-band privilege change, as an operator would do in the database
    pub async fn set_admin(&self, email: &str, is_admin: bool) {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            user.is_admin = is_admin;
        }
    }

    pub async fn user(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let mut users = self.users.write().await;
        // Mirrors the UNIQUE constraints of the users table
        if users.iter().any(|u| u.username == username) {
            return Err(shared::Error::conflict("username").into());
        }
        if users.iter().any(|u| u.email == email) {
            return Err(shared::Error::conflict("email").into());
        }
        let now = Utc::now();
        let user = User {
            id: format!("user-{}", users.len() + 1),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_admin: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        users.insert(0, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.user(email).await)
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        Ok(self.users.read().await.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.users.read().await.iter().any(|u| u.email == email))
    }

    async fn update_last_login(&self, user_id: &str) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn count(&self, collection: Collection) -> Result<i64> {
        Ok(match collection {
            Collection::Users => self.users.read().await.len() as i64,
            Collection::Profiles => self.profiles,
            Collection::Messages => self.messages,
            Collection::Transactions => self.transactions,
        })
    }

    async fn count_admins(&self) -> Result<i64> {
        Ok(self.users.read().await.iter().filter(|u| u.is_admin).count() as i64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Everything the app needs, built from the default gate rules
pub struct TestGateway {
    pub store: Arc<InMemoryUserStore>,
    pub credentials: JwtCredentials,
    pub policy: Arc<GatePolicy>,
    pub cookie: SessionCookie,
}

impl TestGateway {
    pub fn new(store: InMemoryUserStore) -> Self {
        let rules = AccessRules::parse(shared::config::DEFAULT_GATE_RULES)
            .expect("default gate rules parse");
        Self {
            store: Arc::new(store),
            credentials: JwtCredentials::new(TEST_JWT_SECRET, 1),
            policy: Arc::new(GatePolicy::new(
                rules,
                RedirectTargets::default(),
                COOKIE_NAME,
            )),
            cookie: SessionCookie::new(COOKIE_NAME, false),
        }
    }

    pub fn verifier(&self) -> Arc<dyn CredentialVerifier> {
        Arc::new(self.credentials.clone())
    }

    pub fn store_dyn(&self) -> Arc<dyn UserStore> {
        self.store.clone()
    }

    /// Valid credential for an identity that need not exist in the store
    pub fn token_for(&self, identity: &SessionIdentity) -> String {
        let claims = Claims::new(
            identity.user_id.clone(),
            identity.email.clone(),
            identity.is_admin,
            self.credentials.ttl_secs(),
        );
        self.credentials.sign(&claims).expect("sign test token")
    }

    /// Credential that expired a minute ago
    pub fn expired_token_for(&self, identity: &SessionIdentity) -> String {
        let iat = Utc::now().timestamp() - 7200;
        let claims = Claims::issued_at(
            identity.user_id.clone(),
            identity.email.clone(),
            identity.is_admin,
            iat,
            7200 - 60,
        );
        self.credentials.sign(&claims).expect("sign test token")
    }
}

pub fn admin_identity() -> SessionIdentity {
    SessionIdentity {
        user_id: "admin-1".to_string(),
        email: "admin@example.com".to_string(),
        is_admin: true,
    }
}

pub fn member_identity() -> SessionIdentity {
    SessionIdentity {
        user_id: "member-1".to_string(),
        email: "member@example.com".to_string(),
        is_admin: false,
    }
}

/// Initialise the full gateway service for a [`TestGateway`]
#[macro_export]
macro_rules! gateway_app {
    ($gw:expr) => {{
        let gw = &$gw;
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(admin_gateway::middleware::AccessGate::new(
                    gw.policy.clone(),
                    gw.verifier(),
                ))
                .wrap(admin_gateway::middleware::SecurityHeaders::new(
                    admin_gateway::middleware::SecurityHeadersConfig::default(),
                ))
                .app_data(actix_web::web::Data::from(gw.store_dyn()))
                .app_data(actix_web::web::Data::new(gw.credentials.clone()))
                .app_data(actix_web::web::Data::new(gw.cookie.clone()))
                .configure(admin_gateway::routes::configure),
        )
        .await
    }};
}
