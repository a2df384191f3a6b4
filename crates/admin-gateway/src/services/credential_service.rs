//! Credential Service
//!
//! Issues and validates the signed, time-bounded credentials (HS256 JWTs)
//! presented on every request after login.
//!
//! The access gate only needs the validation half and consumes it through
//! [`CredentialVerifier`], so tests can substitute their own verifier.
//!
//! # Usage
//!
//! ```rust,ignore
//! let credentials = JwtCredentials::new(&config.server.jwt_secret, config.server.token_ttl_hours);
//! let token = credentials.issue(&user)?;
//! let identity = credentials.verify(&token)?;
//! ```

use crate::models::{Claims, SessionIdentity};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use shared::{config::MAX_TOKEN_TTL_HOURS, models::User};

/// Why a credential was rejected
///
/// The variants exist for logs and tests. The access gate treats every
/// variant the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("credential expired")]
    Expired,

    #[error("credential signature is invalid")]
    InvalidSignature,

    #[error("credential is malformed")]
    Malformed,

    #[error("failed to sign credential: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for CredentialError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => CredentialError::Expired,
            ErrorKind::InvalidSignature => CredentialError::InvalidSignature,
            _ => CredentialError::Malformed,
        }
    }
}

/// Validates a presented credential
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<SessionIdentity, CredentialError>;
}

/// HS256 credential issuer and verifier
#[derive(Clone)]
pub struct JwtCredentials {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtCredentials {
    /// `ttl_hours` is clamped to `1..=MAX_TOKEN_TTL_HOURS`
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let ttl_hours = ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS);
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: ttl_hours * 3600,
        }
    }

    /// Credential lifetime in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue a credential for a user, carrying their current privilege flag
    pub fn issue(&self, user: &User) -> Result<String, CredentialError> {
        let claims = Claims::new(
            user.id.clone(),
            user.email.clone(),
            user.is_admin,
            self.ttl_secs,
        );
        self.sign(&claims)
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, CredentialError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to generate JWT");
            CredentialError::Signing(e.to_string())
        })
    }
}

impl CredentialVerifier for JwtCredentials {
    fn verify(&self, token: &str) -> Result<SessionIdentity, CredentialError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(SessionIdentity::from(data.claims))
    }
}
