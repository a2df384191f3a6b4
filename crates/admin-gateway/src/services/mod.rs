//! Business logic services

pub mod credential_service;
pub mod password;
pub mod session_cookie;

pub use credential_service::{CredentialError, CredentialVerifier, JwtCredentials};
pub use password::{hash_password, verify_password};
pub use session_cookie::SessionCookie;
