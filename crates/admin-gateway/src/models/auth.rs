//! Authentication DTOs and credential claims

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 100))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Login response; the token is also set as an HTTP-only cookie
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// User response (safe for API, without password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<shared::models::User> for UserResponse {
    fn from(user: shared::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,    // Subject (user_id)
    pub email: String,  // Email for display
    pub is_admin: bool, // Privilege flag checked by the access gate
    pub exp: i64,       // Expiration time (as UTC timestamp)
    pub iat: i64,       // Issued at (as UTC timestamp)
}

impl Claims {
    /// Claims issued now, valid for `ttl_secs`
    pub fn new(user_id: String, email: String, is_admin: bool, ttl_secs: i64) -> Self {
        Self::issued_at(
            user_id,
            email,
            is_admin,
            chrono::Utc::now().timestamp(),
            ttl_secs,
        )
    }

    /// Claims with an explicit issuance time
    pub fn issued_at(
        user_id: String,
        email: String,
        is_admin: bool,
        iat: i64,
        ttl_secs: i64,
    ) -> Self {
        Self {
            sub: user_id,
            email,
            is_admin,
            exp: iat + ttl_secs,
            iat,
        }
    }
}

/// Identity decoded from a validated credential
///
/// Attached to the request by the access gate for the duration of one
/// request. Handlers read it; they never re-validate the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<Claims> for SessionIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            is_admin: claims.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    // ========================================================================
    // RegisterRequest validation tests
    // ========================================================================

    #[test]
    fn test_register_request_valid() {
        let req = register_request("romeo", "romeo@example.com", "verona1597");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_request_username_too_short() {
        let req = register_request("ro", "romeo@example.com", "verona1597");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_register_request_invalid_email() {
        let req = register_request("romeo", "not-an-email", "verona1597");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_register_request_password_too_short() {
        let req = register_request("romeo", "romeo@example.com", "short");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_register_request_password_too_long() {
        let req = register_request("romeo", "romeo@example.com", &"a".repeat(101));
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    // ========================================================================
    // LoginRequest validation tests
    // ========================================================================

    #[test]
    fn test_login_request_valid() {
        let req = LoginRequest {
            email: "juliet@example.com".to_string(),
            password: "balcony".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_request_empty_password() {
        let req = LoginRequest {
            email: "juliet@example.com".to_string(),
            password: "".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    // ========================================================================
    // Claims tests
    // ========================================================================

    #[test]
    fn test_claims_new_sets_expiry_from_ttl() {
        let claims = Claims::new("user-123".to_string(), "a@example.com".to_string(), true, 3600);

        assert_eq!(claims.sub, "user-123");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_claims_issued_at_in_the_past() {
        let claims = Claims::issued_at(
            "user-123".to_string(),
            "a@example.com".to_string(),
            false,
            1_000,
            60,
        );

        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, 1_060);
    }
}
