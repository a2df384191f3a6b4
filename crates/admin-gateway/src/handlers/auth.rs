//! Authentication handlers

use actix_web::{web, HttpResponse, Responder};

use super::helpers::{internal_error, validate_request};
use crate::{
    models::{
        AuthResponse, ErrorResponse, LoginRequest, MessageResponse, RegisterRequest,
        SessionIdentity, UserResponse,
    },
    repositories::UserStore,
    services::{hash_password, verify_password, JwtCredentials, SessionCookie},
};

/// Register a new member account
///
/// POST /api/auth/register
pub async fn register(
    store: web::Data<dyn UserStore>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    if let Err(resp) = validate_request(&req.0) {
        return resp;
    }

    let username = req.username.trim();
    let email = req.email.trim().to_lowercase();

    match store.username_exists(username).await {
        Ok(true) => return conflict("username"),
        Err(e) => return internal_error("Failed to process registration", e),
        _ => {}
    }

    match store.email_exists(&email).await {
        Ok(true) => return conflict("email"),
        Err(e) => return internal_error("Failed to process registration", e),
        _ => {}
    }

    let password_hash = match hash_password(&req.password) {
        Ok(hash) => hash,
        Err(e) => return internal_error("Failed to process registration", e),
    };

    match store.create(username, &email, &password_hash).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            HttpResponse::Created().json(UserResponse::from(user))
        }
        Err(e) => match e.downcast_ref::<shared::Error>() {
            Some(shared::Error::Conflict(field)) => conflict(field),
            _ => internal_error("Failed to create user", e),
        },
    }
}

fn conflict(field: &str) -> HttpResponse {
    let body = if field == "username" {
        ErrorResponse::new("username_exists", "Username already taken")
    } else {
        ErrorResponse::new("email_exists", "Email already registered")
    };
    HttpResponse::Conflict().json(body)
}

/// Login with email and password
///
/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same response.
pub async fn login(
    store: web::Data<dyn UserStore>,
    credentials: web::Data<JwtCredentials>,
    cookie: web::Data<SessionCookie>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    if let Err(resp) = validate_request(&req.0) {
        return resp;
    }

    let email = req.email.trim().to_lowercase();

    let user = match store.find_by_email(&email).await {
        Ok(Some(user)) if verify_password(&req.password, &user.password_hash) => user,
        Ok(_) => {
            return HttpResponse::Unauthorized().json(ErrorResponse::new(
                "invalid_credentials",
                "Invalid credentials",
            ));
        }
        Err(e) => return internal_error("Failed to process login", e),
    };

    if let Err(e) = store.update_last_login(&user.id).await {
        tracing::warn!(error = %e, user_id = %user.id, "Failed to update last login");
    }

    let token = match credentials.issue(&user) {
        Ok(token) => token,
        Err(e) => return internal_error("Failed to generate authentication token", e),
    };

    tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User logged in");

    let expires_in = credentials.ttl_secs();
    HttpResponse::Ok()
        .cookie(cookie.issue(token.clone(), expires_in))
        .json(AuthResponse {
            token,
            expires_in,
            user: UserResponse::from(user),
        })
}

/// Drop the credential cookie
///
/// POST /api/auth/logout
pub async fn logout(cookie: web::Data<SessionCookie>) -> impl Responder {
    HttpResponse::Ok()
        .cookie(cookie.removal())
        .json(MessageResponse::new("Logged out"))
}

/// Identity of the caller
///
/// GET /api/protected/me
pub async fn me(identity: SessionIdentity) -> impl Responder {
    HttpResponse::Ok().json(identity)
}

/// Login entry point that unauthenticated requests are redirected to
///
/// GET /login
pub async fn login_entry() -> impl Responder {
    HttpResponse::Ok().json(ErrorResponse::new(
        "authentication_required",
        "Sign in with POST /api/auth/login",
    ))
}

/// Landing page for authenticated callers lacking the admin privilege
///
/// GET /unauthorized
pub async fn unauthorized_entry() -> impl Responder {
    HttpResponse::Forbidden().json(ErrorResponse::new(
        "unauthorized",
        "Your account does not have access to this page",
    ))
}
