//! Credential extraction and the session identity extractor
//!
//! Credentials are carried in an HTTP-only cookie (checked first) or an
//! `Authorization: Bearer` header.

use actix_web::{
    dev::Payload, error::ErrorUnauthorized, http::header, Error, FromRequest, HttpMessage,
    HttpRequest,
};
use std::future::{ready, Ready};

use crate::models::SessionIdentity;

/// Pull the raw credential out of a request, if one was presented
///
/// Empty values count as absent.
pub fn extract_credential(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = req.cookie(cookie_name) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    bearer_token(req)
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Identity attached by the access gate
///
/// Rejects with 401 when the route is not covered by a gate rule, which
/// means no identity was attached.
impl FromRequest for SessionIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<SessionIdentity>().cloned();
        ready(identity.ok_or_else(|| {
            tracing::warn!(path = %req.path(), "Session identity requested on an ungated route");
            ErrorUnauthorized("Authentication required")
        }))
    }
}
