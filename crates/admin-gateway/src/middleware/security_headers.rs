//! Security Headers Middleware
//!
//! Adds response headers suited to an authenticated admin API:
//!
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options` (dashboard data must never be framed)
//! - `Referrer-Policy`
//! - `Cache-Control: no-store` unless the handler set its own policy
//! - `Strict-Transport-Security` when enabled
//! - `Content-Security-Policy` when configured
//!
//! # Environment Configuration
//!
//! - `ENABLE_HSTS`: "true" to send HSTS (default: on in release builds)
//! - `HSTS_MAX_AGE`: HSTS max-age in seconds (default: 31536000)

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderName, HeaderValue},
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    env,
    future::{ready, Ready},
    rc::Rc,
};

/// Security headers configuration
#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    pub enable_hsts: bool,
    pub hsts_max_age: u64,
    /// DENY or SAMEORIGIN
    pub frame_options: String,
    pub content_security_policy: Option<String>,
    pub referrer_policy: String,
}

impl SecurityHeadersConfig {
    /// Defaults with HSTS settings read from the environment
    pub fn from_env() -> Self {
        let enable_hsts = env::var("ENABLE_HSTS")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(!cfg!(debug_assertions));

        let hsts_max_age = env::var("HSTS_MAX_AGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(31_536_000);

        Self {
            enable_hsts,
            hsts_max_age,
            ..Self::default()
        }
    }
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enable_hsts: false,
            hsts_max_age: 31_536_000,
            frame_options: "DENY".to_string(),
            content_security_policy: Some("default-src 'none'; frame-ancestors 'none'".to_string()),
            referrer_policy: "same-origin".to_string(),
        }
    }
}

/// Security headers middleware factory
pub struct SecurityHeaders {
    config: Rc<SecurityHeadersConfig>,
}

impl SecurityHeaders {
    pub fn new(config: SecurityHeadersConfig) -> Self {
        Self {
            config: Rc::new(config),
        }
    }
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self::new(SecurityHeadersConfig::from_env())
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersMiddleware {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct SecurityHeadersMiddleware<S> {
    service: Rc<S>,
    config: Rc<SecurityHeadersConfig>,
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let mut res = service.call(req).await?;
            let headers = res.headers_mut();

            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            );

            if let Ok(value) = HeaderValue::try_from(config.frame_options.as_str()) {
                headers.insert(header::X_FRAME_OPTIONS, value);
            }

            if let Ok(value) = HeaderValue::try_from(config.referrer_policy.as_str()) {
                headers.insert(header::REFERRER_POLICY, value);
            }

            if !headers.contains_key(header::CACHE_CONTROL) {
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            }

            if config.enable_hsts {
                let hsts = format!("max-age={}; includeSubDomains", config.hsts_max_age);
                if let Ok(value) = HeaderValue::try_from(hsts) {
                    headers.insert(header::STRICT_TRANSPORT_SECURITY, value);
                }
            }

            if let Some(csp) = &config.content_security_policy {
                if let Ok(value) = HeaderValue::try_from(csp.as_str()) {
                    headers.insert(HeaderName::from_static("content-security-policy"), value);
                }
            }

            Ok(res)
        })
    }
}
