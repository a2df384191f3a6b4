//! Access Gate Middleware
//!
//! Decides, for every request, whether it may proceed, must be sent to the
//! login page, or must be sent to the unauthorized page.
//!
//! # Decision
//!
//! 1. Path matches no protected prefix: allow, no further checks.
//! 2. Protected path, no credential: `Unauthenticated`.
//! 3. Credential fails validation for any reason (forged, malformed,
//!    expired): `Unauthenticated`. The reason is never exposed.
//! 4. Privileged path, credential lacks the privilege flag: `Unauthorized`.
//! 5. Otherwise allow and attach the [`SessionIdentity`] to the request.
//!
//! Both failures end the request with a `302 Found` redirect.
//!
//! # Rules
//!
//! A prefix covers the path itself and everything below it on a segment
//! boundary: `/admin` covers `/admin` and `/admin/users`, not `/administrator`.
//! When several rules cover a path the strictest level applies.
//!
//! ```ignore
//! let rules = AccessRules::parse("/admin=privileged,/api/protected=authenticated")?;
//! let policy = GatePolicy::new(rules, RedirectTargets::default(), "token");
//!
//! let app = App::new()
//!     .wrap(AccessGate::new(Arc::new(policy), verifier))
//!     // ... routes
//! ```

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    fmt,
    future::{ready, Ready},
    rc::Rc,
    str::FromStr,
    sync::Arc,
};
use tracing::debug;

use crate::middleware::identity::extract_credential;
use crate::models::SessionIdentity;
use crate::services::CredentialVerifier;

/// Protection required for a path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtectionLevel {
    #[default]
    None,
    Authenticated,
    Privileged,
}

impl ProtectionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectionLevel::None => "none",
            ProtectionLevel::Authenticated => "authenticated",
            ProtectionLevel::Privileged => "privileged",
        }
    }
}

impl fmt::Display for ProtectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtectionLevel {
    type Err = shared::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(ProtectionLevel::None),
            "authenticated" => Ok(ProtectionLevel::Authenticated),
            "privileged" => Ok(ProtectionLevel::Privileged),
            other => Err(shared::Error::config(format!(
                "Unknown protection level '{}' (expected none, authenticated or privileged)",
                other
            ))),
        }
    }
}

/// A path prefix and the level it requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRule {
    prefix: String,
    level: ProtectionLevel,
}

impl PathRule {
    /// Build a rule; the prefix must start with `/`, trailing slashes are dropped
    pub fn new(prefix: &str, level: ProtectionLevel) -> shared::Result<Self> {
        let prefix = prefix.trim();
        if !prefix.starts_with('/') {
            return Err(shared::Error::config(format!(
                "Gate prefix '{}' must start with '/'",
                prefix
            )));
        }

        let trimmed = prefix.trim_end_matches('/');
        let prefix = if trimmed.is_empty() { "/" } else { trimmed };

        Ok(Self {
            prefix: prefix.to_string(),
            level,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn level(&self) -> ProtectionLevel {
        self.level
    }

    /// Whether the rule covers `path`
    pub fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return true;
        }

        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Ordered set of path rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRules {
    rules: Vec<PathRule>,
}

impl AccessRules {
    pub fn new(rules: Vec<PathRule>) -> Self {
        Self { rules }
    }

    /// Parse comma-separated `prefix=level` pairs
    pub fn parse(raw: &str) -> shared::Result<Self> {
        let rules = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (prefix, level) = entry.split_once('=').ok_or_else(|| {
                    shared::Error::config(format!(
                        "Gate rule '{}' must look like prefix=level",
                        entry
                    ))
                })?;
                PathRule::new(prefix, level.parse()?)
            })
            .collect::<shared::Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[PathRule] {
        &self.rules
    }

    /// Strictest level among the rules covering `path`
    pub fn required_level(&self, path: &str) -> ProtectionLevel {
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .map(PathRule::level)
            .max()
            .unwrap_or_default()
    }
}

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// No credential, or the credential failed validation
    #[error("authentication required")]
    Unauthenticated,

    /// Valid credential without the required privilege
    #[error("insufficient privilege")]
    Unauthorized,
}

/// Successful gate outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// No rule protects the path; the credential was not inspected
    Public,
    /// Protected path, credential accepted
    Granted(SessionIdentity),
}

/// Evaluate the gate for one request
///
/// Pure: no logging, no shared state, same answer for the same input.
pub fn evaluate(
    rules: &AccessRules,
    path: &str,
    credential: Option<&str>,
    verifier: &dyn CredentialVerifier,
) -> Result<Admission, GateError> {
    let required = rules.required_level(path);
    if required == ProtectionLevel::None {
        return Ok(Admission::Public);
    }

    let token = credential.ok_or(GateError::Unauthenticated)?;
    let identity = verifier
        .verify(token)
        .map_err(|_| GateError::Unauthenticated)?;

    if required == ProtectionLevel::Privileged && !identity.is_admin {
        return Err(GateError::Unauthorized);
    }

    Ok(Admission::Granted(identity))
}

/// Where rejected requests are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTargets {
    pub login: String,
    pub unauthorized: String,
}

impl RedirectTargets {
    pub fn new(login: impl Into<String>, unauthorized: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            unauthorized: unauthorized.into(),
        }
    }

    pub fn location(&self, err: GateError) -> &str {
        match err {
            GateError::Unauthenticated => &self.login,
            GateError::Unauthorized => &self.unauthorized,
        }
    }

    /// Reject targets that a protecting rule covers
    ///
    /// A protected login page would redirect to itself forever.
    pub fn ensure_public(&self, rules: &AccessRules) -> shared::Result<()> {
        for (name, target) in [("login", &self.login), ("unauthorized", &self.unauthorized)] {
            if !target.starts_with('/') {
                return Err(shared::Error::config(format!(
                    "Gate {} path '{}' must start with '/'",
                    name, target
                )));
            }
            let level = rules.required_level(target);
            if level != ProtectionLevel::None {
                return Err(shared::Error::config(format!(
                    "Gate {} path '{}' is covered by a {} rule",
                    name, target, level
                )));
            }
        }
        Ok(())
    }
}

impl Default for RedirectTargets {
    fn default() -> Self {
        Self::new("/login", "/unauthorized")
    }
}

impl From<&shared::GateConfig> for RedirectTargets {
    fn from(config: &shared::GateConfig) -> Self {
        Self::new(&config.login_path, &config.unauthorized_path)
    }
}

/// Redirect response for a gate failure
pub fn redirect_response(targets: &RedirectTargets, err: GateError) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, targets.location(err)))
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Everything the gate needs besides the verifier
#[derive(Debug, Clone)]
pub struct GatePolicy {
    pub rules: AccessRules,
    pub targets: RedirectTargets,
    pub cookie_name: String,
}

impl GatePolicy {
    pub fn new(rules: AccessRules, targets: RedirectTargets, cookie_name: impl Into<String>) -> Self {
        Self {
            rules,
            targets,
            cookie_name: cookie_name.into(),
        }
    }
}

/// Access gate middleware factory
#[derive(Clone)]
pub struct AccessGate {
    policy: Arc<GatePolicy>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl AccessGate {
    pub fn new(policy: Arc<GatePolicy>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { policy, verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateMiddleware {
            service: Rc::new(service),
            policy: self.policy.clone(),
            verifier: self.verifier.clone(),
        }))
    }
}

/// Path as the router sees it
///
/// `req.path()` is the raw URI path, while routing uses the requoted form in
/// which `%61dmin` is `admin`. Rules must be checked against the latter.
fn routed_path(req: &ServiceRequest) -> &str {
    req.match_info().as_str()
}

pub struct AccessGateMiddleware<S> {
    service: Rc<S>,
    policy: Arc<GatePolicy>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl<S, B> Service<ServiceRequest> for AccessGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let credential = extract_credential(req.request(), &self.policy.cookie_name);
        let decision = evaluate(
            &self.policy.rules,
            routed_path(&req),
            credential.as_deref(),
            self.verifier.as_ref(),
        );

        match decision {
            Ok(admission) => {
                if let Admission::Granted(identity) = admission {
                    req.extensions_mut().insert(identity);
                }

                let service = self.service.clone();
                Box::pin(async move {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => {
                debug!(
                    path = %routed_path(&req),
                    location = %self.policy.targets.location(err),
                    "Request redirected by access gate"
                );

                let response = redirect_response(&self.policy.targets, err);
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}
