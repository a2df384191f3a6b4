//! Middleware for the admin gateway

pub mod access_gate;
pub mod cors;
pub mod identity;
pub mod security_headers;

pub use access_gate::{
    evaluate, AccessGate, AccessRules, Admission, GateError, GatePolicy, PathRule,
    ProtectionLevel, RedirectTargets,
};
pub use cors::cors;
pub use identity::extract_credential;
pub use security_headers::{SecurityHeaders, SecurityHeadersConfig};
