//! HTTP-only cookie carrying the credential

use actix_web::cookie::{time::Duration, Cookie, SameSite};

/// Cookie settings shared by login and logout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    /// Cookie holding a freshly issued credential
    pub fn issue(&self, token: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build(self.name.clone(), token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::seconds(max_age_secs))
            .finish()
    }

    /// Expired cookie telling the browser to drop the credential
    pub fn removal(&self) -> Cookie<'static> {
        Cookie::build(self.name.clone(), "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::ZERO)
            .finish()
    }
}

impl From<&shared::ServerConfig> for SessionCookie {
    fn from(config: &shared::ServerConfig) -> Self {
        Self::new(&config.cookie_name, config.cookie_secure)
    }
}
