//! Admin dashboard DTOs

use serde::{Deserialize, Serialize};
use shared::models::User;

use super::UserResponse;

/// Role filter for the user listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleFilter {
    #[default]
    All,
    Admin,
    Member,
}

/// Query parameters for `GET /admin/api/users`
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    /// Case-insensitive substring matched against username and email
    pub search: Option<String>,
    #[serde(default)]
    pub role: RoleFilter,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl UserListQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.limit < 1 || self.limit > 100 {
            return Err("Limit must be between 1 and 100".to_string());
        }
        if self.offset < 0 {
            return Err("Offset must be non-negative".to_string());
        }
        Ok(())
    }

    /// Whether a user passes the search and role filters
    pub fn matches(&self, user: &User) -> bool {
        let role_ok = match self.role {
            RoleFilter::All => true,
            RoleFilter::Admin => user.is_admin,
            RoleFilter::Member => !user.is_admin,
        };
        if !role_ok {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                user.username.to_lowercase().contains(&term)
                    || user.email.to_lowercase().contains(&term)
            }
        }
    }
}

/// Document counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub users: i64,
    pub admins: i64,
    pub profiles: i64,
    pub messages: i64,
    pub transactions: i64,
}

/// Dashboard summary
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Email of the admin viewing the dashboard
    pub viewer: String,
    pub stats: StatsResponse,
    pub recent_signups: Vec<UserResponse>,
}
