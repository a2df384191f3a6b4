//! Data models matching the PostgreSQL schema (see `database/schema.sql`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Site member account
///
/// `is_admin` is never changed by the application; it is flipped directly in
/// the database by an operator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Document collections owned by the dating site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Profiles,
    Messages,
    Transactions,
}

impl Collection {
    /// Every collection, in dashboard display order
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Profiles,
        Collection::Messages,
        Collection::Transactions,
    ];

    /// Backing table name
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Profiles => "profiles",
            Collection::Messages => "messages",
            Collection::Transactions => "transactions",
        }
    }
}
