//! Repository layer for database access

pub mod users;

// Re-exports
pub use users::{PgUserStore, UserStore};

#[cfg(test)]
pub use users::MockUserStore;
