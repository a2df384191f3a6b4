//! Admin dashboard handlers
//!
//! Every route here sits under `/admin`, so the access gate has already
//! rejected callers without the admin privilege by the time a handler runs.

use actix_web::{web, HttpResponse, Responder};
use shared::models::Collection;

use super::helpers::internal_error;
use crate::{
    models::{
        DashboardResponse, ErrorResponse, PaginatedResponse, PaginationMeta, SessionIdentity,
        StatsResponse, UserListQuery, UserResponse,
    },
    repositories::UserStore,
};

const RECENT_SIGNUPS: usize = 5;

/// Count every collection shown on the dashboard
pub async fn load_stats(store: &dyn UserStore) -> anyhow::Result<StatsResponse> {
    Ok(StatsResponse {
        users: store.count(Collection::Users).await?,
        admins: store.count_admins().await?,
        profiles: store.count(Collection::Profiles).await?,
        messages: store.count(Collection::Messages).await?,
        transactions: store.count(Collection::Transactions).await?,
    })
}

/// Collection counts
///
/// GET /admin/api/stats
pub async fn get_stats(store: web::Data<dyn UserStore>) -> impl Responder {
    match load_stats(store.get_ref()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => internal_error("Failed to load stats", e),
    }
}

/// Search and page through registered users
///
/// GET /admin/api/users
pub async fn list_users(
    store: web::Data<dyn UserStore>,
    query: web::Query<UserListQuery>,
) -> impl Responder {
    if let Err(msg) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("validation_error", msg));
    }

    let users = match store.list().await {
        Ok(users) => users,
        Err(e) => return internal_error("Failed to list users", e),
    };

    let matching: Vec<_> = users.into_iter().filter(|u| query.matches(u)).collect();
    let total = matching.len() as i64;

    let data: Vec<UserResponse> = matching
        .into_iter()
        .skip(query.offset as usize)
        .take(query.limit as usize)
        .map(UserResponse::from)
        .collect();

    HttpResponse::Ok().json(PaginatedResponse {
        data,
        pagination: PaginationMeta::new(total, query.limit, query.offset),
    })
}

/// Stats plus the latest signups
///
/// GET /admin/api/dashboard
pub async fn get_dashboard(
    store: web::Data<dyn UserStore>,
    identity: SessionIdentity,
) -> impl Responder {
    let stats = match load_stats(store.get_ref()).await {
        Ok(stats) => stats,
        Err(e) => return internal_error("Failed to load dashboard", e),
    };

    let recent_signups = match store.list().await {
        Ok(users) => users
            .into_iter()
            .take(RECENT_SIGNUPS)
            .map(UserResponse::from)
            .collect(),
        Err(e) => return internal_error("Failed to load dashboard", e),
    };

    tracing::debug!(viewer = %identity.email, "Dashboard viewed");

    HttpResponse::Ok().json(DashboardResponse {
        viewer: identity.email,
        stats,
        recent_signups,
    })
}
