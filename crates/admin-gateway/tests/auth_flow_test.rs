//! End-to-end flow: register, login, gate decisions and logout

#[macro_use]
mod common;

use actix_web::{cookie::Cookie, http::StatusCode, test};
use admin_gateway::models::{AuthResponse, DashboardResponse, SessionIdentity, UserResponse};
use common::{InMemoryUserStore, TestGateway, COOKIE_NAME};
use serde_json::json;

fn session_cookie<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE_NAME)
        .map(|c| c.into_owned())
        .expect("response sets the credential cookie")
}

#[actix_web::test]
async fn test_member_promoted_to_admin_gains_dashboard_access() {
    let gw = TestGateway::new(InMemoryUserStore::with_documents(3, 7, 1));
    let app = gateway_app!(gw);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "beatrice",
            "email": "Beatrice@Example.com",
            "password": "much-ado-about"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: UserResponse = test::read_body_json(resp).await;
    assert_eq!(created.email, "beatrice@example.com");
    assert!(!created.is_admin);

    let login = || {
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({
                "email": "beatrice@example.com",
                "password": "much-ado-about"
            }))
            .to_request()
    };

    let resp = test::call_service(&app, login()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let member_cookie = session_cookie(&resp);
    let auth: AuthResponse = test::read_body_json(resp).await;
    assert_eq!(auth.token, member_cookie.value());
    assert!(!auth.user.is_admin);

    // Authenticated routes accept the member
    let req = test::TestRequest::get()
        .uri("/api/protected/me")
        .cookie(member_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: SessionIdentity = test::read_body_json(resp).await;
    assert_eq!(me.email, "beatrice@example.com");

    // Privileged routes do not
    let req = test::TestRequest::get()
        .uri("/admin/api/dashboard")
        .cookie(member_cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get("location").unwrap(), "/unauthorized");

    // Promotion happens out of band and only shows up in a new credential
    gw.store.set_admin("beatrice@example.com", true).await;

    let req = test::TestRequest::get()
        .uri("/admin/api/dashboard")
        .cookie(member_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = test::call_service(&app, login()).await;
    let admin_cookie = session_cookie(&resp);

    let req = test::TestRequest::get()
        .uri("/admin/api/dashboard")
        .cookie(admin_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let dashboard: DashboardResponse = test::read_body_json(resp).await;
    assert_eq!(dashboard.viewer, "beatrice@example.com");
    assert_eq!(dashboard.stats.users, 1);
    assert_eq!(dashboard.stats.admins, 1);
    assert_eq!(dashboard.stats.messages, 7);
    assert_eq!(dashboard.recent_signups.len(), 1);
}

#[actix_web::test]
async fn test_login_records_last_login() {
    let gw = TestGateway::new(InMemoryUserStore::default());
    let app = gateway_app!(gw);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "benedick",
            "email": "benedick@example.com",
            "password": "much-ado-about"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(gw
        .store
        .user("benedick@example.com")
        .await
        .unwrap()
        .last_login_at
        .is_none());

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": "benedick@example.com",
            "password": "much-ado-about"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(gw
        .store
        .user("benedick@example.com")
        .await
        .unwrap()
        .last_login_at
        .is_some());
}

#[actix_web::test]
async fn test_duplicate_email_is_rejected() {
    let gw = TestGateway::new(InMemoryUserStore::default());
    let app = gateway_app!(gw);

    let register = |username: &str| {
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": username,
                "email": "hero@example.com",
                "password": "much-ado-about"
            }))
            .to_request()
    };

    let resp = test::call_service(&app, register("hero")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, register("hero2")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_logout_sends_removal_cookie() {
    let gw = TestGateway::new(InMemoryUserStore::default());
    let app = gateway_app!(gw);

    let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = session_cookie(&resp);
    assert_eq!(cookie.value(), "");

    // A browser honouring the removal sends an empty cookie, which counts as absent
    let req = test::TestRequest::get()
        .uri("/api/protected/me")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get("location").unwrap(), "/login");
}
