//! 어드민 콘솔 게이트웨이
//!
//! 스태프용 얇은 서버입니다. 세션 쿠키를 업스트림 identity API로 매 요청
//! 재검증하고, CRUD성 요청을 업스트림으로 프록시하며, 브라우저 그리드가
//! 쓰는 JSON을 정규화해 내려보냅니다. 이 서비스는 어떤 데이터도 직접
//! 소유하지 않습니다.

use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod upstream;

pub use config::Config;
pub use state::AppState;

/// 라우터 생성
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth surface
        .route("/", get(handlers::auth::login_page))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/whoami", get(handlers::auth::whoami))
        // Dashboard / memberships
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route("/memberships", get(handlers::memberships::memberships))
        .route(
            "/membership-plans",
            get(handlers::memberships::membership_plans),
        )
        // Admin users
        .route("/admins/data", get(handlers::admins::admins_data))
        .route("/admin-users", post(handlers::admins::create_admin))
        .route("/admin/{id}", get(handlers::admins::admin_detail))
        .route("/admin/{id}/status", post(handlers::admins::toggle_status))
        .route(
            "/admin/{id}/password",
            post(handlers::admins::change_password),
        )
        .route(
            "/settings/password",
            post(handlers::admins::change_own_password),
        )
        // App users / coupons / form submissions
        .route("/users/data", get(handlers::users::users_data))
        .route("/coupons/data", get(handlers::coupons::coupons_data))
        .route("/coupons", post(handlers::coupons::create_coupon))
        .route(
            "/coupons/{id}/toggle",
            patch(handlers::coupons::toggle_coupon),
        )
        .route(
            "/form/submissions/data",
            get(handlers::submissions::submissions_data),
        )
        // Health check
        .route("/health", get(handlers::health::health_check))
        .fallback(handlers::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}
