//! 라우트 핸들러
//!
//! 모든 핸들러는 패스스루입니다: 가드 통과 → 업스트림 호출 → 응답 정규화.
//! 실패는 핸들러 경계에서 잡혀 JSON으로 변환되고, 데이터 엔드포인트는
//! 항상 `items` 필드가 있는 JSON을 돌려줍니다 (바디 없는 5xx 금지).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::ConsoleError;

pub mod admins;
pub mod auth;
pub mod coupons;
pub mod dashboard;
pub mod health;
pub mod memberships;
pub mod submissions;
pub mod users;

pub async fn not_found() -> ConsoleError {
    ConsoleError::NotFound {
        message: "no such route".to_string(),
    }
}

/// 업스트림 실패를 `{status, message}` JSON으로
pub(crate) fn upstream_error_json(e: ops_core::Error) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "message": e.message() }))).into_response()
}

/// 데이터 엔드포인트 실패 응답
///
/// 그리드 계약: 실패해도 `items`는 항상 배열이어야 한다.
pub(crate) fn grid_error_json(context: &str, e: ops_core::Error) -> Response {
    tracing::error!("{} proxy error: {}", context, e);
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "items": [], "total": 0, "message": e.message() })),
    )
        .into_response()
}
