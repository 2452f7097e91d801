//! 관리자 계정 관리 프록시

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use ops_core::GridPage;

use crate::auth::RequireAuth;
use crate::error::Result;
use crate::state::AppState;
use crate::upstream::{self, ForwardHeaders};

use super::{grid_error_json, upstream_error_json};

#[derive(Debug, Deserialize)]
pub struct AdminsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

/// 관리자 리스트 (그리드 데이터)
pub async fn admins_data(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminsQuery>,
    headers: HeaderMap,
) -> Response {
    let fwd = ForwardHeaders::from_request(&headers);

    let result: ops_core::Result<GridPage> = async {
        let reply = state
            .upstream(&fwd)
            .get_with(
                "/api/admin-users/admins",
                &[
                    ("page", query.page.to_string()),
                    ("limit", query.limit.to_string()),
                    ("q", query.q.trim().to_string()),
                    ("role", query.role.trim().to_string()),
                    ("status", query.status.trim().to_string()),
                ],
            )
            .await?;

        let envelope = upstream::parse_envelope(reply.body)?;
        let reported_total = envelope.total;
        let items = envelope.into_items()?;
        let total = if reported_total == 0 {
            items.len() as u64
        } else {
            reported_total
        };

        Ok(GridPage::new(items, query.page, query.limit, total))
    }
    .await;

    match result {
        Ok(page) => Json(page).into_response(),
        Err(e) => grid_error_json("admins", e),
    }
}

/// 관리자 생성 (업스트림 signup으로 전달)
pub async fn create_admin(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let fwd = ForwardHeaders::from_request(&headers);

    match state
        .upstream(&fwd)
        .post("/api/admin-users/signup", &payload)
        .await
    {
        Ok(reply) => (StatusCode::CREATED, Json(reply.body)).into_response(),
        Err(e) => upstream_error_json(e),
    }
}

/// 관리자 단건 상세
pub async fn admin_detail(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let fwd = ForwardHeaders::from_request(&headers);
    let reply = state
        .upstream(&fwd)
        .get(&format!("/api/admin-users/admins/{}", id))
        .await?;

    let admin = reply.body.get("admin").cloned().unwrap_or(Value::Null);
    Ok(Json(json!({ "admin": admin })))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    // 의도적으로 Value로 받는다: boolean이 아니면 422가 아니라 400 + 메시지
    #[serde(rename = "isActive", default)]
    pub is_active: Value,
}

/// 관리자 활성/비활성 토글
pub async fn toggle_status(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<StatusRequest>,
) -> Response {
    let Some(is_active) = body.is_active.as_bool() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "isActive must be boolean." })),
        )
            .into_response();
    };

    let fwd = ForwardHeaders::from_request(&headers);
    match state
        .upstream(&fwd)
        .patch(
            &format!("/api/admin-users/admins/{}/active", id),
            &json!({ "isActive": is_active }),
        )
        .await
    {
        Ok(reply) => Json(json!({ "success": true, "data": reply.body })).into_response(),
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({ "success": false, "message": e.message() })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// 다른 관리자의 비밀번호 변경
pub async fn change_password(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<PasswordRequest>,
) -> Response {
    let fwd = ForwardHeaders::from_request(&headers);
    let payload = json!({ "newPassword": body.new_password });

    match state
        .upstream(&fwd)
        .post(
            &format!("/api/admin-users/admins/{}/change-password", id),
            &payload,
        )
        .await
    {
        Ok(reply) => Json(json!({ "success": true, "data": reply.body })).into_response(),
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({ "success": false, "message": e.message() })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OwnPasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// 본인 비밀번호 변경 (설정 화면)
pub async fn change_own_password(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<OwnPasswordRequest>,
) -> Response {
    let fwd = ForwardHeaders::from_request(&headers);
    let payload = json!({
        "oldPassword": body.old_password,
        "newPassword": body.new_password,
    });

    match state
        .upstream(&fwd)
        .post("/api/admin-users/change-password", &payload)
        .await
    {
        Ok(reply) => Json(json!({ "success": true, "data": reply.body })).into_response(),
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({ "success": false, "message": e.message() })),
            )
                .into_response()
        }
    }
}
