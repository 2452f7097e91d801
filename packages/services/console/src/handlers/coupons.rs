//! 쿠폰 프록시
//!
//! 생성 페이로드는 폼에서 그대로 온 값(CSV regions, 문자열 숫자, 체크박스
//! 문자열)을 업스트림 스키마로 정규화한 뒤 전달합니다.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use ops_core::{Error, GridPage};

use crate::auth::RequireAuth;
use crate::state::AppState;
use crate::upstream::{self, ForwardHeaders};

use super::{grid_error_json, upstream_error_json};

#[derive(Debug, Deserialize)]
pub struct CouponsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub q: String,
    #[serde(rename = "isActive")]
    pub is_active: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    // 많이 끌어온다; 그리드가 로컬 페이지네이션
    200
}

/// 쿠폰 리스트 (그리드 데이터)
pub async fn coupons_data(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<CouponsQuery>,
    headers: HeaderMap,
) -> Response {
    let fwd = ForwardHeaders::from_request(&headers);

    let mut params = vec![
        ("page", query.page.to_string()),
        ("limit", query.limit.to_string()),
        ("q", query.q.clone()),
    ];
    if let Some(is_active) = &query.is_active {
        params.push(("isActive", is_active.clone()));
    }

    let result: ops_core::Result<GridPage> = async {
        let reply = state.upstream(&fwd).get_with("/api/coupons", &params).await?;

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
        Err(e) => grid_error_json("coupons", e),
    }
}

/// 쿠폰 생성
pub async fn create_coupon(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let normalized = match normalize_coupon_payload(payload) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": e.message() })),
            )
                .into_response()
        }
    };

    let fwd = ForwardHeaders::from_request(&headers);
    match state.upstream(&fwd).post("/api/coupons", &normalized).await {
        Ok(reply) => (StatusCode::CREATED, Json(reply.body)).into_response(),
        Err(e) => {
            tracing::error!("Create coupon proxy error: {}", e);
            upstream_error_json(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    // boolean이 아니면 422가 아니라 400 + 메시지를 주기 위해 Value로 받는다
    #[serde(rename = "isActive", default)]
    pub is_active: Value,
}

/// 쿠폰 활성/비활성 토글
pub async fn toggle_coupon(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ToggleRequest>,
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
            &format!("/api/coupons/{}/toggle", id),
            &json!({ "isActive": is_active }),
        )
        .await
    {
        Ok(reply) => Json(reply.body).into_response(),
        Err(e) => {
            tracing::error!("Toggle coupon proxy error: {}", e);
            upstream_error_json(e)
        }
    }
}

/// 폼 페이로드를 업스트림 쿠폰 스키마로 정규화
///
/// - `regions`: CSV 문자열이면 trim된 배열로
/// - `type == "amount"`: `amountMinor`만 보낸다 (없으면 `value`에서 승격)
/// - `type == "percent"`: `value`만 보낸다, `amountMinor` 제거
/// - 숫자 필드: 문자열 숫자는 숫자로, 빈 값은 제거
/// - `isActive`: 체크박스 문자열("true"/"on")은 boolean으로
pub(crate) fn normalize_coupon_payload(payload: Value) -> ops_core::Result<Value> {
    let Value::Object(mut map) = payload else {
        return Err(Error::InvalidPayload {
            message: "coupon payload must be a JSON object".to_string(),
        });
    };

    if let Some(Value::String(csv)) = map.get("regions") {
        let regions: Vec<Value> = csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect();
        map.insert("regions".to_string(), Value::Array(regions));
    }

    match map.get("type").and_then(Value::as_str) {
        Some("amount") => {
            // amountMinor가 있으면 그것을, 없으면 value를 승격
            let amount = map
                .remove("amountMinor")
                .filter(|v| !v.is_null())
                .or_else(|| map.remove("value").filter(|v| !v.is_null()));
            map.remove("value");
            if let Some(v) = amount {
                map.insert("amountMinor".to_string(), coerce_number("amountMinor", v)?);
            }
        }
        Some("percent") => {
            if let Some(v) = map.remove("value").filter(|v| !v.is_null()) {
                map.insert("value".to_string(), coerce_number("value", v)?);
            }
            map.remove("amountMinor");
        }
        _ => {}
    }

    for key in ["maxDiscountMinor", "usageLimit", "perUserLimit"] {
        match map.remove(key) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if s.trim().is_empty() => {}
            Some(v) => {
                map.insert(key.to_string(), coerce_number(key, v)?);
            }
        }
    }

    if let Some(Value::String(s)) = map.get("isActive") {
        let active = s == "true" || s == "on";
        map.insert("isActive".to_string(), Value::Bool(active));
    }

    Ok(Value::Object(map))
}

fn coerce_number(field: &str, value: Value) -> ops_core::Result<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(n)),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                Ok(json!(i))
            } else if let Ok(f) = trimmed.parse::<f64>() {
                Ok(json!(f))
            } else {
                Err(Error::InvalidPayload {
                    message: format!("{} must be numeric", field),
                })
            }
        }
        _ => Err(Error::InvalidPayload {
            message: format!("{} must be numeric", field),
        }),
    }
}
