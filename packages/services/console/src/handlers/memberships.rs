//! 멤버십 (구매 내역)
//!
//! 업스트림 purchases 리스트를 전 페이지 순차 수집한 뒤 그리드용으로 한 번만
//! 재구성합니다. 클라이언트가 로컬 페이지네이션을 하므로 메타는 단일
//! 페이지로 내려갑니다.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::RequireAuth;
use crate::error::Result;
use crate::state::AppState;
use crate::upstream::ForwardHeaders;

const EMPTY_CELL: &str = "—";

#[derive(Debug, Deserialize)]
pub struct MembershipsQuery {
    pub limit: Option<u64>,
}

pub async fn memberships(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<MembershipsQuery>,
    headers: HeaderMap,
) -> Response {
    let fwd = ForwardHeaders::from_request(&headers);

    // 업스트림이 limit을 clamp할 수 있으므로 크게 요청하되 페이지 루프로 보완
    let limit = query
        .limit
        .unwrap_or(state.config.purchases_page_limit)
        .max(1);
    let hard_cap = state.config.purchases_hard_cap;

    match state
        .upstream(&fwd)
        .aggregate_pages("/api/all/purchases", limit, hard_cap)
        .await
    {
        Ok(purchases) => {
            let items: Vec<Value> = purchases.iter().map(purchase_row).collect();
            let total = items.len() as u64;
            Json(json!({
                "items": items,
                "page": 1,
                "pages": 1,
                "limit": total,
                "total": total,
            }))
            .into_response()
        }
        Err(e) => {
            tracing::error!("Purchases aggregation failed: {}", e);
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({
                    "items": [],
                    "page": 1,
                    "pages": 1,
                    "limit": limit,
                    "total": 0,
                    "message": e.message(),
                })),
            )
                .into_response()
        }
    }
}

pub async fn membership_plans(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let fwd = ForwardHeaders::from_request(&headers);
    let reply = state.upstream(&fwd).get("/api/memberships").await?;

    let plans = reply.body.get("plans").cloned().unwrap_or_else(|| json!([]));
    Ok(Json(json!({ "plans": plans })))
}

/// 구매 한 건을 그리드 행으로 재구성
fn purchase_row(p: &Value) -> Value {
    let user = p.get("user");
    let user_name = user
        .and_then(|u| u.get("username").and_then(Value::as_str))
        .or_else(|| user.and_then(|u| u.get("name").and_then(Value::as_str)))
        .unwrap_or(EMPTY_CELL);
    let user_email = user
        .and_then(|u| u.get("email").and_then(Value::as_str))
        .unwrap_or(EMPTY_CELL);

    json!({
        "id": p.get("id").cloned().unwrap_or(Value::Null),
        "userName": user_name,
        "userEmail": user_email,
        "planName": p.get("planName").cloned().unwrap_or(Value::Null),
        "durationDays": p.get("durationDays").cloned().unwrap_or(Value::Null),
        "couponCode": p.get("couponCode").and_then(Value::as_str).unwrap_or(EMPTY_CELL),
        "provider": p.get("provider").cloned().unwrap_or(Value::Null),
        "transactionId": p.get("transactionId").cloned().unwrap_or(Value::Null),
        "currency": p.get("currency").cloned().unwrap_or(Value::Null),
        "base": minor_to_major(p, "baseAmountMinor"),
        "discount": minor_to_major(p, "discountMinor"),
        "final": minor_to_major(p, "finalAmountMinor"),
        "region": p.get("region").cloned().unwrap_or(Value::Null),
        "paid": p.get("paid").and_then(Value::as_bool).unwrap_or(false),
        "createdAt": p.get("createdAt").cloned().unwrap_or(Value::Null),
    })
}

/// 최소 단위 금액(minor units) → 주 단위
fn minor_to_major(p: &Value, key: &str) -> f64 {
    p.get(key).and_then(Value::as_f64).unwrap_or(0.0) / 100.0
}
