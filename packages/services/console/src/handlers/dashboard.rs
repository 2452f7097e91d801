//! 대시보드 KPI

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::RequireAuth;
use crate::error::Result;
use crate::state::AppState;
use crate::upstream::ForwardHeaders;

pub async fn dashboard(
    RequireAuth(admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let fwd = ForwardHeaders::from_request(&headers);
    let reply = state.upstream(&fwd).get("/api/admin/dashboard").await?;

    Ok(Json(json!({ "admin": admin, "dashboard": reply.body })))
}
