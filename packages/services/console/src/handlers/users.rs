//! 앱 사용자 리스트 프록시
//!
//! 업스트림 경로는 `/api/admin/users` 하나만 쓴다. (과거의 "다른 prefix로
//! 재시도" 동작은 단일 정식 경로로 정리됨)

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use ops_core::GridPage;

use crate::auth::RequireAuth;
use crate::state::AppState;
use crate::upstream::{self, ForwardHeaders};

use super::grid_error_json;

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub q: String,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    500
}

pub async fn users_data(
    RequireAuth(_admin): RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsersQuery>,
    headers: HeaderMap,
) -> Response {
    let fwd = ForwardHeaders::from_request(&headers);

    let result: ops_core::Result<GridPage> = async {
        let reply = state
            .upstream(&fwd)
            .get_with(
                "/api/admin/users",
                &[
                    ("page", query.page.to_string()),
                    ("limit", query.limit.to_string()),
                    ("q", query.q.clone()),
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
        Err(e) => grid_error_json("users", e),
    }
}
