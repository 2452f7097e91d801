//! Console 미들웨어
//!
//! 요청 상관관계(request id)를 담당합니다. 에러 응답의 `requestId` 필드와
//! `x-request-id` 응답 헤더가 여기서 발급한 값을 사용합니다.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 현재 요청의 request id
///
/// 요청 스코프 밖(테스트, 백그라운드)에서는 `None`.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

pub async fn request_id(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();

    let span = tracing::info_span!("request", request_id = %id);
    let mut resp = REQUEST_ID
        .scope(id.clone(), async move { next.run(req).await }.instrument(span))
        .await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}
