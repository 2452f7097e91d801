//! 로그인/로그아웃 프록시
//!
//! 세션 토큰은 업스트림이 발급합니다. 로그인 성공 시 업스트림의 `Set-Cookie`를
//! 그대로 브라우저에 릴레이하고, 로그아웃은 업스트림 호출이 실패해도 로컬
//! 쿠키를 무조건 지웁니다.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{MaybeIdentity, RequireAnonymous, CLEAR_SESSION_COOKIE};
use crate::state::AppState;
use crate::upstream::ForwardHeaders;

use super::upstream_error_json;

// 템플릿 엔진은 쓰지 않는다. 로그인 화면은 가드 리다이렉트의 앵커로만 존재한다.
const LOGIN_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin Console</title></head>
<body>
  <form id="login" method="post" action="/auth/login">
    <input name="email" type="email" placeholder="email" required>
    <input name="password" type="password" placeholder="password" required>
    <button type="submit">Sign in</button>
  </form>
</body>
</html>
"#;

/// 로그인 화면
///
/// 이미 인증된 사용자는 `RequireAnonymous`가 `/dashboard`로 보낸다.
pub async fn login_page(_guard: RequireAnonymous) -> Html<&'static str> {
    Html(LOGIN_SHELL)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 로그인 프록시
///
/// 업스트림 상태/바디를 그대로 통과시키고, 성공 응답의 `Set-Cookie`를 전부
/// 가공 없이 릴레이한다.
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(creds): Json<LoginRequest>,
) -> Response {
    let fwd = ForwardHeaders::from_request(&headers);
    let body = json!({ "email": creds.email, "password": creds.password });

    match state
        .upstream(&fwd)
        .post("/api/admin-users/login", &body)
        .await
    {
        Ok(reply) => {
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
            let mut resp = (status, Json(reply.body)).into_response();
            relay_set_cookie(&mut resp, &reply.set_cookie);
            resp
        }
        Err(e) => {
            tracing::warn!("Login proxy failed: {}", e);
            upstream_error_json(e)
        }
    }
}

/// 로그아웃
///
/// 업스트림 로그아웃은 best-effort. 성공하면 `Set-Cookie`를 릴레이하고,
/// 실패해도 로컬 쿠키를 지우고 `/`로 보낸다. 업스트림이 죽어 있어도
/// 클라이언트 쪽 로그아웃은 항상 성립해야 한다.
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let fwd = ForwardHeaders::from_request(&headers);
    let mut resp = Redirect::to("/").into_response();

    match state
        .upstream(&fwd)
        .post_empty("/api/admin-users/logout")
        .await
    {
        Ok(reply) => relay_set_cookie(&mut resp, &reply.set_cookie),
        Err(e) => tracing::warn!("Upstream logout failed (ignored): {}", e),
    }

    resp.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_static(CLEAR_SESSION_COOKIE),
    );
    resp
}

/// 현재 로그인한 관리자
///
/// 헤더의 "logged in as" 위젯용. 미인증이어도 리다이렉트 없이 `null`을 준다.
pub async fn whoami(MaybeIdentity(identity): MaybeIdentity) -> Json<Value> {
    Json(json!({ "admin": identity }))
}

fn relay_set_cookie(resp: &mut Response, cookies: &[String]) {
    for value in cookies {
        if let Ok(header_value) = HeaderValue::from_str(value) {
            resp.headers_mut().append(header::SET_COOKIE, header_value);
        }
    }
}
