//! 세션 인증 게이트
//!
//! 세션 쿠키(`adminToken`)는 불투명 토큰입니다. 콘솔은 내용을 해석하지 않고
//! 매 요청 업스트림 identity API에 "이 쿠키는 누구인가"를 물어봅니다.
//! 검증 결과는 요청이 끝나면 버려집니다.
//!
//! # 가드 모드
//!
//! - [`RequireAuth`]: 미인증이면 쿠키를 지우고 `/`로 리다이렉트
//! - [`RequireAnonymous`]: 인증 상태면 `/dashboard`로 리다이렉트 (로그인 화면용)
//! - [`MaybeIdentity`]: 리다이렉트 없이 identity를 옵션으로 붙임 (헤더 위젯용)

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};

use ops_core::Identity;

use crate::state::AppState;
use crate::upstream::ForwardHeaders;

/// 세션 쿠키 이름
///
/// HttpOnly/Secure 속성은 업스트림이 정하고, 콘솔은 이름과 경로로 지우기만
/// 합니다.
pub const SESSION_COOKIE: &str = "adminToken";

/// 세션 쿠키 삭제용 Set-Cookie 값
pub const CLEAR_SESSION_COOKIE: &str = "adminToken=; Path=/; Max-Age=0";

/// 업스트림 identity API로 세션 검증
///
/// 네트워크 실패, 타임아웃, 비 2xx, `admin` 객체가 없는 바디는 전부
/// "미인증"으로 수렴합니다. 에러를 위로 올리지 않고, 재시도도 하지 않습니다.
pub async fn verify_session(state: &AppState, fwd: &ForwardHeaders) -> Option<Identity> {
    let reply = state.upstream(fwd).get("/api/admin-users/me").await.ok()?;
    let admin = reply.body.get("admin").cloned()?;
    serde_json::from_value(admin).ok()
}

/// 인증 필수 가드
///
/// 미인증이면 로컬 세션 쿠키를 지우고 로그인 화면(`/`)으로 보냅니다.
pub struct RequireAuth(pub Identity);

/// 미인증 필수 가드 (로그인 화면)
///
/// 이미 인증된 사용자는 로그인 폼을 보지 않고 `/dashboard`로 갑니다.
pub struct RequireAnonymous;

/// 옵션 identity 가드
///
/// 쿠키 상태와 무관하게 핸들러를 실행합니다. 리다이렉트하지 않습니다.
pub struct MaybeIdentity(pub Option<Identity>);

/// `RequireAuth` 실패 응답: 쿠키 삭제 + `/` 리다이렉트
pub struct RedirectToLogin;

impl IntoResponse for RedirectToLogin {
    fn into_response(self) -> Response {
        (
            [(header::SET_COOKIE, HeaderValue::from_static(CLEAR_SESSION_COOKIE))],
            Redirect::to("/"),
        )
            .into_response()
    }
}

/// `RequireAnonymous` 실패 응답: `/dashboard` 리다이렉트
pub struct RedirectToDashboard;

impl IntoResponse for RedirectToDashboard {
    fn into_response(self) -> Response {
        Redirect::to("/dashboard").into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = RedirectToLogin;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let fwd = ForwardHeaders::from_request(&parts.headers);
        match verify_session(state, &fwd).await {
            Some(identity) => Ok(RequireAuth(identity)),
            None => Err(RedirectToLogin),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAnonymous {
    type Rejection = RedirectToDashboard;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let fwd = ForwardHeaders::from_request(&parts.headers);
        match verify_session(state, &fwd).await {
            Some(_) => Err(RedirectToDashboard),
            None => Ok(RequireAnonymous),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let fwd = ForwardHeaders::from_request(&parts.headers);
        Ok(MaybeIdentity(verify_session(state, &fwd).await))
    }
}
