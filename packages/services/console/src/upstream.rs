//! 업스트림 프록시 클라이언트
//!
//! 모든 업스트림 호출의 단일 통로입니다. 인바운드 요청에서 `Cookie`와
//! `Origin` 두 헤더만 그대로 전달하고(다른 클라이언트 헤더는 업스트림으로
//! 새지 않게), 응답을 정규화된 형태로 돌려줍니다. 재시도는 하지 않습니다.

use axum::http::{header, HeaderMap};
use reqwest::Method;
use serde_json::Value;

use ops_core::{Error, PageEnvelope, Result};

use crate::state::AppState;

/// 업스트림으로 전달하는 인바운드 헤더
///
/// 값이 비어 있어도 그대로 전달합니다 (verbatim 계약).
#[derive(Debug, Clone)]
pub struct ForwardHeaders {
    pub cookie: String,
    pub origin: String,
}

impl ForwardHeaders {
    pub fn from_request(headers: &HeaderMap) -> Self {
        let pick = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string()
        };

        Self {
            cookie: pick(header::COOKIE),
            origin: pick(header::ORIGIN),
        }
    }
}

/// 업스트림 성공 응답
///
/// 상태와 바디는 가공 없이 통과시키고, `Set-Cookie`는 로그인 릴레이를 위해
/// 전부 수집합니다.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
    pub set_cookie: Vec<String>,
}

/// 요청 단위 업스트림 클라이언트
pub struct UpstreamClient<'a> {
    state: &'a AppState,
    fwd: &'a ForwardHeaders,
}

impl AppState {
    /// 요청의 전달 헤더가 바인딩된 업스트림 클라이언트
    pub fn upstream<'a>(&'a self, fwd: &'a ForwardHeaders) -> UpstreamClient<'a> {
        UpstreamClient { state: self, fwd }
    }
}

impl UpstreamClient<'_> {
    pub async fn get(&self, path: &str) -> Result<UpstreamReply> {
        self.send(Method::GET, path, &[], None).await
    }

    pub async fn get_with(&self, path: &str, query: &[(&str, String)]) -> Result<UpstreamReply> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<UpstreamReply> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn post_empty(&self, path: &str) -> Result<UpstreamReply> {
        self.send(Method::POST, path, &[], None).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<UpstreamReply> {
        self.send(Method::PATCH, path, &[], Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<UpstreamReply> {
        let url = format!("{}{}", self.state.config.api_url, path);

        let mut request = self
            .state
            .http
            .request(method, &url)
            .header(header::COOKIE, &self.fwd.cookie)
            .header(header::ORIGIN, &self.fwd.origin);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(json) = body {
            request = request.json(json);
        }

        let response = request.send().await.map_err(|e| {
            let kind = if e.is_timeout() { "timeout" } else { "request failed" };
            Error::UpstreamUnavailable {
                message: format!("{}: {}: {}", kind, url, e),
            }
        })?;

        let status = response.status();
        let set_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();

        let bytes = response.bytes().await.map_err(|e| Error::UpstreamUnavailable {
            message: format!("reading upstream body: {}", e),
        })?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        if !status.is_success() {
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                message: extract_message(&body, "upstream request failed"),
            });
        }

        Ok(UpstreamReply {
            status: status.as_u16(),
            body,
            set_cookie,
        })
    }

    /// 페이지네이션된 리스트 엔드포인트 전체 수집
    ///
    /// 1페이지를 먼저 받아 전체 페이지 수를 알아낸 뒤 2..=pages를 순차로
    /// 요청합니다. 전체 페이지 수는 1페이지 응답에야 알 수 있고 업스트림은
    /// 공유 내부 서비스라 병렬 fan-out은 하지 않습니다.
    ///
    /// `items` 배열이 없는 페이지를 만나면 부분 데이터 없이 즉시 실패합니다.
    /// `hard_cap`에 도달하면 정확히 `hard_cap`개로 잘라서 돌려줍니다.
    pub async fn aggregate_pages(
        &self,
        path: &str,
        limit: u64,
        hard_cap: usize,
    ) -> Result<Vec<Value>> {
        let mut page: u64 = 1;
        let mut pages: u64 = 1;
        let mut all: Vec<Value> = Vec::new();

        while page <= pages && all.len() < hard_cap {
            let reply = self
                .get_with(path, &[("page", page.to_string()), ("limit", limit.to_string())])
                .await?;
            let envelope = parse_envelope(reply.body)?;

            // 메타는 1페이지에서만 읽는다
            if page == 1 {
                pages = envelope.pages.max(1);
                tracing::debug!(
                    path,
                    page = envelope.page,
                    pages = envelope.pages,
                    total = envelope.total,
                    "aggregation meta"
                );
            }

            let items = envelope.into_items().map_err(|_| Error::UpstreamShape {
                message: format!("page {} of {} has no items array", page, path),
            })?;
            tracing::debug!(path, page, fetched = items.len(), accumulated = all.len() + items.len(), "fetched page");

            all.extend(items);
            page += 1;
        }

        all.truncate(hard_cap);
        Ok(all)
    }
}

/// 리스트 응답 바디를 엄격한 스키마로 파싱
pub fn parse_envelope(body: Value) -> Result<PageEnvelope> {
    serde_json::from_value(body).map_err(|e| Error::UpstreamShape {
        message: format!("list response does not match schema: {}", e),
    })
}

/// 업스트림 에러 바디에서 메시지 추출
///
/// 우선순위: `message` 필드 → `error` 필드 → 폴백.
pub fn extract_message(body: &Value, fallback: &str) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_message_prefers_message_field() {
        let body = json!({ "message": "bad token", "error": "ignored" });
        assert_eq!(extract_message(&body, "fallback"), "bad token");
    }

    #[test]
    fn test_extract_message_falls_back_to_error_field() {
        let body = json!({ "error": "invalid_coupon" });
        assert_eq!(extract_message(&body, "fallback"), "invalid_coupon");
    }

    #[test]
    fn test_extract_message_generic_fallback() {
        assert_eq!(extract_message(&json!({}), "fallback"), "fallback");
        assert_eq!(extract_message(&Value::Null, "fallback"), "fallback");
        // message가 문자열이 아니면 무시한다
        assert_eq!(extract_message(&json!({ "message": 42 }), "fallback"), "fallback");
    }

    #[test]
    fn test_forward_headers_pick_only_cookie_and_origin() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "adminToken=abc".parse().unwrap());
        headers.insert(header::ORIGIN, "https://console.example".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer leak-me-not".parse().unwrap());
        headers.insert(header::USER_AGENT, "test".parse().unwrap());

        let fwd = ForwardHeaders::from_request(&headers);
        assert_eq!(fwd.cookie, "adminToken=abc");
        assert_eq!(fwd.origin, "https://console.example");
    }

    #[test]
    fn test_forward_headers_default_empty() {
        let fwd = ForwardHeaders::from_request(&HeaderMap::new());
        assert_eq!(fwd.cookie, "");
        assert_eq!(fwd.origin, "");
    }
}
