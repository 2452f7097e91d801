//! Console 에러 타입

use std::any::Any;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Console 에러
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("core error: {0}")]
    Core(#[from] ops_core::Error),
}

/// 에러 응답 JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(rename = "incidentId", skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let (status, code, message, incident) = match &self {
            ConsoleError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.clone(), None)
            }
            ConsoleError::NotFound { message } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone(), None)
            }
            ConsoleError::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    message.clone(),
                    Some(incident_id()),
                )
            }
            ConsoleError::Core(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, e.code(), e.message(), None)
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                request_id: crate::middleware::current_request_id(),
                incident_id: incident,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// 타임스탬프 기반 incident id (base36)
///
/// 에러 페이지/응답에서 내부 정보를 노출하지 않고 로그와 대조할 수 있는
/// 식별자입니다.
pub fn incident_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    base36(millis)
}

fn base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// 핸들러 밖으로 새어 나온 panic을 500 JSON으로 변환
///
/// 어떤 실패도 바디 없는 5xx로 나가지 않게 하는 마지막 장벽입니다.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    let incident = incident_id();
    tracing::error!(incident_id = %incident, "Handler panicked: {}", detail);

    let body = ErrorResponse {
        error: ErrorBody {
            code: "INTERNAL_ERROR".to_string(),
            message: "unexpected server error".to_string(),
            request_id: None,
            incident_id: Some(incident),
        },
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
