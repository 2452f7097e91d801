//! 공통 에러 타입
//!
//! 업스트림 API 호출에서 나오는 실패 분류입니다. 콘솔은 요청 핸들러 경계에서
//! 이 에러를 잡아 JSON 에러 응답으로 변환합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// 콘솔 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    /// 업스트림이 에러 상태 코드로 응답 (상태/메시지는 그대로 전달)
    #[error("upstream returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    /// 업스트림 연결 실패 또는 타임아웃
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// 업스트림 응답이 문서화된 스키마와 다름
    ///
    /// 부분 데이터를 신뢰하지 않고 요청 전체를 실패시킵니다.
    #[error("upstream shape violation: {message}")]
    UpstreamShape { message: String },

    /// 클라이언트 페이로드 검증 실패
    #[error("invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            Error::UpstreamStatus { status, .. } => *status,
            Error::UpstreamUnavailable { .. } => 500,
            Error::UpstreamShape { .. } => 502,
            Error::InvalidPayload { .. } => 400,
            Error::Json(_) => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::UpstreamStatus { .. } => "UPSTREAM_ERROR",
            Error::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            Error::UpstreamShape { .. } => "UPSTREAM_SHAPE",
            Error::InvalidPayload { .. } => "INVALID_PAYLOAD",
            Error::Json(_) => "JSON_ERROR",
        }
    }

    /// 클라이언트에 보여줄 메시지
    pub fn message(&self) -> String {
        match self {
            Error::UpstreamStatus { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
