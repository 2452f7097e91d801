//! Console 설정

use std::env;

/// Console 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// 업스트림 API base URL
    pub api_url: String,

    /// 업스트림 호출 타임아웃 (초)
    pub upstream_timeout_secs: u64,

    /// Purchases 집계 페이지 크기 (업스트림이 clamp할 수 있음)
    pub purchases_page_limit: u64,

    /// Purchases 집계 하드 캡 (이 이상은 절대 끌어오지 않음)
    pub purchases_hard_cap: usize,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("ODK_CONSOLE_PORT")
                .unwrap_or_else(|_| "5100".to_string())
                .parse()?,

            api_url: env::var("ODK_API_URL")
                .unwrap_or_else(|_| "http://localhost:4000".to_string()),

            upstream_timeout_secs: env::var("ODK_UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),

            purchases_page_limit: env::var("ODK_PURCHASES_PAGE_LIMIT")
                .unwrap_or_else(|_| "200".to_string())
                .parse()
                .unwrap_or(200),

            purchases_hard_cap: env::var("ODK_PURCHASES_HARD_CAP")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
        })
    }
}
