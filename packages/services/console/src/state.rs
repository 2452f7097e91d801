//! Console 앱 상태

use std::time::Duration;

use crate::config::Config;

/// 앱 상태
///
/// 모든 핸들러에서 공유합니다. 요청 간 가변 상태는 없습니다.
/// 세션/identity는 절대 여기 캐시하지 않습니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// 업스트림 호출용 HTTP 클라이언트 (커넥션 풀은 reqwest 기본값)
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;

        Ok(Self { config, http })
    }
}
