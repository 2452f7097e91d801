//! 관리자 Identity
//!
//! 업스트림 identity API(`/api/admin-users/me`)가 돌려주는 인증 주체입니다.
//! 매 요청마다 새로 조회되며, 요청이 끝나면 버려집니다. 콘솔은 이 값을
//! 캐시하거나 저장하지 않습니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 인증된 관리자
///
/// 세션 쿠키 검증에 성공했을 때 요청 컨텍스트에 붙는 값입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// 업스트림이 부여한 불투명 ID
    pub id: String,

    /// 표시 이름
    pub name: String,

    /// 이메일 (옵션)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Role
    #[serde(default)]
    pub role: AdminRole,

    /// 활성 여부
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// 생성 시각 (업스트림 제공 시)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// 마지막 로그인 시각 (업스트림 제공 시)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// 관리자 role
///
/// 닫힌 집합이지만, 업스트림이 새 role을 추가해도 역직렬화가 깨지지 않도록
/// `Unknown`으로 수렴시킵니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// 전체 권한
    SuperAdmin,

    /// 일반 관리자
    #[default]
    Admin,

    /// 읽기 중심 지원 role
    Support,

    /// 알 수 없는 role (업스트림이 추가한 값)
    #[serde(other)]
    Unknown,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Admin => "admin",
            AdminRole::Support => "support",
            AdminRole::Unknown => "unknown",
        }
    }
}

impl Identity {
    /// 특정 role인지 확인
    pub fn has_role(&self, role: AdminRole) -> bool {
        self.role == role
    }
}
