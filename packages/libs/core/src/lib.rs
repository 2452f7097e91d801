//! ops-core: 어드민 콘솔 공통 핵심 라이브러리
//!
//! 콘솔 게이트웨이가 사용하는 도메인 타입과 로직을 제공합니다.
//! 콘솔은 자체 저장소를 갖지 않으므로, 여기 있는 타입은 전부
//! 업스트림 API 응답의 요청 단위 사본입니다.
//!
//! # 모듈 구조
//!
//! - `identity`: 인증된 관리자(Identity)와 role 타입
//! - `page`: 페이지네이션 응답 구조 (업스트림 수신용 / 그리드 응답용)
//! - `error`: 공통 에러 타입

pub mod error;
pub mod identity;
pub mod page;

pub use error::{Error, Result};
pub use identity::{AdminRole, Identity};
pub use page::{GridPage, PageEnvelope};
