//! 페이지네이션 응답 구조
//!
//! 업스트림 리스트 엔드포인트는 `{ items, page, pages, total, limit }` 형태로
//! 응답합니다. 콘솔 자체 데이터 엔드포인트는 브라우저 그리드가 기대하는
//! `{ items, page, limit, total }`로 정규화해 내려보냅니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 업스트림 리스트 응답 수신용
///
/// `items`는 스키마 계약의 핵심이라 `Option`으로 받되, 호출자가 `None`을
/// shape 위반으로 처리합니다. 동적 형태 추정(배열이면 그대로, 아니면 빈 배열)은
/// 하지 않습니다.
#[derive(Debug, Deserialize)]
pub struct PageEnvelope {
    pub items: Option<Vec<Value>>,

    #[serde(default = "default_one")]
    pub page: u64,

    #[serde(default = "default_one")]
    pub pages: u64,

    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub limit: Option<u64>,
}

fn default_one() -> u64 {
    1
}

impl PageEnvelope {
    /// `items` 배열을 꺼내거나 shape 에러를 돌려준다
    pub fn into_items(self) -> crate::Result<Vec<Value>> {
        self.items.ok_or_else(|| crate::Error::UpstreamShape {
            message: "list response has no items array".to_string(),
        })
    }
}

/// 콘솔 데이터 엔드포인트 응답 (그리드 계약)
#[derive(Debug, Serialize)]
pub struct GridPage {
    pub items: Vec<Value>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl GridPage {
    pub fn new(items: Vec<Value>, page: u64, limit: u64, total: u64) -> Self {
        Self {
            items,
            page,
            limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_defaults() {
        let envelope: PageEnvelope =
            serde_json::from_value(serde_json::json!({ "items": [1, 2] })).unwrap();
        assert_eq!(envelope.page, 1);
        assert_eq!(envelope.pages, 1);
        assert_eq!(envelope.total, 0);
        assert_eq!(envelope.into_items().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_items_is_shape_error() {
        let envelope: PageEnvelope =
            serde_json::from_value(serde_json::json!({ "page": 1, "pages": 3 })).unwrap();
        let err = envelope.into_items().unwrap_err();
        assert_eq!(err.code(), "UPSTREAM_SHAPE");
    }

    #[test]
    fn test_non_array_items_rejected() {
        // items가 배열이 아니면 역직렬화 자체가 실패해야 한다
        let result: std::result::Result<PageEnvelope, _> =
            serde_json::from_value(serde_json::json!({ "items": "nope" }));
        assert!(result.is_err());
    }
}
