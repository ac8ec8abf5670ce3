//! # 피드백 폼 모델 정의
//!
//! `POST /api/v1/ajax/feedback`의 폼 본문과 응답 형식입니다.

use serde::{Deserialize, Serialize};

/// 피드백 폼: 세 필드 모두 빠지면 빈 문자열로 취급합니다.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub email: String,
}

/// AJAX 응답 상태 ("OK" / "ERROR")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AjaxStatus {
    Ok,
    Error,
}

/// AJAX 엔드포인트의 공통 응답 본문: `{ "data": ..., "status": "OK" }`
#[derive(Debug, Serialize)]
pub struct AjaxResponse {
    pub data: Option<serde_json::Value>,
    pub status: AjaxStatus,
}

impl AjaxResponse {
    pub fn status(status: AjaxStatus) -> Self {
        Self { data: None, status }
    }
}
