//! # 레코드 모델 정의
//!
//! 검색 인덱스에 들어 있는 서지 레코드입니다.
//! 검색 결과 목록과 레코드 상세 화면 양쪽에서 사용됩니다.

use serde::{Deserialize, Serialize};

/// 레코드 엔티티: DB의 `records` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    /// 레코드 고유 식별자 (UUIDv7 또는 외부에서 지정한 ID)
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    /// 출판 연도: 알 수 없으면 None
    pub publish_year: Option<i64>,
    /// 검색 결과에 보여줄 짧은 요약
    pub summary: Option<String>,
    pub created_at: String,
}

/// 레코드 추가 요청: `POST /api/v1/records`의 요청 본문
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    /// 지정하지 않으면 서버가 UUIDv7을 부여합니다.
    pub id: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub publish_year: Option<i64>,
    pub summary: Option<String>,
}

/// 검색 한 페이지 분량의 레코드와 전체 건수
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub records: Vec<Record>,
    pub total: u64,
}
