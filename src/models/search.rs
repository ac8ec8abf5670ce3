//! # 검색 기록 모델 정의
//!
//! 실행된 검색은 세션 ID와 (로그인한 경우) 사용자 ID와 함께 `search` 테이블에 남습니다.
//! 저장된 행은 수정되지 않으며, `?saved=<id>`로 같은 검색을 다시 불러올 때 사용됩니다.

use serde::Serialize;

/// 검색 기록 엔티티: DB의 `search` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SearchHistoryRecord {
    /// 검색 기록 ID (UUIDv7)
    pub id: String,
    /// 검색을 실행한 세션
    pub session_id: String,
    /// 로그인 상태로 검색했다면 그 사용자
    pub user_id: Option<String>,
    /// 검색을 실행한 백엔드 식별자
    pub search_class_id: String,
    /// 축약(minify)된 검색 조건 JSON
    #[serde(skip_serializing)]
    pub search_object: String,
    /// `search_object`의 SHA-256. 같은 검색의 중복 저장을 막는 데 씁니다.
    #[serde(skip_serializing)]
    pub query_hash: String,
    pub created_at: String,
}

/// 검색 기록 목록의 한 항목: `GET /api/v1/search/history` 응답
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    /// 이 검색을 다시 실행하는 정규 URL
    pub url: String,
    /// 화면 표시용 검색어
    pub query: String,
    pub created_at: String,
}
