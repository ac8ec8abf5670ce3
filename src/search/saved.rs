//! # 저장된 검색 복원
//!
//! 검색 기록의 한 행(`search` 테이블)을 다시 살려 그 검색의 정규 URL로 보냅니다.
//!
//! ## 접근 규칙
//! 검색 기록은 그것을 만든 세션, 또는 (로그인한 경우) 그 소유 사용자만 복원할 수 있습니다.
//! 로그인하지 않은 요청은 세션 ID가 일치할 때만 통과합니다.

use sqlx::SqlitePool;

use super::params::{SearchParams, SearchType};
use super::route::RouteTarget;
use crate::db;
use crate::error::AppError;
use crate::models::SearchHistoryRecord;

/// 이 세션/사용자가 검색 기록을 복원할 권한이 있는지 확인합니다.
pub fn can_restore(record: &SearchHistoryRecord, session_id: &str, user_id: Option<&str>) -> bool {
    if record.session_id == session_id {
        return true;
    }
    matches!(
        (record.user_id.as_deref(), user_id),
        (Some(owner), Some(caller)) if owner == caller
    )
}

/// 검색 기록을 읽고 권한을 확인한 뒤 검색 조건으로 되살립니다.
///
/// - 행이 없으면 `AppError::NotFound`
/// - 권한이 없으면 `AppError::AccessDenied`
pub async fn load_saved_search(
    pool: &SqlitePool,
    search_id: &str,
    session_id: &str,
    user_id: Option<&str>,
) -> Result<SearchParams, AppError> {
    let record = db::get_search(pool, search_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !can_restore(&record, session_id, user_id) {
        return Err(AppError::AccessDenied(
            "Attempt to access invalid search ID".to_string(),
        ));
    }

    Ok(SearchParams::deminify(&record.search_object)?)
}

/// 저장된 검색 ID를 그 검색 결과 화면의 리다이렉트 대상으로 바꿉니다.
///
/// 사용자가 `?saved=...` URL에 머무르지 않고 항상 북마크 가능한 URL로 이동하게 됩니다.
pub async fn resolve(
    pool: &SqlitePool,
    search_id: &str,
    session_id: &str,
    user_id: Option<&str>,
) -> Result<RouteTarget, AppError> {
    let saved = load_saved_search(pool, search_id, session_id, user_id).await?;
    tracing::debug!(search_id, url = %saved.canonical_url(), "Redirecting to saved search");
    Ok(saved.search_route())
}

/// 고급 검색 폼의 "저장된 검색 편집" 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restored {
    Search(SearchParams),
    /// 화면에 보여줄 에러 메시지 키
    Rejected(&'static str),
}

/// 고급 검색 편집용 복원. 실패를 에러가 아닌 메시지 키로 돌려줍니다.
///
/// DB 오류나 손상된 검색 객체는 그대로 에러로 전파됩니다.
pub async fn restore_advanced_search(
    pool: &SqlitePool,
    search_id: &str,
    session_id: &str,
    user_id: Option<&str>,
) -> Result<Restored, AppError> {
    let Some(record) = db::get_search(pool, search_id).await? else {
        return Ok(Restored::Rejected("advSearchError_notFound"));
    };

    if !can_restore(&record, session_id, user_id) {
        return Ok(Restored::Rejected("advSearchError_noRights"));
    }

    let saved = SearchParams::deminify(&record.search_object)?;
    if saved.search_type != SearchType::Advanced {
        return Ok(Restored::Rejected("advSearchError_notAdvanced"));
    }

    Ok(Restored::Search(saved))
}
