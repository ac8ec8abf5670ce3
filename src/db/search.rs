//! # 검색 기록 쿼리
//!
//! 검색이 실행될 때마다 축약된 검색 조건을 `search` 테이블에 남깁니다.
//!
//! ## 중복 방지
//! 같은 소유자가 같은 검색을 다시 실행하면 새 행을 만들지 않고 기존 행을 그대로 돌려줍니다.
//! 소유자는 로그인 사용자(세션 무관), 또는 익명일 때 세션입니다.
//! 익명으로 저장된 행은 나중에 로그인한 같은 세션의 검색에 재사용되지 않습니다.
//! 동일 여부는 `search_object`의 SHA-256(`query_hash`)으로 비교합니다. 저장된 행은 이후 수정되지 않습니다.

use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::SearchHistoryRecord;
use crate::search::SearchParams;

/// 세션/사용자별 검색 기록 목록의 최대 길이
pub const HISTORY_LIMIT: i64 = 50;

const HISTORY_COLUMNS: &str =
    "id, session_id, user_id, search_class_id, search_object, query_hash, created_at";

pub fn hash_search_object(search_object: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(search_object.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 검색을 기록에 저장하거나, 이미 같은 검색이 있으면 그 행을 반환합니다.
pub async fn save_search(
    pool: &SqlitePool,
    params: &SearchParams,
    session_id: &str,
    user_id: Option<&str>,
) -> Result<SearchHistoryRecord, AppError> {
    let search_object = params.minify()?;
    let query_hash = hash_search_object(&search_object);

    // 소유자(user_id)가 정확히 같은 행만 재사용합니다.
    // 로그인했다면 다른 세션의 행도, 익명이면 이 세션의 익명 행만 대상입니다.
    let sql = format!(
        r#"
        SELECT {HISTORY_COLUMNS}
        FROM search
        WHERE query_hash = ?
          AND user_id IS ?
          AND (session_id = ? OR ? IS NOT NULL)
        ORDER BY created_at DESC
        LIMIT 1
        "#
    );
    let existing = sqlx::query_as::<_, SearchHistoryRecord>(&sql)
        .bind(&query_hash)
        .bind(user_id)
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    if let Some(existing) = existing {
        tracing::debug!(search_id = %existing.id, "Search already in history");
        return Ok(existing);
    }

    let id = uuid::Uuid::now_v7().to_string();
    sqlx::query(
        r#"
        INSERT INTO search (id, session_id, user_id, search_class_id, search_object, query_hash)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(session_id)
    .bind(user_id)
    .bind(&params.search_class_id)
    .bind(&search_object)
    .bind(&query_hash)
    .execute(pool)
    .await?;

    get_search(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve saved search".to_string()))
}

/// ID로 검색 기록 하나를 조회합니다.
pub async fn get_search(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<SearchHistoryRecord>, AppError> {
    let sql = format!("SELECT {HISTORY_COLUMNS} FROM search WHERE id = ?");
    let record = sqlx::query_as::<_, SearchHistoryRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

/// 세션의 기록과, 로그인했다면 사용자의 기록을 최신순으로 조회합니다.
pub async fn list_searches(
    pool: &SqlitePool,
    session_id: &str,
    user_id: Option<&str>,
) -> Result<Vec<SearchHistoryRecord>, AppError> {
    let sql = format!(
        r#"
        SELECT {HISTORY_COLUMNS}
        FROM search
        WHERE session_id = ? OR (? IS NOT NULL AND user_id = ?)
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#
    );
    let records = sqlx::query_as::<_, SearchHistoryRecord>(&sql)
        .bind(session_id)
        .bind(user_id)
        .bind(user_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(pool)
        .await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_hex_sha256() {
        let hash = hash_search_object("{}");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_search_object("{}"));
        assert_ne!(hash, hash_search_object("{ }"));
    }
}
