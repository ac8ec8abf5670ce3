//! # 레코드와 FTS5 전문검색 인덱스
//!
//! `records` 테이블이 원본 데이터이고, `records_fts`는 `content='records'`로 만든
//! 외부 콘텐츠(External Content) FTS5 테이블입니다.
//! - **검색(MATCH)**: FTS5 자체 인덱스를 사용
//! - **컬럼 값 읽기**: `records` 테이블에서 JOIN으로 가져옴
//! - **인덱스 관리**: 자동 동기화가 없으므로 `insert_record()`에서 직접 INSERT
//!
//! ## 에러 분류
//! MATCH 식은 사용자가 입력한 문자열에서 만들어지므로 문법 오류가 날 수 있습니다.
//! `search_records()`는 MATCH 식을 처음 평가하는 COUNT 쿼리의 에러만 `SearchError::classify()`로
//! 넘겨 "파싱 실패"와 "그 밖의 실패"를 구분합니다. 페이지 쿼리의 에러는 모두 `Backend`입니다.

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{Record, RecordPage};
use crate::search::{SearchError, SortOrder};

const RECORD_COLUMNS: &str = "r.id, r.title, r.author, r.publish_year, r.summary, r.created_at";

/// 레코드를 저장하고 FTS5 인덱스에 등록합니다.
pub async fn insert_record(
    pool: &SqlitePool,
    id: &str,
    title: &str,
    author: Option<&str>,
    publish_year: Option<i64>,
    summary: Option<&str>,
) -> Result<Record, AppError> {
    // 두 INSERT가 함께 반영되도록 트랜잭션으로 묶습니다.
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO records (id, title, author, publish_year, summary)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(author)
    .bind(publish_year)
    .bind(summary)
    .execute(&mut *tx)
    .await?;

    // FTS5 외부 콘텐츠 테이블은 원본 테이블의 정수 rowid로 매핑됩니다.
    sqlx::query("INSERT INTO records_fts (rowid, title, author, summary) VALUES (?, ?, ?, ?)")
        .bind(result.last_insert_rowid())
        .bind(title)
        .bind(author.unwrap_or_default())
        .bind(summary.unwrap_or_default())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    get_record(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created record".to_string()))
}

pub async fn get_record(pool: &SqlitePool, id: &str) -> Result<Option<Record>, AppError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM records r WHERE r.id = ?");
    let record = sqlx::query_as::<_, Record>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

/// FTS5 MATCH 식으로 검색하여 한 페이지 분량의 레코드와 전체 건수를 반환합니다.
///
/// 관련도순 정렬은 FTS5의 `rank`(BM25, 작을수록 관련도 높음)를 사용합니다.
pub async fn search_records(
    pool: &SqlitePool,
    expression: &str,
    sort: SortOrder,
    limit: u32,
    offset: u64,
) -> Result<RecordPage, SearchError> {
    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM records_fts WHERE records_fts MATCH ?")
            .bind(expression)
            .fetch_one(pool)
            .await
            .map_err(SearchError::classify)?;

    let order_by = match sort {
        SortOrder::Relevance => "records_fts.rank",
        SortOrder::Title => "r.title COLLATE NOCASE, r.id",
        SortOrder::Year => "r.publish_year IS NULL, r.publish_year DESC, r.title COLLATE NOCASE",
    };
    let sql = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM records_fts
        JOIN records r ON r.rowid = records_fts.rowid
        WHERE records_fts MATCH ?
        ORDER BY {order_by}
        LIMIT ? OFFSET ?
        "#
    );
    let records = sqlx::query_as::<_, Record>(&sql)
        .bind(expression)
        .bind(i64::from(limit))
        .bind(offset as i64)
        .fetch_all(pool)
        .await
        // 같은 MATCH 식이 COUNT에서 이미 통과했으므로 여기서 나는 에러는 파싱 오류가 아닙니다.
        .map_err(SearchError::Backend)?;

    Ok(RecordPage {
        records,
        total: total.max(0) as u64,
    })
}

/// 검색어 없이 전체 레코드를 나열합니다. 관련도가 없으므로 기본 정렬은 제목순입니다.
pub async fn list_records(
    pool: &SqlitePool,
    sort: SortOrder,
    limit: u32,
    offset: u64,
) -> Result<RecordPage, sqlx::Error> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM records")
        .fetch_one(pool)
        .await?;

    let order_by = match sort {
        SortOrder::Relevance | SortOrder::Title => "r.title COLLATE NOCASE, r.id",
        SortOrder::Year => "r.publish_year IS NULL, r.publish_year DESC, r.title COLLATE NOCASE",
    };
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM records r ORDER BY {order_by} LIMIT ? OFFSET ?"
    );
    let records = sqlx::query_as::<_, Record>(&sql)
        .bind(i64::from(limit))
        .bind(offset as i64)
        .fetch_all(pool)
        .await?;

    Ok(RecordPage {
        records,
        total: total.max(0) as u64,
    })
}
