//! # 검색 백엔드와 레지스트리
//!
//! 검색 백엔드는 문자열 식별자(`SEARCH_CLASS_ID`)로 선택됩니다.
//! `BackendRegistry`는 식별자 → `{ 옵션, 생성자 }` 쌍을 보관하며,
//! 핸들러는 요청마다 생성자로 백엔드를 만들어 검색을 실행합니다.
//!
//! 등록된 백엔드:
//! - `Index`: SQLite FTS5 인덱스(`records_fts`)를 검색합니다. 고급 검색 지원.
//! - `Empty`: 항상 결과 0건. 쿼리 파싱 실패 시 "빈 결과" 화면을 만들 때도 사용합니다.
//!
//! ## 검색 결과 타입
//! `perform()`은 `Result<SearchResults, SearchError>`를 반환합니다.
//! `SearchError::Parse`는 사용자가 입력한 쿼리를 해석할 수 없다는 뜻이고
//! (핸들러에서 복구), `SearchError::Backend`는 그 밖의 모든 실패입니다.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use super::params::{SearchParams, SearchType, SortOrder, DEFAULT_LIMIT};
use super::params::{JoinOp, SearchHandler, SearchTerm};
use crate::db;
use crate::models::Record;

pub const INDEX_BACKEND: &str = "Index";
pub const EMPTY_BACKEND: &str = "Empty";

#[derive(Debug, Error)]
pub enum SearchError {
    /// 쿼리 문법 오류 또는 존재하지 않는 필드 지정
    #[error("query could not be parsed: {0}")]
    Parse(String),

    #[error("search backend failure: {0}")]
    Backend(#[source] sqlx::Error),
}

impl SearchError {
    /// MATCH 식을 평가하다 난 SQLite 에러가 파싱 오류인지 판별합니다.
    ///
    /// FTS5가 돌려주는 세 가지만 파싱 오류입니다.
    /// - `fts5: syntax error near ...` (문법 오류)
    /// - `unterminated string` (닫히지 않은 따옴표)
    /// - `no such column: <이름>` (없는 컬럼 필터). FTS5 컬럼 필터 이름에는 테이블 접두사가 없으므로
    ///   `r.publish_year`처럼 점이 들어간 이름은 스키마 문제로 보고 `Backend`로 남깁니다.
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let message = db_err.message();
            let lowered = message.to_ascii_lowercase();
            let unknown_filter = lowered
                .strip_prefix("no such column: ")
                .is_some_and(|column| !column.contains('.'));
            if lowered.starts_with("fts5:") || lowered.contains("unterminated string") || unknown_filter {
                return SearchError::Parse(message.to_string());
            }
        }
        SearchError::Backend(err)
    }
}

/// 백엔드별 검색 옵션 (고급 검색 폼에도 그대로 노출됩니다)
#[derive(Debug, Clone, Serialize)]
pub struct SearchOptions {
    pub advanced_supported: bool,
    pub handlers: Vec<SearchHandler>,
    pub sort_options: Vec<SortOrder>,
    pub default_limit: u32,
    pub max_limit: u32,
}

impl SearchOptions {
    pub fn index() -> Self {
        Self {
            advanced_supported: true,
            handlers: vec![
                SearchHandler::AllFields,
                SearchHandler::Title,
                SearchHandler::Author,
            ],
            sort_options: vec![SortOrder::Relevance, SortOrder::Title, SortOrder::Year],
            default_limit: DEFAULT_LIMIT,
            max_limit: 100,
        }
    }

    pub fn empty() -> Self {
        Self {
            advanced_supported: false,
            handlers: vec![SearchHandler::AllFields],
            sort_options: vec![SortOrder::Relevance],
            default_limit: DEFAULT_LIMIT,
            max_limit: 100,
        }
    }
}

/// 한 번의 검색 결과 (현재 페이지의 레코드 + 전체 건수)
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub params: SearchParams,
    pub records: Vec<Record>,
    pub total: u64,
}

impl SearchResults {
    pub fn empty(params: SearchParams) -> Self {
        Self {
            params,
            records: Vec::new(),
            total: 0,
        }
    }

    /// 현재 페이지에서 1부터 시작하는 위치의 레코드
    pub fn record_at(&self, position: usize) -> Option<&Record> {
        position
            .checked_sub(1)
            .and_then(|index| self.records.get(index))
    }
}

#[derive(Debug, Clone)]
pub struct IndexBackend {
    pool: SqlitePool,
}

impl IndexBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn perform(&self, params: &SearchParams) -> Result<SearchResults, SearchError> {
        let page = match match_expression(params) {
            Some(expression) => {
                db::search_records(
                    &self.pool,
                    &expression,
                    params.sort,
                    params.limit,
                    params.offset(),
                )
                .await?
            }
            None => db::list_records(&self.pool, params.sort, params.limit, params.offset())
                .await
                .map_err(SearchError::Backend)?,
        };

        Ok(SearchResults {
            params: params.clone(),
            records: page.records,
            total: page.total,
        })
    }
}

#[derive(Debug, Clone)]
pub enum SearchBackend {
    Index(IndexBackend),
    Empty,
}

impl SearchBackend {
    /// 검색을 실행하고 결과를 가공합니다.
    pub async fn perform(&self, params: &SearchParams) -> Result<SearchResults, SearchError> {
        match self {
            SearchBackend::Index(backend) => backend.perform(params).await,
            SearchBackend::Empty => Ok(SearchResults::empty(params.clone())),
        }
    }
}

/// 검색 조건을 FTS5 MATCH 식으로 바꿉니다. 검색어가 없으면 None (전체 목록)
///
/// 전체 필드 검색은 사용자가 입력한 FTS5 문법을 그대로 사용합니다.
fn match_expression(params: &SearchParams) -> Option<String> {
    fn term_expression(term: &SearchTerm) -> Option<String> {
        if term.lookfor.is_empty() {
            return None;
        }
        Some(match term.handler.column() {
            Some(column) => format!("{column} : ({})", term.lookfor),
            None => term.lookfor.clone(),
        })
    }

    match params.search_type {
        SearchType::Basic => params.terms.first().and_then(term_expression),
        SearchType::Advanced => {
            let parts: Vec<String> = params
                .terms
                .iter()
                .filter_map(term_expression)
                .map(|expression| format!("({expression})"))
                .collect();
            if parts.is_empty() {
                return None;
            }
            let separator = match params.join {
                JoinOp::And => " AND ",
                JoinOp::Or => " OR ",
            };
            Some(parts.join(separator))
        }
    }
}

/// 요청마다 백엔드를 만드는 생성자
pub type BackendConstructor = fn(&SqlitePool) -> SearchBackend;

#[derive(Clone)]
pub struct BackendEntry {
    pub options: SearchOptions,
    pub construct: BackendConstructor,
}

/// 식별자 → 백엔드 정의
#[derive(Clone, Default)]
pub struct BackendRegistry {
    entries: HashMap<String, BackendEntry>,
}

impl BackendRegistry {
    /// 기본 제공 백엔드(`Index`, `Empty`)가 등록된 레지스트리
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register(
            INDEX_BACKEND,
            BackendEntry {
                options: SearchOptions::index(),
                construct: |pool| SearchBackend::Index(IndexBackend::new(pool.clone())),
            },
        );
        registry.register(
            EMPTY_BACKEND,
            BackendEntry {
                options: SearchOptions::empty(),
                construct: |_| SearchBackend::Empty,
            },
        );
        registry
    }

    pub fn register(&mut self, id: &str, entry: BackendEntry) {
        self.entries.insert(id.to_string(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&BackendEntry> {
        self.entries.get(id)
    }
}
