//! # 검색 파라미터
//!
//! 요청 하나에서 검색 파라미터가 만들어지는 과정은 두 단계입니다.
//!
//! 1. `Parameters`: 쿼리 문자열과 폼 본문을 합친 평평한 key→value 묶음.
//!    쿼리 문자열을 먼저 넣고 본문을 나중에 넣으므로, 같은 키가 있으면 본문 값이 이깁니다.
//! 2. `SearchParams`: 백엔드가 해석하는 검색 조건. `Parameters`와 백엔드의
//!    `SearchOptions`로부터 만들어지며, 검색 기록에는 JSON으로 "축약(minify)"되어 저장됩니다.
//!
//! ## 기본 검색과 고급 검색
//! - 기본 검색: `lookfor`, `type`
//! - 고급 검색: `lookfor0`..`lookfor9`, `type0`..`type9`, `join`
//!   (비어 있지 않은 `lookforN`이 하나라도 있으면 고급 검색으로 봅니다)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::backend::SearchOptions;
use super::route::{Route, RouteTarget};

/// 한 페이지에 보여줄 기본 결과 수
pub const DEFAULT_LIMIT: u32 = 20;
/// 고급 검색 폼의 최대 행 수
pub const MAX_ADVANCED_ROWS: usize = 10;

/// 쿼리 문자열 + 폼 본문을 합친 요청 파라미터 묶음
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: BTreeMap<String, String>,
}

impl Parameters {
    /// URL 인코딩된 쿼리 문자열 하나로 묶음을 만듭니다.
    pub fn from_query(query: Option<&str>) -> Self {
        Self::merge(query, &[])
    }

    /// 쿼리 문자열을 먼저, 폼 본문을 나중에 넣습니다.
    /// 키가 겹치면 나중에 들어온 값(본문)이 남습니다.
    pub fn merge(query: Option<&str>, body: &[u8]) -> Self {
        let mut params = Self::default();
        if let Some(query) = query {
            params.extend_encoded(query.as_bytes());
        }
        params.extend_encoded(body);
        params
    }

    pub fn extend_encoded(&mut self, input: &[u8]) {
        for (key, value) in form_urlencoded::parse(input) {
            self.values.insert(key.into_owned(), value.into_owned());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Basic,
    Advanced,
}

/// 검색 대상 필드 (요청의 `type` 값)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SearchHandler {
    #[default]
    AllFields,
    Title,
    Author,
}

impl SearchHandler {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "AllFields" => Some(SearchHandler::AllFields),
            "Title" => Some(SearchHandler::Title),
            "Author" => Some(SearchHandler::Author),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchHandler::AllFields => "AllFields",
            SearchHandler::Title => "Title",
            SearchHandler::Author => "Author",
        }
    }

    /// FTS5 컬럼 필터에 쓸 컬럼 이름. 전체 필드 검색이면 None
    pub fn column(self) -> Option<&'static str> {
        match self {
            SearchHandler::AllFields => None,
            SearchHandler::Title => Some("title"),
            SearchHandler::Author => Some("author"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Relevance,
    Title,
    Year,
}

impl SortOrder {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "relevance" => Some(SortOrder::Relevance),
            "title" => Some(SortOrder::Title),
            "year" => Some(SortOrder::Year),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::Title => "title",
            SortOrder::Year => "year",
        }
    }
}

/// 고급 검색 행을 묶는 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinOp {
    #[default]
    And,
    Or,
}

impl JoinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinOp::And => "AND",
            JoinOp::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub lookfor: String,
    pub handler: SearchHandler,
}

/// 백엔드가 해석하는 검색 조건
///
/// 검색 기록의 `search_object` 컬럼에는 이 구조체의 JSON이 그대로 저장되며,
/// 저장된 검색을 복원할 때 `deminify()`로 되살립니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub search_class_id: String,
    pub search_type: SearchType,
    pub terms: Vec<SearchTerm>,
    #[serde(default)]
    pub join: JoinOp,
    pub page: u32,
    pub limit: u32,
    #[serde(default)]
    pub sort: SortOrder,
}

impl SearchParams {
    /// 요청 파라미터와 백엔드 옵션으로 검색 조건을 만듭니다.
    ///
    /// 옵션이 허용하지 않는 검색 필드나 정렬은 기본값으로 대체되고,
    /// `limit`은 `1..=max_limit` 범위로 잘립니다.
    pub fn from_request(
        search_class_id: &str,
        request: &Parameters,
        options: &SearchOptions,
    ) -> Self {
        let handler_for = |key: &str| {
            request
                .get(key)
                .and_then(SearchHandler::from_param)
                .filter(|handler| options.handlers.contains(handler))
                .unwrap_or_default()
        };

        let advanced_terms: Vec<SearchTerm> = (0..MAX_ADVANCED_ROWS)
            .filter_map(|row| {
                let lookfor = request.get(&format!("lookfor{row}"))?.trim();
                if lookfor.is_empty() {
                    return None;
                }
                Some(SearchTerm {
                    lookfor: lookfor.to_string(),
                    handler: handler_for(&format!("type{row}")),
                })
            })
            .collect();

        let (search_type, terms, join) = if !advanced_terms.is_empty() && options.advanced_supported
        {
            let join = match request.get("join") {
                Some("OR") => JoinOp::Or,
                _ => JoinOp::And,
            };
            (SearchType::Advanced, advanced_terms, join)
        } else {
            let term = SearchTerm {
                lookfor: request.get("lookfor").unwrap_or_default().trim().to_string(),
                handler: handler_for("type"),
            };
            (SearchType::Basic, vec![term], JoinOp::And)
        };

        let page = request
            .get("page")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);
        let limit = request
            .get("limit")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .unwrap_or(options.default_limit)
            .clamp(1, options.max_limit);
        let sort = request
            .get("sort")
            .and_then(SortOrder::from_param)
            .filter(|sort| options.sort_options.contains(sort))
            .unwrap_or_default();

        Self {
            search_class_id: search_class_id.to_string(),
            search_type,
            terms,
            join,
            page,
            limit,
            sort,
        }
    }

    /// 화면 표시용 검색어. 고급 검색은 행들을 join 연산자로 이어 붙입니다.
    pub fn display_query(&self) -> String {
        let separator = format!(" {} ", self.join.as_str());
        self.terms
            .iter()
            .map(|term| term.lookfor.as_str())
            .collect::<Vec<_>>()
            .join(&separator)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// 이 검색을 다시 실행하는 정규(canonical) 쿼리 문자열 (`?` 제외)
    ///
    /// 기본값과 같은 정렬/페이지/limit은 생략하여 북마크 가능한 짧은 URL을 만듭니다.
    pub fn url_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        match self.search_type {
            SearchType::Basic => {
                let term = self.terms.first();
                serializer.append_pair("lookfor", term.map(|t| t.lookfor.as_str()).unwrap_or(""));
                serializer.append_pair(
                    "type",
                    term.map(|t| t.handler).unwrap_or_default().as_str(),
                );
            }
            SearchType::Advanced => {
                serializer.append_pair("join", self.join.as_str());
                for (row, term) in self.terms.iter().enumerate() {
                    serializer.append_pair(&format!("lookfor{row}"), &term.lookfor);
                    serializer.append_pair(&format!("type{row}"), term.handler.as_str());
                }
            }
        }

        if self.sort != SortOrder::Relevance {
            serializer.append_pair("sort", self.sort.as_str());
        }
        if self.page > 1 {
            serializer.append_pair("page", &self.page.to_string());
        }
        if self.limit != DEFAULT_LIMIT {
            serializer.append_pair("limit", &self.limit.to_string());
        }

        serializer.finish()
    }

    /// 이 검색의 결과 화면 라우트
    pub fn search_route(&self) -> RouteTarget {
        RouteTarget::new(Route::SearchResults).query(self.url_query())
    }

    pub fn canonical_url(&self) -> String {
        self.search_route().to_url()
    }

    /// 검색 기록에 저장할 축약 형태(JSON)
    pub fn minify(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn deminify(stored: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(stored)
    }
}
