//! # 검색 API 라우트 핸들러
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET, POST | /api/v1/search/results | 검색 실행 / 저장된 검색 복원 / jumpto |
//! | GET | /api/v1/search/advanced | 고급 검색 옵션, `?edit=<id>`로 저장된 고급 검색 불러오기 |
//! | GET | /api/v1/search/history | 이 세션(과 로그인 사용자)의 검색 기록 |
//!
//! ## 검색 결과 요청의 처리 순서
//! ```text
//! ?saved=<id> 있음 → 저장된 검색의 URL로 리다이렉트 (끝)
//!        ↓
//! 쿼리 문자열 + 폼 본문 → Parameters → SearchParams
//!        ↓
//! 백엔드 검색 ── 파싱 오류 → 빈 결과 + parse_error=true 로 렌더링 (끝)
//!        │  └─ 그 밖의 오류 → 500
//!        ↓
//! ?jumpto=N 이 유효함 → N번째 레코드로 리다이렉트 (끝)
//!        ↓
//! 마지막 검색 기억 → 검색 기록 저장 → 결과 스크롤러 초기화 → 렌더링
//! ```
//!
//! ## 사용 예시
//! ```text
//! GET /api/v1/search/results?lookfor=rust&type=Title
//! GET /api/v1/search/results?lookfor0=rust&type0=Title&lookfor1=klabnik&type1=Author&join=AND
//! GET /api/v1/search/results?lookfor=rust&jumpto=2   ← 두 번째 결과로 바로 이동
//! GET /api/v1/search/results?saved=<검색 기록 ID>
//! ```

use axum::{
    body::Bytes,
    extract::{Query, RawQuery, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    db,
    error::AppError,
    middleware::{auth::MaybeUser, session::SessionId},
    models::{HistoryEntry, Record},
    search::{
        saved::{self, Restored},
        BackendEntry, Parameters, ResultScroller, Route, RouteTarget, SearchBackend,
        SearchError, SearchOptions, SearchParams, SearchResults, SearchType, SortOrder,
    },
    state::AppState,
};

/// 검색 결과 화면의 뷰 모델
#[derive(Debug, Serialize)]
pub struct ResultsView {
    pub search_class_id: String,
    /// 검색어를 해석하지 못해 빈 결과를 보여주는 경우 true
    pub parse_error: bool,
    pub lookfor: String,
    pub search_type: SearchType,
    pub results: Vec<Record>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub sort: SortOrder,
    /// 이 검색을 다시 실행하는 정규 URL
    pub search_url: String,
    /// 검색 기록에 저장된 경우 그 ID (`?saved=`에 사용)
    pub search_id: Option<String>,
}

impl ResultsView {
    fn new(results: SearchResults, parse_error: bool, search_id: Option<String>) -> Self {
        let params = results.params;
        Self {
            search_class_id: params.search_class_id.clone(),
            parse_error,
            lookfor: params.display_query(),
            search_type: params.search_type,
            results: results.records,
            total: results.total,
            page: params.page,
            limit: params.limit,
            sort: params.sort,
            search_url: params.canonical_url(),
            search_id,
        }
    }
}

/// `GET|POST /api/v1/search/results`: 검색을 실행하고 결과를 반환합니다.
///
/// 리다이렉트(저장된 검색, jumpto)는 `303 See Other`로 응답합니다.
pub async fn search_results(
    State(state): State<AppState>,
    session: SessionId,
    user: MaybeUser,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    // 저장된 검색, jumpto는 쿼리 문자열에서만 읽습니다.
    let query = Parameters::from_query(raw_query.as_deref());

    if let Some(saved_id) = query.get("saved") {
        let target =
            saved::resolve(&state.pool, saved_id, session.as_str(), user.user_id()).await?;
        return Ok(Redirect::to(&target.to_url()).into_response());
    }

    let entry = configured_backend(&state)?;

    let form_body: &[u8] = if is_form_body(&headers) { &body[..] } else { &[] };
    let request = Parameters::merge(raw_query.as_deref(), form_body);
    let params = SearchParams::from_request(&state.search.search_class_id, &request, &entry.options);

    let backend = (entry.construct)(&state.pool);
    let results = match backend.perform(&params).await {
        Ok(results) => results,
        Err(SearchError::Parse(message)) => {
            // 빈 결과 객체를 만들어 검색어와 정렬 등이 그대로 화면에 남도록 합니다.
            tracing::info!(query = %params.display_query(), "Unparseable search: {}", message);
            let empty = SearchBackend::Empty.perform(&params).await?;
            return Ok(Json(ResultsView::new(empty, true, None)).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(target) = jump_target(query.get("jumpto"), &results) {
        tracing::debug!(url = %target.to_url(), "Jumping to record");
        return Ok(Redirect::to(&target.to_url()).into_response());
    }

    let search_url = params.canonical_url();

    if state.search.remember_search {
        state
            .memory
            .remember_search(session.as_str(), search_url.clone())
            .await;
    }

    let search_id = if state.search.save_to_history {
        let saved = db::save_search(&state.pool, &params, session.as_str(), user.user_id()).await?;
        Some(saved.id)
    } else {
        None
    };

    if state.search.use_result_scroller {
        let scroller = ResultScroller::init(&results, search_id.clone(), search_url);
        state.memory.init_scroller(session.as_str(), scroller).await;
    }

    tracing::debug!(
        query = %params.display_query(),
        total = results.total,
        page = params.page,
        "Search performed"
    );
    Ok(Json(ResultsView::new(results, false, search_id)).into_response())
}

/// `jumpto`가 현재 페이지 결과의 1부터 시작하는 유효한 위치면 그 레코드의 라우트를 돌려줍니다.
///
/// 값이 없거나, 숫자가 아니거나, 범위를 벗어나면 None (무시하고 정상 렌더링)
pub fn jump_target(jumpto: Option<&str>, results: &SearchResults) -> Option<RouteTarget> {
    let position = jumpto?.trim().parse::<usize>().ok()?;
    let record = results.record_at(position)?;
    Some(RouteTarget::new(Route::Record).param("id", record.id.clone()))
}

fn configured_backend(state: &AppState) -> Result<&BackendEntry, AppError> {
    state.backend().ok_or_else(|| {
        AppError::Internal(format!(
            "Unknown search backend: {}",
            state.search.search_class_id
        ))
    })
}

fn is_form_body(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

#[derive(Debug, Deserialize)]
pub struct AdvancedQuery {
    /// 편집할 저장된 검색의 ID
    pub edit: Option<String>,
}

/// 고급 검색 폼의 뷰 모델
#[derive(Debug, Serialize)]
pub struct AdvancedView {
    pub search_class_id: String,
    pub options: SearchOptions,
    /// 불러온 고급 검색 (없으면 null)
    pub saved: Option<SearchParams>,
    pub saved_url: Option<String>,
    /// 불러오기에 실패한 경우 메시지 키
    pub error: Option<&'static str>,
}

/// `GET /api/v1/search/advanced`: 고급 검색 옵션과 (선택적으로) 불러온 검색을 반환합니다.
///
/// 백엔드가 고급 검색을 지원하지 않으면 400입니다.
/// 저장된 검색을 불러오지 못한 경우는 에러가 아니라 `error` 필드로 알립니다.
pub async fn advanced_search(
    State(state): State<AppState>,
    session: SessionId,
    user: MaybeUser,
    Query(query): Query<AdvancedQuery>,
) -> Result<Json<AdvancedView>, AppError> {
    let entry = configured_backend(&state)?;
    if !entry.options.advanced_supported {
        return Err(AppError::BadRequest("Advanced search not supported.".to_string()));
    }

    let mut view = AdvancedView {
        search_class_id: state.search.search_class_id.clone(),
        options: entry.options.clone(),
        saved: None,
        saved_url: None,
        error: None,
    };

    if let Some(search_id) = query.edit {
        match saved::restore_advanced_search(
            &state.pool,
            &search_id,
            session.as_str(),
            user.user_id(),
        )
        .await?
        {
            Restored::Search(params) => {
                view.saved_url = Some(
                    RouteTarget::new(Route::SearchAdvanced)
                        .query(params.url_query())
                        .to_url(),
                );
                view.saved = Some(params);
            }
            Restored::Rejected(code) => {
                tracing::debug!(search_id = %search_id, code, "Saved advanced search not restored");
                view.error = Some(code);
            }
        }
    }

    Ok(Json(view))
}

/// `GET /api/v1/search/history` → `{ "searches": [...] }`
///
/// 최신 검색이 먼저 옵니다. 복원할 수 없는 (손상된) 기록은 건너뜁니다.
pub async fn search_history(
    State(state): State<AppState>,
    session: SessionId,
    user: MaybeUser,
) -> Result<Json<Value>, AppError> {
    let records = db::list_searches(&state.pool, session.as_str(), user.user_id()).await?;

    let searches: Vec<HistoryEntry> = records
        .into_iter()
        .filter_map(|record| match SearchParams::deminify(&record.search_object) {
            Ok(params) => Some(HistoryEntry {
                id: record.id,
                url: params.canonical_url(),
                query: params.display_query(),
                created_at: record.created_at,
            }),
            Err(e) => {
                tracing::warn!(search_id = %record.id, "Skipping unreadable search: {}", e);
                None
            }
        })
        .collect();

    Ok(Json(json!({ "searches": searches })))
}
