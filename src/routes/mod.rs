//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과, 이들을 URL에 연결하는 라우터를 모아둔 모듈입니다.
//! Axum에서 핸들러는 추출기(Extractor)로 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `ajax`: AJAX 엔드포인트 (피드백 폼)
//! - `auth`: 인증 관련 (회원가입, 로그인, 내 정보)
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `records`: 레코드 상세와 레코드 추가
//! - `search`: 검색 결과, 고급 검색, 검색 기록

pub mod ajax;
pub mod auth;
pub mod health;
pub mod records;
pub mod search;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::session::ensure_session;
use crate::state::AppState;

/// 전체 애플리케이션 라우터를 만듭니다.
///
/// 모든 API는 `/api/v1` 아래에 있습니다.
/// 경로 파라미터는 axum 0.8 문법(`{id}`)을 사용합니다.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me));

    let api_routes = Router::new()
        .merge(auth_routes)
        // 검색 결과는 GET 쿼리와 POST 폼 본문 양쪽을 받습니다.
        .route(
            "/search/results",
            get(search::search_results).post(search::search_results),
        )
        .route("/search/advanced", get(search::advanced_search))
        .route("/search/history", get(search::search_history))
        .route("/records", post(records::create_record))
        .route("/records/{id}", get(records::get_record))
        .route("/ajax/feedback", post(ajax::feedback))
        .route("/health", get(health::health_check))
        .with_state(state);

    // 개발 환경 기준으로 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        // 세션 레이어가 가장 안쪽이어야 핸들러가 `SessionId`를 찾을 수 있습니다.
        .layer(from_fn(ensure_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
