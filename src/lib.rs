//! # katalog
//!
//! 서지 레코드 검색 서비스의 라이브러리 크레이트입니다.
//! 바이너리(`main.rs`)와 통합 테스트(`tests/`)가 같은 라우터와 상태를 공유합니다.
//!
//! ## 모듈 구성
//! - `config`: 환경변수 설정
//! - `db`: SQLite 쿼리 (사용자, 레코드, 검색 기록)
//! - `error`: 공통 에러 타입과 HTTP 응답 변환
//! - `middleware`: JWT 인증 추출기, 세션 쿠키
//! - `models`: 요청/응답/DB 행 구조체
//! - `routes`: HTTP 핸들러와 라우터
//! - `search`: 검색 파라미터, 백엔드, 저장된 검색, 결과 스크롤러
//! - `services`: 피드백 보고서와 메일 전송
//! - `state`: 핸들러가 공유하는 애플리케이션 상태

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;

pub use routes::router;
pub use state::AppState;
