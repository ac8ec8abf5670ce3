//! # 검색 모듈
//!
//! 검색 요청 하나를 처리하는 데 필요한 구성 요소들입니다.
//! - `params`: 요청 파라미터 묶음과 검색 조건(`SearchParams`)
//! - `backend`: 검색 백엔드, 레지스트리, 검색 결과/에러 타입
//! - `saved`: 저장된 검색의 권한 확인과 복원
//! - `memory`: 세션별 "마지막 검색"과 결과 스크롤러 보관소
//! - `scroller`: 결과 스크롤러
//! - `route`: 리다이렉트 대상(라우트 이름 + 파라미터 + 쿼리)

pub mod backend;
pub mod memory;
pub mod params;
pub mod route;
pub mod saved;
pub mod scroller;

pub use backend::*;
pub use memory::SessionMemory;
pub use params::*;
pub use route::{Route, RouteTarget};
pub use scroller::{ResultScroller, ScrollPosition};
