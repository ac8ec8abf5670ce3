//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 검색 백엔드(search/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `records`: 레코드 저장과 FTS5 전문검색
//! - `search`: 검색 기록 저장/조회
//! - `users`: 사용자 계정 쿼리

pub mod records;
pub mod search;
pub mod users;

pub use records::*;
pub use search::*;
