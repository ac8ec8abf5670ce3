//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `feedback`: 피드백 폼과 AJAX 응답
//! - `record`: 검색 대상 레코드
//! - `search`: 검색 기록
//! - `user`: 사용자(User) 관련 구조체
//!
//! 하위 모듈의 항목을 재공개(re-export)하므로
//! `crate::models::record::Record` 대신 `crate::models::Record`로 접근할 수 있습니다.

pub mod feedback;
pub mod record;
pub mod search;
pub mod user;

pub use feedback::*;
pub use record::*;
pub use search::*;
pub use user::*;
