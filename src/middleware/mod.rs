//! # 미들웨어와 요청 추출기
//!
//! - `auth`: JWT 액세스 토큰 발급/검증, `AuthUser`/`MaybeUser` 추출기
//! - `session`: 세션 쿠키 보장 미들웨어와 `SessionId` 추출기

pub mod auth;
pub mod session;
