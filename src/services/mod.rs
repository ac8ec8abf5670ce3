//! # 서비스 모듈
//!
//! HTTP와 DB에 직접 묶이지 않는 비즈니스 로직입니다.
//! - `feedback`: 피드백 폼 검증과 보고서 작성
//! - `mailer`: 메일 전송 수단

pub mod feedback;
pub mod mailer;
