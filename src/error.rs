//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! Rust에서는 예외(exception) 대신 `Result<T, E>` 타입으로 에러를 처리합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 핸들러가 반환하는 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 검색 엔진 호출의 결과는 `crate::search::SearchError`로 따로 분류됩니다.
//! 그중 "쿼리 파싱 실패"만 핸들러에서 복구되고, 나머지는 `AppError::Search`로
//! 감싸져 500 응답이 됩니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::search::SearchError;

/// 핸들러에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 다른 세션/사용자의 저장된 검색에 접근하려는 경우 (HTTP 403)
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx::Error → AppError::Database 자동 변환
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 저장된 검색 객체를 JSON으로 직렬화/역직렬화하지 못함 (HTTP 500)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 복구하지 않는 검색 엔진 오류 (HTTP 500)
    /// 파싱 오류는 핸들러가 먼저 가로채므로 여기까지 오지 않습니다.
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Serialization, Search, Internal)는 실제 내용을
    /// 로그에만 기록하고, 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::AccessDenied(ref msg) => {
                tracing::warn!("Access denied: {}", msg);
                (StatusCode::FORBIDDEN, "access_denied", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "serialization_error",
                    "A stored search could not be restored".to_string(),
                )
            }
            AppError::Search(ref e) => {
                tracing::error!("Search backend error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "search_error",
                    "The search could not be performed".to_string(),
                )
            }
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
