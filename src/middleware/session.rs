//! # 세션 식별자 미들웨어
//!
//! 검색 기록과 세션 메모리는 세션 ID를 키로 사용합니다.
//! 세션 ID는 `katalog_sid` 쿠키로 주고받습니다.
//!
//! ## 동작 방식
//! 1. `ensure_session` 미들웨어가 요청의 쿠키에서 세션 ID를 찾습니다.
//! 2. 없으면 새 UUIDv7을 만들고, 응답에 `Set-Cookie`를 붙입니다.
//! 3. 세션 ID를 요청 extensions에 넣어두면, 핸들러는 `SessionId` 추출기로 꺼내 씁니다.
//!
//! 전역 세션 매니저를 찾아보는 대신, 핸들러가 세션 ID를 명시적인 인자로 받게 됩니다.

use axum::{
    extract::{FromRequestParts, Request},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

pub const SESSION_COOKIE: &str = "katalog_sid";

/// 현재 요청의 세션 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `Cookie` 헤더(여러 개일 수 있음)에서 세션 쿠키 값을 찾습니다.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 모든 요청에 세션 ID를 보장하는 미들웨어
pub async fn ensure_session(mut request: Request, next: Next) -> Response {
    let (session_id, is_new) = match session_from_headers(request.headers()) {
        Some(existing) => (existing, false),
        None => (uuid::Uuid::now_v7().to_string(), true),
    };

    request
        .extensions_mut()
        .insert(SessionId(session_id.clone()));

    let mut response = next.run(request).await;

    if is_new {
        let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("Could not encode session cookie: {}", e),
        }
    }

    response
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionId>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer is not installed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; katalog_sid=abc-123; lang=de"),
        );
        assert_eq!(session_from_headers(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_from_headers(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("katalog_sid="));
        assert_eq!(session_from_headers(&headers), None);
    }
}
