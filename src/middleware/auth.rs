use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated caller. Rejects requests without a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Optional caller identity: `None` when no Authorization header is sent.
/// A header that is present but invalid is still rejected.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<String>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or(AuthError::MissingToken)?;
        let claims = verify_access_token(token, &state.jwt_secret)?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(MaybeUser(None));
        };
        let claims = verify_access_token(token, &state.jwt_secret)?;

        Ok(MaybeUser(Some(claims.sub)))
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AuthError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = value.to_str().map_err(|_| AuthError::InvalidToken)?;
    header
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or(AuthError::InvalidToken)
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AuthError::MissingToken => ("missing_token", "Authorization token is required"),
            AuthError::InvalidToken => ("invalid_token", "Invalid authorization token"),
            AuthError::ExpiredToken => ("expired_token", "Authorization token has expired"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

pub fn create_access_token(
    user_id: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(15)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
