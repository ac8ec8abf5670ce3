//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "search_backend": "Index" }`
//!
//! 데이터베이스에 `SELECT 1`을 보내 연결 풀이 살아 있는지도 함께 확인합니다.
//! 로드밸런서나 컨테이너 헬스체크에서 사용합니다.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{error::AppError, state::AppState};

/// `GET /health`: 서버와 DB 상태를 확인합니다.
///
/// DB에 닿지 않으면 `AppError::Database`로 500을 반환합니다.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    Ok(Json(json!({
        "status": "ok",
        "search_backend": state.search.search_class_id,
    })))
}
