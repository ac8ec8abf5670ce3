//! # 레코드 API 라우트 핸들러
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/records/{id} | 레코드 상세 + 마지막 검색 + 이전/다음 레코드 |
//! | POST | /api/v1/records | 레코드 추가 (인증 필요) |
//!
//! 레코드 상세 응답에는 세션 메모리에서 꺼낸 두 값이 함께 실립니다.
//! - `last_search`: "검색 결과로 돌아가기" 링크 (없으면 null)
//! - `scroller`: 마지막 검색 결과 안에서의 위치와 이전/다음 레코드 ID (없으면 null)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    db,
    error::AppError,
    middleware::{auth::AuthUser, session::SessionId},
    models::{CreateRecordRequest, Record},
    state::AppState,
};

/// `GET /records/{id}`: 레코드 하나를 조회합니다.
pub async fn get_record(
    State(state): State<AppState>,
    session: SessionId,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let record = db::get_record(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let last_search = state.memory.last_search(session.as_str()).await;
    let scroller = state.memory.scroll_position(session.as_str(), &id).await;

    Ok(Json(json!({
        "record": record,
        "last_search": last_search,
        "scroller": scroller,
    })))
}

/// `POST /records`: 레코드를 추가하고 검색 인덱스에 등록합니다.
///
/// 성공하면 `201 Created`와 저장된 레코드를 반환합니다.
/// 같은 ID가 이미 있으면 409입니다.
pub async fn create_record(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }

    let id = req
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());

    if db::get_record(&state.pool, &id).await?.is_some() {
        return Err(AppError::Conflict(format!("Record {id} already exists")));
    }

    let record = db::insert_record(
        &state.pool,
        &id,
        title,
        req.author.as_deref(),
        req.publish_year,
        req.summary.as_deref(),
    )
    .await?;

    tracing::info!(record_id = %record.id, user_id = %auth_user.user_id, "Record created");
    Ok((StatusCode::CREATED, Json(record)))
}
