//! # 사용자 계정 쿼리
//!
//! 사용자 계정은 검색 기록의 소유자를 정하는 데만 쓰입니다.
//! 로그인한 사용자는 다른 세션(다른 브라우저)에서도 자신의 검색 기록을 복원할 수 있습니다.

use crate::error::AppError;
use crate::models::user::User;
use sqlx::SqlitePool;

pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
) -> Result<User, AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    find_one(pool, "id", id).await
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    find_one(pool, "username", username).await
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    find_one(pool, "email", email).await
}

/// 고유 컬럼 하나로 사용자를 찾습니다. `column`은 이 모듈 안의 상수 문자열만 받습니다.
async fn find_one(
    pool: &SqlitePool,
    column: &'static str,
    value: &str,
) -> Result<Option<User>, AppError> {
    let sql = format!(
        "SELECT id, username, email, password_hash, created_at, updated_at \
         FROM users WHERE {column} = ?"
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(value)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}
