use crate::{
    db::users as db_users,
    error::AppError,
    middleware::auth::{create_access_token, AuthUser},
    models::user::*,
    state::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    if req.username.len() < 3 {
        return Err(AppError::BadRequest("Username must be at least 3 characters".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest("Password must be at least 8 characters".to_string()));
    }

    let email = req.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    if let Some(email) = email {
        if !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if db_users::find_by_email(&state.pool, email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
    }

    if db_users::find_by_username(&state.pool, &req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    // Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user_id = uuid::Uuid::now_v7().to_string();
    let user =
        db_users::create_user(&state.pool, &user_id, &req.username, email, &password_hash).await?;

    let access_token = create_access_token(&user.id, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            access_token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = db_users::find_by_username(&state.pool, &req.username)
        .await?
        .ok_or(AppError::Unauthorized("Invalid username or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid username or password".to_string()))?;

    let access_token = create_access_token(&user.id, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(Json(AuthResponse {
        user: user.into(),
        access_token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}
