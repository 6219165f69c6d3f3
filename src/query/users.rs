// region:    --- Imports
use super::{queries, unique_violation};
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::location::Location;
use crate::pagination::Page;
use crate::user::model::{Session, UpdateUserRequest, User};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::Error as SqlxError;
use tracing::info;

// endregion: --- Imports

/// 저장 직전의 신규 사용자 (비밀번호는 해시)
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub full_name: Option<String>,
    pub location: Option<Location>,
    pub is_service_provider: bool,
    pub preferred_language: String,
}

// region:    --- Users

/// 사용자 생성
pub async fn create_user(db_manager: &DatabaseManager, user: NewUser) -> Result<User, AppError> {
    info!("{:<12} --> 사용자 생성: {}", "Query", user.username);
    sqlx::query_as::<_, User>(queries::INSERT_USER)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(user.location.map(Json))
        .bind(user.is_service_provider)
        .bind(&user.preferred_language)
        .fetch_one(db_manager.pool())
        .await
        .map_err(|e| match unique_violation(&e).as_deref() {
            Some("users_username_key") => {
                AppError::conflict("USERNAME_TAKEN", "username already taken")
            }
            Some("users_email_key") => AppError::conflict("EMAIL_TAKEN", "email already registered"),
            _ => AppError::Database(e),
        })
}

/// 사용자 조회
pub async fn get_user(db_manager: &DatabaseManager, user_id: i64) -> Result<User, SqlxError> {
    sqlx::query_as::<_, User>(queries::GET_USER)
        .bind(user_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 아이디로 사용자 조회
pub async fn find_user_by_username(
    db_manager: &DatabaseManager,
    username: &str,
) -> Result<Option<User>, SqlxError> {
    sqlx::query_as::<_, User>(queries::GET_USER_BY_USERNAME)
        .bind(username)
        .fetch_optional(db_manager.pool())
        .await
}

/// 사용자 정보 수정
pub async fn update_user(
    db_manager: &DatabaseManager,
    user_id: i64,
    update: UpdateUserRequest,
) -> Result<User, SqlxError> {
    info!("{:<12} --> 사용자 수정 id: {}", "Query", user_id);
    sqlx::query_as::<_, User>(queries::UPDATE_USER)
        .bind(user_id)
        .bind(update.full_name)
        .bind(update.location.map(Json))
        .bind(update.preferred_language)
        .bind(update.is_service_provider)
        .fetch_one(db_manager.pool())
        .await
}

/// 관리자 권한 변경
pub async fn set_user_admin(
    db_manager: &DatabaseManager,
    user_id: i64,
    is_admin: bool,
) -> Result<User, SqlxError> {
    info!(
        "{:<12} --> 관리자 권한 변경 id: {} -> {}",
        "Query", user_id, is_admin
    );
    sqlx::query_as::<_, User>(queries::SET_USER_ADMIN)
        .bind(user_id)
        .bind(is_admin)
        .fetch_one(db_manager.pool())
        .await
}

/// 사용자 목록
pub async fn list_users(
    db_manager: &DatabaseManager,
    page: Page,
) -> Result<(Vec<User>, i64), SqlxError> {
    let users = sqlx::query_as::<_, User>(queries::LIST_USERS)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(db_manager.pool())
        .await?;
    let total = sqlx::query_scalar::<_, i64>(queries::COUNT_USERS)
        .fetch_one(db_manager.pool())
        .await?;
    Ok((users, total))
}

// endregion: --- Users

// region:    --- Sessions

/// 세션 생성
pub async fn create_session(
    db_manager: &DatabaseManager,
    token: &str,
    user_id: i64,
    expires_at: DateTime<Utc>,
) -> Result<Session, SqlxError> {
    sqlx::query_as::<_, Session>(queries::INSERT_SESSION)
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(db_manager.pool())
        .await
}

/// 세션 조회
pub async fn find_session(
    db_manager: &DatabaseManager,
    token: &str,
) -> Result<Option<Session>, SqlxError> {
    sqlx::query_as::<_, Session>(queries::GET_SESSION)
        .bind(token)
        .fetch_optional(db_manager.pool())
        .await
}

/// 세션 삭제
pub async fn delete_session(db_manager: &DatabaseManager, token: &str) -> Result<(), SqlxError> {
    sqlx::query(queries::DELETE_SESSION)
        .bind(token)
        .execute(db_manager.pool())
        .await?;
    Ok(())
}

/// 만료 세션 정리. 삭제된 수 반환
pub async fn delete_expired_sessions(
    db_manager: &DatabaseManager,
    now: DateTime<Utc>,
) -> Result<u64, SqlxError> {
    let result = sqlx::query(queries::DELETE_EXPIRED_SESSIONS)
        .bind(now)
        .execute(db_manager.pool())
        .await?;
    Ok(result.rows_affected())
}

// endregion: --- Sessions
