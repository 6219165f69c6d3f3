/// 가입/로그인/로그아웃과 세션 토큰
// region:    --- Imports
use super::password::{hash_password, verify_password};
use super::validation::{validate_email, validate_password, validate_username};
use crate::config::Config;
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::i18n;
use crate::query::users::{self, NewUser};
use crate::user::model::{AuthResponse, LoginRequest, RegisterRequest, User};
use chrono::{Duration, Utc};
use std::fmt::Write;
use tracing::{info, warn};

// endregion: --- Imports

/// 세션 토큰: 32바이트 난수의 16진수 (64자)
pub fn generate_token() -> String {
    rand::random::<[u8; 32]>()
        .iter()
        .fold(String::with_capacity(64), |mut token, byte| {
            let _ = write!(token, "{byte:02x}");
            token
        })
}

/// 지원 언어가 아니면 기본 언어
pub fn preferred_language(requested: Option<&str>, default_lang: &str) -> String {
    requested
        .map(i18n::normalize_tag)
        .filter(|lang| i18n::catalog().supports(lang))
        .unwrap_or_else(|| default_lang.to_string())
}

/// 가입 후 바로 로그인 상태가 된다.
pub async fn register(
    db_manager: &DatabaseManager,
    config: &Config,
    req: RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_ascii_lowercase();
    validate_username(&username)?;
    validate_email(&email)?;
    validate_password(&req.password)?;
    if let Some(location) = &req.location {
        location.validate()?;
    }

    let user = users::create_user(
        db_manager,
        NewUser {
            username,
            password_hash: hash_password(&req.password)?,
            email,
            full_name: req.full_name,
            location: req.location,
            is_service_provider: req.is_service_provider,
            preferred_language: preferred_language(
                req.preferred_language.as_deref(),
                &config.default_language,
            ),
        },
    )
    .await?;
    info!("{:<12} --> 가입 완료: {} (id {})", "Auth", user.username, user.id);

    start_session(db_manager, config, user).await
}

pub async fn login(
    db_manager: &DatabaseManager,
    config: &Config,
    req: LoginRequest,
) -> Result<AuthResponse, AppError> {
    let user = users::find_user_by_username(db_manager, req.username.trim()).await?;
    match user {
        Some(user) if verify_password(&req.password, &user.password) => {
            info!("{:<12} --> 로그인: {}", "Auth", user.username);
            start_session(db_manager, config, user).await
        }
        _ => {
            warn!("{:<12} --> 로그인 실패: {}", "Auth", req.username);
            Err(AppError::Unauthorized("INVALID_CREDENTIALS"))
        }
    }
}

pub async fn logout(db_manager: &DatabaseManager, token: &str) -> Result<(), AppError> {
    users::delete_session(db_manager, token).await?;
    Ok(())
}

async fn start_session(
    db_manager: &DatabaseManager,
    config: &Config,
    user: User,
) -> Result<AuthResponse, AppError> {
    let token = generate_token();
    let expires_at = Utc::now() + Duration::hours(config.session_ttl_hours);
    users::create_session(db_manager, &token, user.id, expires_at).await?;
    Ok(AuthResponse {
        user,
        token,
        expires_at,
    })
}
