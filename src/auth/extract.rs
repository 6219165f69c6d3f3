/// 요청 인증 추출기 (`Authorization: Bearer <token>`)
// region:    --- Imports
use crate::error::AppError;
use crate::query::users;
use crate::state::AppState;
use crate::user::model::User;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;

// endregion: --- Imports

/// 로그인한 사용자
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// 관리자
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or(AppError::Unauthorized("UNAUTHORIZED"))?
            .to_string();

        let session = users::find_session(&state.db, &token)
            .await?
            .ok_or(AppError::Unauthorized("UNAUTHORIZED"))?;
        if session.expires_at <= Utc::now() {
            users::delete_session(&state.db, &token).await?;
            return Err(AppError::Unauthorized("SESSION_EXPIRED"));
        }

        let user = users::get_user(&state.db, session.user_id)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => AppError::Unauthorized("UNAUTHORIZED"),
                other => AppError::Database(other),
            })?;
        Ok(AuthUser { user, token })
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser { user, .. } = AuthUser::from_request_parts(parts, state).await?;
        if user.is_admin {
            Ok(AdminUser(user))
        } else {
            Err(AppError::Forbidden)
        }
    }
}
