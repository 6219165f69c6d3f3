// region:    --- Imports
use super::extract::AppJson;
use crate::auth::extract::AuthUser;
use crate::auth::session::{self, preferred_language};
use crate::error::AppResult;
use crate::query::users;
use crate::state::AppState;
use crate::user::model::{AuthResponse, LoginRequest, RegisterRequest, UpdateUserRequest, User};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

// endregion: --- Imports

/// 가입
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    info!("{:<12} --> 가입 요청: {}", "Handler", req.username);
    let response = session::register(&state.db, &state.config, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// 로그인
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    info!("{:<12} --> 로그인 요청: {}", "Handler", req.username);
    Ok(Json(session::login(&state.db, &state.config, req).await?))
}

/// 로그아웃 (현재 토큰 폐기)
pub async fn handle_logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    session::logout(&state.db, &auth.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 내 정보
pub async fn handle_get_current_user(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}

/// 내 정보 수정
pub async fn handle_update_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(mut req): AppJson<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    if let Some(location) = &req.location {
        location.validate()?;
    }
    req.preferred_language = req
        .preferred_language
        .take()
        .map(|lang| preferred_language(Some(&lang), &state.config.default_language));
    Ok(Json(users::update_user(&state.db, auth.user.id, req).await?))
}
