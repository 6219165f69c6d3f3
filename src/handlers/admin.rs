// region:    --- Imports
use super::extract::{AppJson, AppPath, AppQuery};
use crate::auth::extract::AdminUser;
use crate::error::AppResult;
use crate::pagination::{Page, Paginated};
use crate::query::admin::{self, AdminStats};
use crate::query::users;
use crate::state::AppState;
use crate::user::model::{SetAdminRequest, User};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// 대시보드 통계
pub async fn handle_stats(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> AppResult<Json<AdminStats>> {
    Ok(Json(admin::get_admin_stats(&state.db).await?))
}

/// 사용자 목록
pub async fn handle_list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<Paginated<User>>> {
    let page = Page::new(params.page, params.limit);
    let (items, total) = users::list_users(&state.db, page).await?;
    Ok(Json(Paginated::new(items, page, total)))
}

/// 관리자 권한 부여/회수
pub async fn handle_set_admin(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(user_id): AppPath<i64>,
    AppJson(req): AppJson<SetAdminRequest>,
) -> AppResult<Json<User>> {
    info!(
        "{:<12} --> 관리자 권한 변경 user: {} -> {} by {}",
        "Handler", user_id, req.is_admin, admin.username
    );
    Ok(Json(users::set_user_admin(&state.db, user_id, req.is_admin).await?))
}
