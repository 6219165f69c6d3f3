// region:    --- Imports
use super::extract::{AppJson, AppPath, AppQuery};
use crate::auth::extract::AdminUser;
use crate::error::{AppError, AppResult};
use crate::pagination::{Page, Paginated};
use crate::query::resources;
use crate::resource::model::{
    CreateResourceRequest, DownloadResponse, FeatureRequest, Resource, ResourceFilter,
    UpdateResourceRequest,
};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 자료 목록
pub async fn handle_list_resources(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ResourceFilter>,
) -> AppResult<Json<Paginated<Resource>>> {
    let page = Page::new(filter.page, filter.limit);
    let (items, total) = resources::list_resources(&state.db, &filter).await?;
    Ok(Json(Paginated::new(items, page, total)))
}

/// 추천 자료
pub async fn handle_featured_resources(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Resource>>> {
    Ok(Json(resources::list_featured_resources(&state.db).await?))
}

/// 자료 상세
pub async fn handle_get_resource(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Resource>> {
    Ok(Json(resources::get_resource(&state.db, id).await?))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// 다운로드 (카운트 증가 후 링크 반환)
pub async fn handle_download_resource(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<DownloadResponse>> {
    info!("{:<12} --> 다운로드 요청 id: {}", "Handler", id);
    let resource = resources::record_download(&state.db, &*state.event_store, id).await?;
    Ok(Json(DownloadResponse {
        download_url: resource.download_target(),
        download_count: resource.download_count,
    }))
}

/// 관리자: 자료 등록
pub async fn handle_create_resource(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(req): AppJson<CreateResourceRequest>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    if req.title.trim().is_empty() {
        return Err(AppError::bad_request("INVALID_INPUT", "title is required"));
    }
    info!("{:<12} --> 자료 등록 by {}", "Handler", admin.username);
    let resource = resources::create_resource(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

/// 관리자: 자료 수정
pub async fn handle_update_resource(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateResourceRequest>,
) -> AppResult<Json<Resource>> {
    if req.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::bad_request("INVALID_INPUT", "title cannot be empty"));
    }
    Ok(Json(resources::update_resource(&state.db, id, req).await?))
}

/// 관리자: 자료 삭제
pub async fn handle_delete_resource(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    if resources::delete_resource(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("resource"))
    }
}

/// 관리자: 추천 지정/해제
pub async fn handle_feature_resource(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<FeatureRequest>,
) -> AppResult<Json<Resource>> {
    Ok(Json(
        resources::set_resource_featured(&state.db, id, req.featured).await?,
    ))
}

// endregion: --- Command Handlers
