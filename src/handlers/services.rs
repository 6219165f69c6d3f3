// region:    --- Imports
use super::extract::{AppJson, AppPath, AppQuery};
use crate::auth::extract::{AdminUser, AuthUser};
use crate::error::{AppError, AppResult};
use crate::location::{validate_coordinates, Location};
use crate::pagination::{Page, Paginated};
use crate::query::services;
use crate::service::model::{
    CreateServiceRequest, RateServiceRequest, Service, ServiceFilter, UpdateServiceRequest,
};
use crate::state::AppState;
use crate::user::model::User;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

// endregion: --- Imports

fn ensure_owner_or_admin(service: &Service, user: &User) -> Result<(), AppError> {
    if service.user_id == user.id || user.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

// region:    --- Query Handlers

/// 서비스 목록. 좌표가 있으면 가까운 순
pub async fn handle_list_services(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ServiceFilter>,
) -> AppResult<Response> {
    let page = Page::new(filter.page, filter.limit);
    match (filter.lat, filter.long) {
        (Some(lat), Some(long)) => {
            validate_coordinates(lat, long)?;
            let center = Location {
                lat,
                long,
                address: None,
            };
            let (items, total) = services::list_nearby_services(&state.db, &filter, &center).await?;
            Ok(Json(Paginated::new(items, page, total)).into_response())
        }
        (None, None) => {
            let (items, total) = services::list_services(&state.db, &filter).await?;
            Ok(Json(Paginated::new(items, page, total)).into_response())
        }
        _ => Err(AppError::bad_request(
            "INVALID_LOCATION",
            "lat and long must be given together",
        )),
    }
}

/// 서비스 상세
pub async fn handle_get_service(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Service>> {
    Ok(Json(services::get_service(&state.db, id).await?))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// 서비스 등록
pub async fn handle_create_service(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<CreateServiceRequest>,
) -> AppResult<(StatusCode, Json<Service>)> {
    if req.title.trim().is_empty() {
        return Err(AppError::bad_request("INVALID_INPUT", "title is required"));
    }
    req.location.validate()?;
    info!("{:<12} --> 서비스 등록 by {}", "Handler", auth.user.username);
    let service = services::create_service(&state.db, auth.user.id, req).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// 서비스 수정 (등록자 또는 관리자)
pub async fn handle_update_service(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateServiceRequest>,
) -> AppResult<Json<Service>> {
    let service = services::get_service(&state.db, id).await?;
    ensure_owner_or_admin(&service, &auth.user)?;
    if req.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::bad_request("INVALID_INPUT", "title cannot be empty"));
    }
    if let Some(location) = &req.location {
        location.validate()?;
    }
    Ok(Json(services::update_service(&state.db, id, req).await?))
}

/// 서비스 삭제 (등록자 또는 관리자)
pub async fn handle_delete_service(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    let service = services::get_service(&state.db, id).await?;
    ensure_owner_or_admin(&service, &auth.user)?;
    if services::delete_service(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("service"))
    }
}

/// 서비스 평가
pub async fn handle_rate_service(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<RateServiceRequest>,
) -> AppResult<Json<Service>> {
    Ok(Json(
        services::rate_service(&state.db, id, auth.user.id, req.rating).await?,
    ))
}

/// 관리자: 서비스 인증
pub async fn handle_verify_service(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Service>> {
    info!("{:<12} --> 서비스 인증 id: {} by {}", "Handler", id, admin.username);
    Ok(Json(services::set_service_verified(&state.db, id, true).await?))
}

// endregion: --- Command Handlers
