// region:    --- Imports
use super::extract::AppPath;
use crate::auth::extract::AuthUser;
use crate::error::{AppError, AppResult};
use crate::query::uploads;
use crate::state::AppState;
use crate::upload::model::{UploadConfig, UploadResponse};
use crate::upload::storage;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

const FILE_FIELD: &str = "file";

/// 파일 업로드 (multipart `file` 필드)
pub async fn handle_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request("INVALID_INPUT", e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let new_upload = storage::save_field(
            &state.config.upload_dir,
            auth.user.id,
            field,
            state.config.max_upload_bytes,
        )
        .await?;

        let upload = match uploads::insert_upload(&state.db, &new_upload).await {
            Ok(upload) => upload,
            Err(e) => {
                storage::discard(&state.config.upload_dir.join(&new_upload.stored_name)).await;
                return Err(e.into());
            }
        };
        info!("{:<12} --> 업로드 완료: {}", "Handler", upload.id);
        return Ok((StatusCode::CREATED, Json(upload.into())));
    }

    Err(AppError::bad_request(
        "MISSING_FILE",
        "multipart field 'file' is required",
    ))
}

/// 업로드 메타데이터
pub async fn handle_get_upload(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<UploadResponse>> {
    Ok(Json(uploads::get_upload(&state.db, id).await?.into()))
}

/// 클라이언트 업로더 설정
pub async fn handle_upload_config(State(state): State<AppState>) -> Json<UploadConfig> {
    Json(UploadConfig::new(state.config.max_upload_bytes))
}
