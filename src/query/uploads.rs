// region:    --- Imports
use super::queries;
use crate::database::DatabaseManager;
use crate::upload::model::{NewUpload, Upload};
use sqlx::Error as SqlxError;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

/// 업로드 기록
pub async fn insert_upload(
    db_manager: &DatabaseManager,
    upload: &NewUpload,
) -> Result<Upload, SqlxError> {
    info!(
        "{:<12} --> 업로드 기록: {} ({} bytes)",
        "Query", upload.stored_name, upload.size
    );
    sqlx::query_as::<_, Upload>(queries::INSERT_UPLOAD)
        .bind(upload.id)
        .bind(upload.user_id)
        .bind(&upload.original_name)
        .bind(&upload.stored_name)
        .bind(&upload.content_type)
        .bind(upload.size)
        .fetch_one(db_manager.pool())
        .await
}

/// 업로드 조회
pub async fn get_upload(db_manager: &DatabaseManager, id: Uuid) -> Result<Upload, SqlxError> {
    sqlx::query_as::<_, Upload>(queries::GET_UPLOAD)
        .bind(id)
        .fetch_one(db_manager.pool())
        .await
}
