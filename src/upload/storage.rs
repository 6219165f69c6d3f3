/// 업로드 파일 저장
// region:    --- Imports
use super::model::NewUpload;
use crate::error::AppError;
use axum::body::Bytes;
use axum::extract::multipart::Field;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

const MAX_EXTENSION_LEN: usize = 10;

/// 원본 파일 이름에서 안전한 확장자만 남긴다.
pub fn safe_extension(original_name: &str) -> Option<String> {
    let file_name = original_name.rsplit(['/', '\\']).next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    let valid = !stem.is_empty()
        && !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

/// 저장 파일 이름: `<uuid>[.ext]`
pub fn stored_name(id: Uuid, original_name: &str) -> String {
    match safe_extension(original_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

/// 업로드 본문을 조각 단위로 내주는 입력
pub(crate) trait ChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, AppError>;
}

impl ChunkSource for Field<'_> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, AppError> {
        self.chunk()
            .await
            .map_err(|e| AppError::bad_request("INVALID_INPUT", e.body_text()))
    }
}

/// multipart 필드를 `upload_dir`에 스트리밍 저장
pub async fn save_field(
    upload_dir: &Path,
    user_id: i64,
    mut field: Field<'_>,
    max_bytes: usize,
) -> Result<NewUpload, AppError> {
    let original_name = field
        .file_name()
        .map(str::to_string)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "upload".to_string());
    let content_type = field.content_type().map(str::to_string);

    let id = Uuid::new_v4();
    let stored = stored_name(id, &original_name);
    fs::create_dir_all(upload_dir).await?;
    let size = store_chunks(&upload_dir.join(&stored), &mut field, max_bytes).await?;

    info!(
        "{:<12} --> 파일 저장: {} -> {} ({} bytes)",
        "Upload", original_name, stored, size
    );
    Ok(NewUpload {
        id,
        user_id,
        original_name,
        stored_name: stored,
        content_type,
        size: size as i64,
    })
}

/// `path`에 본문을 기록하고 크기를 반환한다. 실패하면 파일을 남기지 않는다.
pub(crate) async fn store_chunks(
    path: &Path,
    source: &mut impl ChunkSource,
    max_bytes: usize,
) -> Result<usize, AppError> {
    let mut file = fs::File::create(path).await?;
    match copy_chunks(source, &mut file, max_bytes).await {
        Ok(size) => Ok(size),
        Err(e) => {
            drop(file);
            discard(path).await;
            Err(e)
        }
    }
}

async fn copy_chunks(
    source: &mut impl ChunkSource,
    file: &mut fs::File,
    max_bytes: usize,
) -> Result<usize, AppError> {
    let mut size: usize = 0;
    while let Some(chunk) = source.next_chunk().await? {
        size += chunk.len();
        if size > max_bytes {
            return Err(AppError::bad_request(
                "UPLOAD_TOO_LARGE",
                format!("upload exceeds {max_bytes} bytes"),
            ));
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(size)
}

/// 저장 중단된 파일 정리
pub async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!("{:<12} --> 임시 파일 삭제 실패 {:?}: {}", "Upload", path, e);
    }
}
