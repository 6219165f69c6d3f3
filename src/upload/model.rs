use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 업로드 재시도 간격 (ms). 클라이언트 업로더 설정에 그대로 쓰인다.
pub const RETRY_DELAYS_MS: [u64; 4] = [0, 1000, 3000, 5000];

// 업로드 모델
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: Uuid,
    pub user_id: i64,
    pub original_name: String,
    pub stored_name: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

impl Upload {
    /// 정적 파일 경로
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.stored_name)
    }
}

/// 업로드 응답 (메타데이터 + 접근 경로)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(flatten)]
    pub upload: Upload,
    pub url: String,
}

impl From<Upload> for UploadResponse {
    fn from(upload: Upload) -> Self {
        let url = upload.url();
        Self { upload, url }
    }
}

/// 저장 직후 기록할 업로드 정보
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub id: Uuid,
    pub user_id: i64,
    pub original_name: String,
    pub stored_name: String,
    pub content_type: Option<String>,
    pub size: i64,
}

/// 클라이언트 업로더 설정
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    pub endpoint: &'static str,
    pub files_base_url: &'static str,
    pub max_upload_bytes: usize,
    pub retry_delays: [u64; 4],
}

impl UploadConfig {
    pub fn new(max_upload_bytes: usize) -> Self {
        Self {
            endpoint: "/api/uploads",
            files_base_url: "/uploads",
            max_upload_bytes,
            retry_delays: RETRY_DELAYS_MS,
        }
    }
}
