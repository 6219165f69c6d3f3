// region:    --- Imports
use super::queries;
use crate::database::DatabaseManager;
use serde::Serialize;
use sqlx::Error as SqlxError;

// endregion: --- Imports

/// 관리자 대시보드 통계
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub users: i64,
    pub service_providers: i64,
    pub resources: i64,
    pub downloads: i64,
    pub services: i64,
    pub active_auctions: i64,
    pub bids: i64,
    pub approved_payments: i64,
}

pub async fn get_admin_stats(db_manager: &DatabaseManager) -> Result<AdminStats, SqlxError> {
    sqlx::query_as::<_, AdminStats>(queries::GET_ADMIN_STATS)
        .fetch_one(db_manager.pool())
        .await
}
