// region:    --- Imports
use super::queries;
use crate::database::DatabaseManager;
use crate::pagination::Page;
use crate::resource::model::Resource;
use crate::search::SearchStrategy;
use crate::service::model::Service;
use sqlx::Error as SqlxError;
use tracing::info;

// endregion: --- Imports

/// 자료 검색
pub async fn search_resources(
    db_manager: &DatabaseManager,
    strategy: &SearchStrategy,
    page: Page,
) -> Result<Vec<Resource>, SqlxError> {
    let (sql, term) = match strategy {
        SearchStrategy::Trigram(term) => (queries::SEARCH_RESOURCES_TRGM, term),
        SearchStrategy::Substring(pattern) => (queries::SEARCH_RESOURCES_LIKE, pattern),
    };
    info!("{:<12} --> 자료 검색: {:?}", "Query", strategy);
    sqlx::query_as::<_, Resource>(sql)
        .bind(term)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(db_manager.pool())
        .await
}

/// 서비스 검색
pub async fn search_services(
    db_manager: &DatabaseManager,
    strategy: &SearchStrategy,
    page: Page,
) -> Result<Vec<Service>, SqlxError> {
    let (sql, term) = match strategy {
        SearchStrategy::Trigram(term) => (queries::SEARCH_SERVICES_TRGM, term),
        SearchStrategy::Substring(pattern) => (queries::SEARCH_SERVICES_LIKE, pattern),
    };
    info!("{:<12} --> 서비스 검색: {:?}", "Query", strategy);
    sqlx::query_as::<_, Service>(sql)
        .bind(term)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(db_manager.pool())
        .await
}
