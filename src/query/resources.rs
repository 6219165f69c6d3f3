// region:    --- Imports
use super::queries;
use crate::auction::events::MarketEvent;
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::{Event, EventStore};
use crate::pagination::Page;
use crate::resource::model::{
    normalize_tags, CreateResourceRequest, Resource, ResourceFilter, UpdateResourceRequest,
};
use chrono::Utc;
use sqlx::Error as SqlxError;
use tracing::info;

// endregion: --- Imports

pub const FEATURED_LIMIT: i64 = 12;

/// 자료 목록
pub async fn list_resources(
    db_manager: &DatabaseManager,
    filter: &ResourceFilter,
) -> Result<(Vec<Resource>, i64), SqlxError> {
    let page = Page::new(filter.page, filter.limit);
    let category = filter.category.map(|c| c.as_str());
    let tags = filter.required_tags();
    info!(
        "{:<12} --> 자료 목록 조회 category: {:?}, tags: {:?}",
        "Query", category, tags
    );

    let resources = sqlx::query_as::<_, Resource>(queries::LIST_RESOURCES)
        .bind(category)
        .bind(&tags)
        .bind(filter.featured)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(db_manager.pool())
        .await?;

    let total = sqlx::query_scalar::<_, i64>(queries::COUNT_RESOURCES)
        .bind(category)
        .bind(&tags)
        .bind(filter.featured)
        .fetch_one(db_manager.pool())
        .await?;

    Ok((resources, total))
}

/// 추천 자료
pub async fn list_featured_resources(
    db_manager: &DatabaseManager,
) -> Result<Vec<Resource>, SqlxError> {
    sqlx::query_as::<_, Resource>(queries::LIST_FEATURED_RESOURCES)
        .bind(FEATURED_LIMIT)
        .fetch_all(db_manager.pool())
        .await
}

/// 자료 조회
pub async fn get_resource(
    db_manager: &DatabaseManager,
    resource_id: i64,
) -> Result<Resource, SqlxError> {
    info!("{:<12} --> 자료 조회 id: {}", "Query", resource_id);
    sqlx::query_as::<_, Resource>(queries::GET_RESOURCE)
        .bind(resource_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 자료 생성
pub async fn create_resource(
    db_manager: &DatabaseManager,
    req: CreateResourceRequest,
) -> Result<Resource, SqlxError> {
    info!("{:<12} --> 자료 생성: {}", "Query", req.title);
    sqlx::query_as::<_, Resource>(queries::INSERT_RESOURCE)
        .bind(req.title.trim())
        .bind(&req.description)
        .bind(req.category.as_str())
        .bind(normalize_tags(&req.tags))
        .bind(&req.image_url)
        .bind(&req.download_url)
        .bind(&req.download_file)
        .bind(&req.how_to_use)
        .bind(&req.assembly_instructions)
        .bind(req.is_featured)
        .bind(req.is_crawled)
        .bind(&req.source_site)
        .fetch_one(db_manager.pool())
        .await
}

/// 자료 수정
pub async fn update_resource(
    db_manager: &DatabaseManager,
    resource_id: i64,
    req: UpdateResourceRequest,
) -> Result<Resource, SqlxError> {
    info!("{:<12} --> 자료 수정 id: {}", "Query", resource_id);
    sqlx::query_as::<_, Resource>(queries::UPDATE_RESOURCE)
        .bind(resource_id)
        .bind(req.title.as_deref().map(str::trim))
        .bind(&req.description)
        .bind(req.category.map(|c| c.as_str()))
        .bind(req.tags.as_deref().map(normalize_tags))
        .bind(&req.image_url)
        .bind(&req.download_url)
        .bind(&req.download_file)
        .bind(&req.how_to_use)
        .bind(&req.assembly_instructions)
        .bind(&req.source_site)
        .fetch_one(db_manager.pool())
        .await
}

/// 자료 삭제. 없으면 false
pub async fn delete_resource(
    db_manager: &DatabaseManager,
    resource_id: i64,
) -> Result<bool, SqlxError> {
    info!("{:<12} --> 자료 삭제 id: {}", "Query", resource_id);
    let result = sqlx::query(queries::DELETE_RESOURCE)
        .bind(resource_id)
        .execute(db_manager.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}

/// 추천 여부 변경
pub async fn set_resource_featured(
    db_manager: &DatabaseManager,
    resource_id: i64,
    featured: bool,
) -> Result<Resource, SqlxError> {
    sqlx::query_as::<_, Resource>(queries::SET_RESOURCE_FEATURED)
        .bind(resource_id)
        .bind(featured)
        .fetch_one(db_manager.pool())
        .await
}

/// 다운로드 기록
/// 행 잠금 아래에서 카운트를 올리므로 이벤트 버전은 증가한 다운로드 수와 같다.
pub async fn record_download(
    db_manager: &DatabaseManager,
    event_store: &impl EventStore,
    resource_id: i64,
) -> Result<Resource, AppError> {
    info!("{:<12} --> 다운로드 기록 id: {}", "Query", resource_id);
    let mut tx = db_manager.pool().begin().await?;

    let resource = sqlx::query_as::<_, Resource>(queries::INCREMENT_DOWNLOAD_COUNT)
        .bind(resource_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("resource"))?;

    let event = MarketEvent::ResourceDownloaded {
        resource_id,
        download_count: resource.download_count,
        timestamp: Utc::now(),
    };
    let stored: Option<Event> = event_store
        .append(&mut tx, &event, resource.download_count)
        .await?;

    tx.commit().await?;

    if let Some(stored) = stored {
        event_store.publish(&stored).await;
    }
    Ok(resource)
}
