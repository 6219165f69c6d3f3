// region:    --- Imports
use super::queries;
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::location::{bounding_box, Location, DEFAULT_RADIUS_KM, MAX_RADIUS_KM};
use crate::pagination::Page;
use crate::resource::model::{normalize_tag, normalize_tags};
use crate::service::model::{
    running_average, CreateServiceRequest, NearbyService, Service, ServiceFilter,
    UpdateServiceRequest,
};
use sqlx::types::Json;
use sqlx::Error as SqlxError;
use tracing::info;

// endregion: --- Imports

/// 서비스 목록 (태그/종류 필터)
pub async fn list_services(
    db_manager: &DatabaseManager,
    filter: &ServiceFilter,
) -> Result<(Vec<Service>, i64), SqlxError> {
    let page = Page::new(filter.page, filter.limit);
    let service_type = filter.service_type.map(|t| t.as_str());
    let tag = filter.tag.as_deref().map(normalize_tag);
    info!(
        "{:<12} --> 서비스 목록 조회 type: {:?}, tag: {:?}",
        "Query", service_type, tag
    );

    let services = sqlx::query_as::<_, Service>(queries::LIST_SERVICES)
        .bind(service_type)
        .bind(&tag)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(db_manager.pool())
        .await?;

    let total = sqlx::query_scalar::<_, i64>(queries::COUNT_SERVICES)
        .bind(service_type)
        .bind(&tag)
        .fetch_one(db_manager.pool())
        .await?;

    Ok((services, total))
}

/// 반경 내 서비스 (가까운 순)
/// SQL은 경계 상자로 후보만 고르고, 실제 거리 필터와 정렬은 여기서 한다.
pub async fn list_nearby_services(
    db_manager: &DatabaseManager,
    filter: &ServiceFilter,
    center: &Location,
) -> Result<(Vec<NearbyService>, i64), AppError> {
    center.validate()?;
    let page = Page::new(filter.page, filter.limit);
    let radius_km = filter
        .radius_km
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(DEFAULT_RADIUS_KM)
        .min(MAX_RADIUS_KM);
    let bbox = bounding_box(center, radius_km);
    let [(west_min, west_max), (east_min, east_max)] = bbox.long_ranges;
    info!(
        "{:<12} --> 주변 서비스 조회 ({}, {}) 반경 {}km",
        "Query", center.lat, center.long, radius_km
    );

    let candidates = sqlx::query_as::<_, Service>(queries::LIST_SERVICES_IN_BOX)
        .bind(filter.service_type.map(|t| t.as_str()))
        .bind(filter.tag.as_deref().map(normalize_tag))
        .bind(bbox.min_lat)
        .bind(bbox.max_lat)
        .bind(west_min)
        .bind(west_max)
        .bind(east_min)
        .bind(east_max)
        .fetch_all(db_manager.pool())
        .await?;

    let (items, total) = rank_by_distance(candidates, center, radius_km, page);
    Ok((items, total))
}

/// 반경 필터 후 거리순 정렬, 페이지 잘라내기. (페이지 항목, 전체 수)
pub fn rank_by_distance(
    candidates: Vec<Service>,
    center: &Location,
    radius_km: f64,
    page: Page,
) -> (Vec<NearbyService>, i64) {
    let mut nearby: Vec<NearbyService> = candidates
        .into_iter()
        .map(|service| {
            let distance_km = center.distance_km(&service.location);
            NearbyService {
                service,
                distance_km,
            }
        })
        .filter(|n| n.distance_km <= radius_km)
        .collect();

    nearby.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.service.id.cmp(&b.service.id))
    });

    let total = nearby.len() as i64;
    let items = nearby
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    (items, total)
}

/// 서비스 조회
pub async fn get_service(
    db_manager: &DatabaseManager,
    service_id: i64,
) -> Result<Service, SqlxError> {
    info!("{:<12} --> 서비스 조회 id: {}", "Query", service_id);
    sqlx::query_as::<_, Service>(queries::GET_SERVICE)
        .bind(service_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 서비스 생성. 등록자는 서비스 제공자로 표시된다.
pub async fn create_service(
    db_manager: &DatabaseManager,
    user_id: i64,
    req: CreateServiceRequest,
) -> Result<Service, SqlxError> {
    info!("{:<12} --> 서비스 생성: {} (user {})", "Query", req.title, user_id);
    let mut tx = db_manager.pool().begin().await?;

    let service = sqlx::query_as::<_, Service>(queries::INSERT_SERVICE)
        .bind(user_id)
        .bind(req.title.trim())
        .bind(&req.description)
        .bind(req.service_type.as_str())
        .bind(Json(&req.location))
        .bind(normalize_tags(&req.tags))
        .bind(&req.image_url)
        .bind(&req.printer_model)
        .bind(normalize_tags(&req.materials))
        .bind(&req.specialty)
        .bind(req.hourly_rate)
        .bind(&req.contact_phone)
        .bind(&req.contact_email)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(queries::MARK_SERVICE_PROVIDER)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(service)
}

/// 서비스 수정
pub async fn update_service(
    db_manager: &DatabaseManager,
    service_id: i64,
    req: UpdateServiceRequest,
) -> Result<Service, SqlxError> {
    info!("{:<12} --> 서비스 수정 id: {}", "Query", service_id);
    sqlx::query_as::<_, Service>(queries::UPDATE_SERVICE)
        .bind(service_id)
        .bind(req.title.as_deref().map(str::trim))
        .bind(&req.description)
        .bind(req.service_type.map(|t| t.as_str()))
        .bind(req.location.as_ref().map(Json))
        .bind(req.tags.as_deref().map(normalize_tags))
        .bind(&req.image_url)
        .bind(&req.printer_model)
        .bind(req.materials.as_deref().map(normalize_tags))
        .bind(&req.specialty)
        .bind(req.hourly_rate)
        .bind(&req.contact_phone)
        .bind(&req.contact_email)
        .fetch_one(db_manager.pool())
        .await
}

/// 서비스 삭제. 없으면 false
pub async fn delete_service(
    db_manager: &DatabaseManager,
    service_id: i64,
) -> Result<bool, SqlxError> {
    info!("{:<12} --> 서비스 삭제 id: {}", "Query", service_id);
    let result = sqlx::query(queries::DELETE_SERVICE)
        .bind(service_id)
        .execute(db_manager.pool())
        .await?;
    Ok(result.rows_affected() > 0)
}

/// 평점 반영 (행 잠금 후 누적 평균 갱신)
pub async fn rate_service(
    db_manager: &DatabaseManager,
    service_id: i64,
    rater_id: i64,
    rating: i32,
) -> Result<Service, AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::bad_request(
            "INVALID_RATING",
            format!("rating {rating} is out of range"),
        ));
    }
    info!(
        "{:<12} --> 서비스 평가 id: {}, rating: {}",
        "Query", service_id, rating
    );

    let mut tx = db_manager.pool().begin().await?;
    let service = sqlx::query_as::<_, Service>(queries::GET_SERVICE_FOR_UPDATE)
        .bind(service_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("service"))?;

    if service.user_id == rater_id {
        return Err(AppError::bad_request(
            "OWN_SERVICE_RATING",
            "cannot rate own service",
        ));
    }

    let average = running_average(service.rating, service.rating_count, rating);
    let updated = sqlx::query_as::<_, Service>(queries::UPDATE_SERVICE_RATING)
        .bind(service_id)
        .bind(average)
        .bind(service.rating_count + 1)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(updated)
}

/// 인증 여부 변경
pub async fn set_service_verified(
    db_manager: &DatabaseManager,
    service_id: i64,
    verified: bool,
) -> Result<Service, SqlxError> {
    sqlx::query_as::<_, Service>(queries::SET_SERVICE_VERIFIED)
        .bind(service_id)
        .bind(verified)
        .fetch_one(db_manager.pool())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn service_at(id: i64, lat: f64, long: f64) -> Service {
        Service {
            id,
            user_id: 1,
            title: format!("service {id}"),
            description: String::new(),
            service_type: "3d_printing".to_string(),
            location: Json(Location {
                lat,
                long,
                address: None,
            }),
            rating: 0.0,
            rating_count: 0,
            tags: vec![],
            image_url: None,
            printer_model: None,
            materials: vec![],
            specialty: None,
            hourly_rate: None,
            contact_phone: None,
            contact_email: None,
            is_verified: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn ranks_nearest_first_and_drops_far_candidates() {
        let center = Location {
            lat: 37.5665,
            long: 126.9780,
            address: None,
        };
        let candidates = vec![
            service_at(1, 37.40, 127.10), // 약 21km
            service_at(2, 37.57, 126.98), // 거의 같은 위치
            service_at(3, 35.18, 129.08), // 부산, 반경 밖
        ];

        let (items, total) = rank_by_distance(candidates, &center, 50.0, Page::default());
        assert_eq!(total, 2);
        let ids: Vec<i64> = items.iter().map(|n| n.service.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(items[0].distance_km < items[1].distance_km);
    }

    #[test]
    fn pages_after_ranking() {
        let center = Location {
            lat: 0.0,
            long: 0.0,
            address: None,
        };
        let candidates = (1..=5).map(|i| service_at(i, 0.0, i as f64 * 0.01)).collect();
        let (items, total) = rank_by_distance(candidates, &center, 100.0, Page::new(Some(2), Some(2)));
        assert_eq!(total, 5);
        let ids: Vec<i64> = items.iter().map(|n| n.service.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }
}
