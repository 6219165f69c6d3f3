use crate::location::Location;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// 서비스 종류 (경매 종류로도 사용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "3d_printing")]
    ThreeDPrinting,
    #[serde(rename = "electronics")]
    Electronics,
    #[serde(rename = "woodworking")]
    Woodworking,
    #[serde(rename = "manufacturing")]
    Manufacturing,
    #[serde(rename = "engineer")]
    Engineer,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ThreeDPrinting => "3d_printing",
            ServiceType::Electronics => "electronics",
            ServiceType::Woodworking => "woodworking",
            ServiceType::Manufacturing => "manufacturing",
            ServiceType::Engineer => "engineer",
        }
    }
}

// 서비스 모델
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub location: Json<Location>,
    pub rating: f64,
    pub rating_count: i32,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub printer_model: Option<String>,
    pub materials: Vec<String>,
    pub specialty: Option<String>,
    pub hourly_rate: Option<i64>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// 거리 검색 결과
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyService {
    #[serde(flatten)]
    pub service: Service,
    pub distance_km: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub service_type: ServiceType,
    pub location: Location,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub printer_model: Option<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    pub specialty: Option<String>,
    pub hourly_rate: Option<i64>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
    pub location: Option<Location>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub printer_model: Option<String>,
    pub materials: Option<Vec<String>>,
    pub specialty: Option<String>,
    pub hourly_rate: Option<i64>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFilter {
    #[serde(rename = "type")]
    pub service_type: Option<ServiceType>,
    pub tag: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub radius_km: Option<f64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RateServiceRequest {
    pub rating: i32,
}

/// 평점 누적 평균: (rating * count + r) / (count + 1)
pub fn running_average(rating: f64, count: i32, new_rating: i32) -> f64 {
    let count = f64::from(count.max(0));
    (rating * count + f64::from(new_rating)) / (count + 1.0)
}
