/// 위치 정보와 거리 계산
use crate::error::AppError;
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_DEGREE_LAT: f64 = 111.32;

pub const DEFAULT_RADIUS_KM: f64 = 50.0;
pub const MAX_RADIUS_KM: f64 = 1000.0;

/// 사용자/서비스/경매에 저장되는 위치 (JSONB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub long: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_coordinates(self.lat, self.long)
    }

    pub fn distance_km(&self, other: &Location) -> f64 {
        haversine_km(self.lat, self.long, other.lat, other.long)
    }
}

pub fn validate_coordinates(lat: f64, long: f64) -> Result<(), AppError> {
    let valid = lat.is_finite()
        && long.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&long);
    if valid {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "INVALID_LOCATION",
            format!("invalid coordinates ({lat}, {long})"),
        ))
    }
}

/// 두 좌표 사이의 대원 거리 (km)
pub fn haversine_km(lat1: f64, long1: f64, lat2: f64, long2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_long = (long2 - long1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_long / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// SQL 1차 필터용 경계 상자
/// 날짜변경선을 넘으면 경도 구간이 둘로 나뉜다. 나뉘지 않으면 두 구간이 같다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub long_ranges: [(f64, f64); 2],
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, long: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat)
            && self
                .long_ranges
                .iter()
                .any(|(min, max)| (*min..=*max).contains(&long))
    }
}

pub fn bounding_box(center: &Location, radius_km: f64) -> BoundingBox {
    const FULL: (f64, f64) = (-180.0, 180.0);
    let d_lat = radius_km / KM_PER_DEGREE_LAT;
    let min_lat = center.lat - d_lat;
    let max_lat = center.lat + d_lat;

    // 극점을 포함하면 모든 경도가 후보
    let cos_lat = center.lat.to_radians().cos().abs();
    let long_ranges = if min_lat <= -90.0 || max_lat >= 90.0 || cos_lat < 1e-9 {
        [FULL, FULL]
    } else {
        let d_long = radius_km / (KM_PER_DEGREE_LAT * cos_lat);
        let west = center.long - d_long;
        let east = center.long + d_long;
        if d_long >= 180.0 {
            [FULL, FULL]
        } else if west < -180.0 {
            [(west + 360.0, 180.0), (-180.0, east)]
        } else if east > 180.0 {
            [(west, 180.0), (-180.0, east - 360.0)]
        } else {
            [(west, east), (west, east)]
        }
    };

    BoundingBox {
        min_lat: min_lat.max(-90.0),
        max_lat: max_lat.min(90.0),
        long_ranges,
    }
}
