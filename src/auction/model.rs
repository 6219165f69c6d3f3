use crate::location::Location;
use crate::service::model::ServiceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::str::FromStr;

/// 경매 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    Active,
    Completed,
    Cancelled,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Active => "active",
            AuctionStatus::Completed => "completed",
            AuctionStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for AuctionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AuctionStatus::Active),
            "completed" => Ok(AuctionStatus::Completed),
            "cancelled" => Ok(AuctionStatus::Cancelled),
            other => Err(format!("unknown auction status: {other}")),
        }
    }
}

// 역경매 모델
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub auction_type: String,
    pub location: Option<Json<Location>>,
    pub tags: Vec<String>,
    pub deadline: DateTime<Utc>,
    pub current_lowest_bid: Option<i64>,
    pub bid_count: i32,
    pub status: String,
    pub winning_bid_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    pub fn status(&self) -> Result<AuctionStatus, String> {
        self.status.parse()
    }
}

// 입찰 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub auction_type: ServiceType,
    pub location: Option<Location>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PlaceBidRequest {
    pub amount: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardRequest {
    pub bid_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuctionFilter {
    pub status: Option<AuctionStatus>,
    #[serde(rename = "type")]
    pub auction_type: Option<ServiceType>,
    pub tag: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
