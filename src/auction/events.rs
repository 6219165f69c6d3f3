use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 이벤트 저장소에 기록되는 마켓 이벤트
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum MarketEvent {
    // 경매 등록
    AuctionCreated {
        auction_id: i64,
        user_id: i64,
        deadline: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    // 입찰
    BidPlaced {
        auction_id: i64,
        bid_id: i64,
        user_id: i64,
        amount: i64,
        timestamp: DateTime<Utc>,
    },
    // 경매 종료 (낙찰 입찰이 없으면 None)
    AuctionCompleted {
        auction_id: i64,
        winning_bid_id: Option<i64>,
        timestamp: DateTime<Utc>,
    },
    // 경매 취소
    AuctionCancelled {
        auction_id: i64,
        user_id: i64,
        timestamp: DateTime<Utc>,
    },
    // 자료 다운로드
    ResourceDownloaded {
        resource_id: i64,
        download_count: i64,
        timestamp: DateTime<Utc>,
    },
    // 결제 상태 변경
    PaymentStatusChanged {
        payment_id: i64,
        order_id: String,
        status: String,
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    /// (aggregate_type, aggregate_id)
    pub fn aggregate(&self) -> (&'static str, i64) {
        match self {
            MarketEvent::AuctionCreated { auction_id, .. }
            | MarketEvent::BidPlaced { auction_id, .. }
            | MarketEvent::AuctionCompleted { auction_id, .. }
            | MarketEvent::AuctionCancelled { auction_id, .. } => ("auction", *auction_id),
            MarketEvent::ResourceDownloaded { resource_id, .. } => ("resource", *resource_id),
            MarketEvent::PaymentStatusChanged { payment_id, .. } => ("payment", *payment_id),
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            MarketEvent::AuctionCreated { .. } => "AuctionCreated",
            MarketEvent::BidPlaced { .. } => "BidPlaced",
            MarketEvent::AuctionCompleted { .. } => "AuctionCompleted",
            MarketEvent::AuctionCancelled { .. } => "AuctionCancelled",
            MarketEvent::ResourceDownloaded { .. } => "ResourceDownloaded",
            MarketEvent::PaymentStatusChanged { .. } => "PaymentStatusChanged",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            MarketEvent::AuctionCreated { timestamp, .. }
            | MarketEvent::BidPlaced { timestamp, .. }
            | MarketEvent::AuctionCompleted { timestamp, .. }
            | MarketEvent::AuctionCancelled { timestamp, .. }
            | MarketEvent::ResourceDownloaded { timestamp, .. }
            | MarketEvent::PaymentStatusChanged { timestamp, .. } => *timestamp,
        }
    }
}
