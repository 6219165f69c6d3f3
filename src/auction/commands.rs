/// 역경매 커맨드 처리
/// 1. 경매 등록
/// 2. 입찰
/// 3. 취소
/// 4. 낙찰 (수동 선택 / 마감 처리)
///
/// 경매 상태를 바꾸는 모든 쓰기는 같은 순서를 따른다:
/// 이벤트 버전 기록 -> 행 변경 -> 커밋 -> 발행.
// region:    --- Imports
use super::events::MarketEvent;
use super::model::{Auction, AuctionStatus, Bid, CreateAuctionRequest, PlaceBidRequest};
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::{current_version, EventStore};
use crate::query::{auctions, queries};
use crate::resource::model::normalize_tags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use tracing::{info, warn};

// endregion: --- Imports

// 최대 재시도 횟수
const MAX_RETRIES: i32 = 100;

const AGGREGATE: &str = "auction";

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub description: String,
}

impl PlaceBidCommand {
    pub fn new(auction_id: i64, bidder_id: i64, req: PlaceBidRequest) -> Self {
        Self {
            auction_id,
            bidder_id,
            amount: req.amount,
            description: req.description,
        }
    }
}

/// 입찰 가능 여부 검증
pub fn validate_bid(
    auction: &Auction,
    bidder_id: i64,
    amount: i64,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if auction.status() != Ok(AuctionStatus::Active) {
        return Err(AppError::conflict(
            "AUCTION_NOT_ACTIVE",
            format!("auction {} is {}", auction.id, auction.status),
        ));
    }
    if now >= auction.deadline {
        return Err(AppError::conflict(
            "AUCTION_EXPIRED",
            format!("auction {} has passed its deadline", auction.id),
        ));
    }
    if amount <= 0 {
        return Err(AppError::bad_request(
            "INVALID_BID_AMOUNT",
            "bid amount must be positive",
        ));
    }
    if auction.user_id == bidder_id {
        return Err(AppError::bad_request(
            "OWN_AUCTION_BID",
            "cannot bid on own auction",
        ));
    }
    Ok(())
}

/// 1. 경매 등록 (AuctionCreated 이벤트가 버전 1)
pub async fn handle_create_auction(
    user_id: i64,
    req: CreateAuctionRequest,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Auction, AppError> {
    info!("{:<12} --> 경매 등록 요청: {} (user {})", "Command", req.title, user_id);

    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("INVALID_INPUT", "title is required"));
    }
    let now = Utc::now();
    if req.deadline <= now {
        return Err(AppError::bad_request(
            "INVALID_DEADLINE",
            "deadline must be in the future",
        ));
    }
    if let Some(location) = &req.location {
        location.validate()?;
    }

    let mut tx = db_manager.pool().begin().await?;
    let auction = sqlx::query_as::<_, Auction>(queries::INSERT_AUCTION)
        .bind(user_id)
        .bind(title)
        .bind(&req.description)
        .bind(req.auction_type.as_str())
        .bind(req.location.as_ref().map(Json))
        .bind(normalize_tags(&req.tags))
        .bind(req.deadline)
        .fetch_one(&mut *tx)
        .await?;

    let event = MarketEvent::AuctionCreated {
        auction_id: auction.id,
        user_id,
        deadline: auction.deadline,
        timestamp: now,
    };
    let stored = event_store
        .append(&mut tx, &event, 1)
        .await?
        .ok_or_else(|| AppError::Internal(format!("auction {} already has events", auction.id)))?;
    tx.commit().await?;

    event_store.publish(&stored).await;
    Ok(auction)
}

/// 2. 입찰
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Bid, AppError> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let mut retries = 0;

    while retries < MAX_RETRIES {
        // 현재 버전 조회
        let version = current_version(db_manager.pool(), AGGREGATE, cmd.auction_id).await?;

        // 경매 정보 조회 및 검증
        let auction = auctions::get_auction(db_manager, cmd.auction_id).await?;
        let now = Utc::now();
        validate_bid(&auction, cmd.bidder_id, cmd.amount, now)?;

        let mut tx = db_manager.pool().begin().await?;
        let bid_id = sqlx::query_scalar::<_, i64>(queries::NEXT_BID_ID)
            .fetch_one(&mut *tx)
            .await?;

        let event = MarketEvent::BidPlaced {
            auction_id: cmd.auction_id,
            bid_id,
            user_id: cmd.bidder_id,
            amount: cmd.amount,
            timestamp: now,
        };

        let Some(stored) = event_store.append(&mut tx, &event, version + 1).await? else {
            warn!(
                "{:<12} --> 낙관적 업데이트로 인한 버전 충돌: 재시도",
                "Command"
            );
            tx.rollback().await?;
            retries += 1;
            continue;
        };

        let bid = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
            .bind(bid_id)
            .bind(cmd.auction_id)
            .bind(cmd.bidder_id)
            .bind(cmd.amount)
            .bind(&cmd.description)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let applied = sqlx::query_as::<_, Auction>(queries::APPLY_BID_TO_AUCTION)
            .bind(cmd.auction_id)
            .bind(cmd.amount)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;
        if applied.is_none() {
            // 검증 이후 상태가 바뀐 경우. 최신 상태로 다시 판단한다.
            tx.rollback().await?;
            let latest = auctions::get_auction(db_manager, cmd.auction_id).await?;
            validate_bid(&latest, cmd.bidder_id, cmd.amount, Utc::now())?;
            return Err(AppError::conflict(
                "AUCTION_EXPIRED",
                format!("auction {} has passed its deadline", cmd.auction_id),
            ));
        }

        tx.commit().await?;
        event_store.publish(&stored).await;
        info!(
            "{:<12} --> 입찰 완료 auction: {}, bid: {}, amount: {}",
            "Command", cmd.auction_id, bid.id, bid.amount
        );
        return Ok(bid);
    }

    Err(AppError::conflict(
        "MAX_RETRIES_EXCEEDED",
        "too many concurrent updates, try again",
    ))
}

/// 3. 취소 (등록자 또는 관리자)
pub async fn handle_cancel_auction(
    auction_id: i64,
    user_id: i64,
    is_admin: bool,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Auction, AppError> {
    info!("{:<12} --> 경매 취소 요청 auction: {}", "Command", auction_id);
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let version = current_version(db_manager.pool(), AGGREGATE, auction_id).await?;
        let auction = auctions::get_auction(db_manager, auction_id).await?;
        if auction.user_id != user_id && !is_admin {
            return Err(AppError::Forbidden);
        }
        ensure_active(&auction)?;

        let event = MarketEvent::AuctionCancelled {
            auction_id,
            user_id,
            timestamp: Utc::now(),
        };
        match finish_auction(db_manager, event_store, &event, version + 1).await? {
            Some(auction) => return Ok(auction),
            None => retries += 1,
        }
    }

    Err(AppError::conflict(
        "MAX_RETRIES_EXCEEDED",
        "too many concurrent updates, try again",
    ))
}

/// 4-1. 등록자가 입찰을 골라 낙찰
pub async fn handle_award_auction(
    auction_id: i64,
    user_id: i64,
    bid_id: i64,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Auction, AppError> {
    info!(
        "{:<12} --> 낙찰 요청 auction: {}, bid: {}",
        "Command", auction_id, bid_id
    );
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let version = current_version(db_manager.pool(), AGGREGATE, auction_id).await?;
        let auction = auctions::get_auction(db_manager, auction_id).await?;
        if auction.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        ensure_active(&auction)?;
        auctions::find_bid(db_manager, auction_id, bid_id)
            .await?
            .ok_or(AppError::NotFound("bid"))?;

        let event = MarketEvent::AuctionCompleted {
            auction_id,
            winning_bid_id: Some(bid_id),
            timestamp: Utc::now(),
        };
        match finish_auction(db_manager, event_store, &event, version + 1).await? {
            Some(auction) => return Ok(auction),
            None => retries += 1,
        }
    }

    Err(AppError::conflict(
        "MAX_RETRIES_EXCEEDED",
        "too many concurrent updates, try again",
    ))
}

/// 4-2. 마감된 경매 종료. 최저 입찰이 낙찰된다.
/// 이미 종료/취소된 경매면 `None`
pub async fn handle_close_expired_auction(
    auction_id: i64,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Option<Auction>, AppError> {
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let version = current_version(db_manager.pool(), AGGREGATE, auction_id).await?;
        let auction = auctions::get_auction(db_manager, auction_id).await?;
        if auction.status() != Ok(AuctionStatus::Active) {
            return Ok(None);
        }

        // 버전을 읽은 뒤 들어온 입찰은 같은 버전을 두고 경쟁하므로 여기서 본 최저가가 최종값이다.
        let winner = auctions::find_lowest_bid(db_manager, auction_id).await?;
        let event = MarketEvent::AuctionCompleted {
            auction_id,
            winning_bid_id: winner.map(|bid| bid.id),
            timestamp: Utc::now(),
        };
        match finish_auction(db_manager, event_store, &event, version + 1).await {
            Ok(Some(auction)) => {
                info!(
                    "{:<12} --> 경매 마감 auction: {}, winner: {:?}",
                    "Command", auction.id, auction.winning_bid_id
                );
                return Ok(Some(auction));
            }
            Ok(None) => retries += 1,
            Err(AppError::Conflict { code: "AUCTION_NOT_ACTIVE", .. }) => return Ok(None),
            Err(e) => return Err(e),
        }
    }

    Err(AppError::conflict(
        "MAX_RETRIES_EXCEEDED",
        "too many concurrent updates, try again",
    ))
}

// endregion: --- Commands

// region:    --- Helpers
fn ensure_active(auction: &Auction) -> Result<(), AppError> {
    if auction.status() == Ok(AuctionStatus::Active) {
        Ok(())
    } else {
        Err(AppError::conflict(
            "AUCTION_NOT_ACTIVE",
            format!("auction {} is {}", auction.id, auction.status),
        ))
    }
}

/// 종료 이벤트 기록 후 경매 행 변경. 버전 충돌이면 `None`
async fn finish_auction(
    db_manager: &DatabaseManager,
    event_store: &impl EventStore,
    event: &MarketEvent,
    version: i64,
) -> Result<Option<Auction>, AppError> {
    let mut tx = db_manager.pool().begin().await?;

    let Some(stored) = event_store.append(&mut tx, event, version).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    let updated = match event {
        MarketEvent::AuctionCompleted {
            auction_id,
            winning_bid_id,
            ..
        } => {
            sqlx::query_as::<_, Auction>(queries::COMPLETE_AUCTION)
                .bind(auction_id)
                .bind(winning_bid_id)
                .fetch_optional(&mut *tx)
                .await?
        }
        MarketEvent::AuctionCancelled { auction_id, .. } => {
            sqlx::query_as::<_, Auction>(queries::CANCEL_AUCTION)
                .bind(auction_id)
                .fetch_optional(&mut *tx)
                .await?
        }
        other => {
            return Err(AppError::Internal(format!(
                "{} does not finish an auction",
                other.event_type()
            )))
        }
    };

    let Some(auction) = updated else {
        tx.rollback().await?;
        let (_, auction_id) = event.aggregate();
        return Err(AppError::conflict(
            "AUCTION_NOT_ACTIVE",
            format!("auction {auction_id} is no longer active"),
        ));
    };

    tx.commit().await?;
    event_store.publish(&stored).await;
    Ok(Some(auction))
}

// endregion: --- Helpers
