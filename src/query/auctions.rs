// region:    --- Imports
use super::queries;
use crate::auction::model::{Auction, AuctionFilter, Bid};
use crate::database::DatabaseManager;
use crate::pagination::Page;
use crate::resource::model::normalize_tag;
use chrono::{DateTime, Utc};
use sqlx::Error as SqlxError;
use tracing::info;

// endregion: --- Imports

/// 입찰 집계 (bids 테이블에서 다시 계산한 값)
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct BidAggregates {
    pub bid_count: i32,
    pub lowest_bid: Option<i64>,
}

/// 경매 목록
pub async fn list_auctions(
    db_manager: &DatabaseManager,
    filter: &AuctionFilter,
) -> Result<(Vec<Auction>, i64), SqlxError> {
    let page = Page::new(filter.page, filter.limit);
    let status = filter.status.map(|s| s.as_str());
    let auction_type = filter.auction_type.map(|t| t.as_str());
    let tag = filter.tag.as_deref().map(normalize_tag);
    info!(
        "{:<12} --> 경매 목록 조회 status: {:?}, type: {:?}, tag: {:?}",
        "Query", status, auction_type, tag
    );

    let auctions = sqlx::query_as::<_, Auction>(queries::LIST_AUCTIONS)
        .bind(status)
        .bind(auction_type)
        .bind(&tag)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(db_manager.pool())
        .await?;

    let total = sqlx::query_scalar::<_, i64>(queries::COUNT_AUCTIONS)
        .bind(status)
        .bind(auction_type)
        .bind(&tag)
        .fetch_one(db_manager.pool())
        .await?;

    Ok((auctions, total))
}

/// 경매 조회
pub async fn get_auction(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Auction, SqlxError> {
    sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
        .bind(auction_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 경매 입찰 목록 (최저가 순)
pub async fn list_bids(db_manager: &DatabaseManager, auction_id: i64) -> Result<Vec<Bid>, SqlxError> {
    info!("{:<12} --> 입찰 목록 조회 auction: {}", "Query", auction_id);
    sqlx::query_as::<_, Bid>(queries::LIST_BIDS)
        .bind(auction_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 경매에 속한 입찰 조회
pub async fn find_bid(
    db_manager: &DatabaseManager,
    auction_id: i64,
    bid_id: i64,
) -> Result<Option<Bid>, SqlxError> {
    sqlx::query_as::<_, Bid>(queries::GET_BID)
        .bind(bid_id)
        .bind(auction_id)
        .fetch_optional(db_manager.pool())
        .await
}

/// 최저 입찰 (동가면 먼저 들어온 입찰)
pub async fn find_lowest_bid(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Option<Bid>, SqlxError> {
    sqlx::query_as::<_, Bid>(queries::GET_LOWEST_BID)
        .bind(auction_id)
        .fetch_optional(db_manager.pool())
        .await
}

/// bids 테이블 기준 집계
pub async fn get_bid_aggregates(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<BidAggregates, SqlxError> {
    sqlx::query_as::<_, BidAggregates>(queries::GET_BID_AGGREGATES)
        .bind(auction_id)
        .fetch_one(db_manager.pool())
        .await
}

/// 마감이 지난 진행 중 경매 id
pub async fn list_expired_auction_ids(
    db_manager: &DatabaseManager,
    now: DateTime<Utc>,
) -> Result<Vec<i64>, SqlxError> {
    sqlx::query_scalar::<_, i64>(queries::LIST_EXPIRED_AUCTIONS)
        .bind(now)
        .fetch_all(db_manager.pool())
        .await
}
