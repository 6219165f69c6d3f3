// region:    --- Imports
use super::extract::{AppJson, AppPath, AppQuery};
use crate::auction::commands::{
    handle_award_auction, handle_cancel_auction, handle_create_auction, handle_place_bid,
    PlaceBidCommand,
};
use crate::auction::model::{
    Auction, AuctionFilter, AwardRequest, Bid, CreateAuctionRequest, PlaceBidRequest,
};
use crate::auth::extract::AuthUser;
use crate::error::AppResult;
use crate::pagination::{Page, Paginated};
use crate::query::auctions;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// 경매 목록
pub async fn handle_list_auctions(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<AuctionFilter>,
) -> AppResult<Json<Paginated<Auction>>> {
    let page = Page::new(filter.page, filter.limit);
    let (items, total) = auctions::list_auctions(&state.db, &filter).await?;
    Ok(Json(Paginated::new(items, page, total)))
}

/// 경매 상세
pub async fn handle_get_auction(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Auction>> {
    Ok(Json(auctions::get_auction(&state.db, id).await?))
}

/// 입찰 목록 (최저가 순)
pub async fn handle_list_bids(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Vec<Bid>>> {
    // 없는 경매면 404
    auctions::get_auction(&state.db, id).await?;
    Ok(Json(auctions::list_bids(&state.db, id).await?))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// 경매 등록
pub async fn handle_create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<CreateAuctionRequest>,
) -> AppResult<(StatusCode, Json<Auction>)> {
    let auction = handle_create_auction(auth.user.id, req, &*state.event_store, &state.db).await?;
    Ok((StatusCode::CREATED, Json(auction)))
}

/// 입찰
pub async fn handle_bid(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<PlaceBidRequest>,
) -> AppResult<(StatusCode, Json<Bid>)> {
    let cmd = PlaceBidCommand::new(id, auth.user.id, req);
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Handler", cmd);
    let bid = handle_place_bid(cmd, &*state.event_store, &state.db).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

/// 경매 취소
pub async fn handle_cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Auction>> {
    let auction = handle_cancel_auction(
        id,
        auth.user.id,
        auth.user.is_admin,
        &*state.event_store,
        &state.db,
    )
    .await?;
    Ok(Json(auction))
}

/// 낙찰 입찰 선택
pub async fn handle_award(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<AwardRequest>,
) -> AppResult<Json<Auction>> {
    let auction =
        handle_award_auction(id, auth.user.id, req.bid_id, &*state.event_store, &state.db).await?;
    Ok(Json(auction))
}

// endregion: --- Command Handlers
