/// 경매 마감 스케줄러
/// 마감 시각이 지난 진행 중 경매를 종료하고 최저 입찰을 낙찰 처리한다.
/// 만료된 로그인 세션 정리도 함께 한다.
// region:    --- Imports
use crate::auction::commands::handle_close_expired_auction;
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::EventStore;
use crate::query::{auctions, users};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

// endregion: --- Imports

/// 세션 정리 주기 (틱 단위)
const SESSION_CLEANUP_TICKS: u64 = 300;

// region:    --- Auction Scheduler
pub struct AuctionScheduler<S> {
    db_manager: Arc<DatabaseManager>,
    event_store: Arc<S>,
    period: Duration,
}

impl<S: EventStore + 'static> AuctionScheduler<S> {
    pub fn new(db_manager: Arc<DatabaseManager>, event_store: Arc<S>, period: Duration) -> Self {
        Self {
            db_manager,
            event_store,
            period: period.max(Duration::from_millis(100)),
        }
    }

    /// 스케줄러 시작
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u64 = 0;
            loop {
                ticker.tick().await;
                if let Err(e) = close_expired_auctions(&self.db_manager, &*self.event_store).await {
                    error!("{:<12} --> 경매 마감 처리 중 오류 발생: {:?}", "Scheduler", e);
                }

                ticks = ticks.wrapping_add(1);
                if ticks % SESSION_CLEANUP_TICKS == 0 {
                    match users::delete_expired_sessions(&self.db_manager, Utc::now()).await {
                        Ok(0) => {}
                        Ok(n) => info!("{:<12} --> 만료 세션 {}개 삭제", "Scheduler", n),
                        Err(e) => error!("{:<12} --> 세션 정리 실패: {:?}", "Scheduler", e),
                    }
                }
            }
        })
    }
}

/// 마감된 경매 종료. 종료한 경매 수 반환
pub async fn close_expired_auctions(
    db_manager: &DatabaseManager,
    event_store: &impl EventStore,
) -> Result<usize, AppError> {
    let expired = auctions::list_expired_auction_ids(db_manager, Utc::now()).await?;
    let mut closed = 0;
    for auction_id in expired {
        match handle_close_expired_auction(auction_id, event_store, db_manager).await {
            Ok(Some(_)) => closed += 1,
            Ok(None) => {}
            Err(e) => error!(
                "{:<12} --> 경매 {} 마감 실패: {:?}",
                "Scheduler", auction_id, e
            ),
        }
    }
    if closed > 0 {
        debug!("{:<12} --> 경매 {}건 마감", "Scheduler", closed);
    }
    Ok(closed)
}
// endregion: --- Auction Scheduler
