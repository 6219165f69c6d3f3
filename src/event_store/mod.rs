// region:    --- Imports
use crate::auction::events::MarketEvent;
use crate::error::AppError;
use crate::message_broker::EventPublisher;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, Transaction};
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Event Model
/// 이벤트 저장소에 저장되는 이벤트 모델
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: i64,
    pub aggregate_type: String,
    pub aggregate_id: i64,
    pub event_type: String,
    pub data: serde_json::Value,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: i64,
}
impl Event {
    /// 같은 집계의 이벤트는 같은 파티션 키를 쓴다.
    pub fn partition_key(&self) -> String {
        format!("{}-{}", self.aggregate_type, self.aggregate_id)
    }
}
// endregion: --- Event Model

// region:    --- Event Store Trait
/// 이벤트 저장소 트레이트
/// `append`는 호출자의 트랜잭션 안에서 기록하고, `publish`는 커밋 이후에 호출한다.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// `version`에 이벤트 기록. 같은 버전이 이미 있으면 `None` (버전 충돌)
    async fn append(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event: &MarketEvent,
        version: i64,
    ) -> Result<Option<Event>, AppError>;

    async fn publish(&self, event: &Event);
}

/// 이벤트 저장소 구현체
pub struct PostgresEventStore {
    publisher: Arc<dyn EventPublisher>,
    topic: String,
}

/// 이벤트 저장소 생성
impl PostgresEventStore {
    pub fn new(publisher: Arc<dyn EventPublisher>, topic: impl Into<String>) -> Self {
        Self {
            publisher,
            topic: topic.into(),
        }
    }
}

/// 이벤트 저장소 구현체 메서드 구현
#[async_trait]
impl EventStore for PostgresEventStore {
    async fn append(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event: &MarketEvent,
        version: i64,
    ) -> Result<Option<Event>, AppError> {
        let (aggregate_type, aggregate_id) = event.aggregate();
        let data = serde_json::to_value(event).map_err(|e| AppError::Internal(e.to_string()))?;

        let stored = sqlx::query_as::<_, Event>(
            "INSERT INTO events (aggregate_type, aggregate_id, event_type, data, timestamp, version)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (aggregate_type, aggregate_id, version) DO NOTHING
            RETURNING id, aggregate_type, aggregate_id, event_type, data, timestamp, version",
        )
        .bind(aggregate_type)
        .bind(aggregate_id)
        .bind(event.event_type())
        .bind(&data)
        .bind(event.timestamp())
        .bind(version)
        .fetch_optional(&mut **tx)
        .await?;

        if stored.is_none() {
            warn!(
                "{:<12} --> 버전 충돌: {}#{} v{}",
                "EventStore", aggregate_type, aggregate_id, version
            );
        }
        Ok(stored)
    }

    async fn publish(&self, event: &Event) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("{:<12} --> 이벤트 직렬화 실패: {:?}", "EventStore", e);
                return;
            }
        };

        // 이벤트는 이미 커밋되었으므로 발행 실패는 기록만 한다.
        match self
            .publisher
            .send_message(&self.topic, &event.partition_key(), &payload)
            .await
        {
            Ok(()) => info!(
                "{:<12} --> 이벤트 발행: {} {}#{}",
                "EventStore", event.event_type, event.aggregate_type, event.aggregate_id
            ),
            Err(e) => warn!("{:<12} --> 이벤트 발행 실패: {}", "EventStore", e),
        }
    }
}

// endregion: --- Event Store Trait

// region:    --- Versions
/// 집계의 현재 이벤트 버전 (이벤트가 없으면 0)
pub async fn current_version<'e, E>(
    executor: E,
    aggregate_type: &str,
    aggregate_id: i64,
) -> Result<i64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(MAX(version), 0) FROM events WHERE aggregate_type = $1 AND aggregate_id = $2",
    )
    .bind(aggregate_type)
    .bind(aggregate_id)
    .fetch_one(executor)
    .await
}

// endregion: --- Versions
