// region:    --- Imports
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use rdkafka::ClientConfig;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

// endregion: --- Imports

const CLIENT_ID: &str = "webel-marketplace";
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("kafka client error: {0}")]
    Client(#[from] KafkaError),

    #[error("topic {topic} could not be created: {code:?}")]
    Topic {
        topic: String,
        code: RDKafkaErrorCode,
    },
}

// region:    --- Event Publisher
/// 커밋된 도메인 이벤트를 외부로 내보내는 발행기
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// `key`가 같은 메시지는 같은 파티션으로 간다.
    async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), BrokerError>;
}

/// 브로커 없이 로그만 남기는 발행기
#[derive(Clone, Default)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), BrokerError> {
        debug!(
            "{:<12} --> 이벤트 (broker 없음): topic={}, key={}, value={}",
            "Publisher", topic, key, value
        );
        Ok(())
    }
}

// endregion: --- Event Publisher

// region:    --- Kafka
/// Kafka 발행기
pub struct KafkaPublisher {
    producer: FutureProducer,
    brokers: String,
}

impl KafkaPublisher {
    pub fn connect(brokers: &str) -> Result<Self, BrokerError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("client.id", CLIENT_ID)
            .set("acks", "all")
            .set(
                "message.timeout.ms",
                DELIVERY_TIMEOUT.as_millis().to_string(),
            )
            .create()?;
        info!("{:<12} --> Kafka 연결: {}", "Publisher", brokers);
        Ok(Self {
            producer,
            brokers: brokers.to_string(),
        })
    }

    /// 이벤트 토픽 준비. 이미 있으면 성공으로 본다.
    pub async fn ensure_topic(
        &self,
        topic: &str,
        partitions: i32,
        replication: i32,
    ) -> Result<(), BrokerError> {
        let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("client.id", CLIENT_ID)
            .create()?;
        let new_topic = NewTopic::new(topic, partitions, TopicReplication::Fixed(replication));
        let results = admin
            .create_topics(&[new_topic], &AdminOptions::new())
            .await?;

        for result in results {
            match result {
                Ok(name) => info!("{:<12} --> 토픽 생성: {}", "Publisher", name),
                Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    debug!("{:<12} --> 토픽 존재: {}", "Publisher", name)
                }
                Err((name, code)) => return Err(BrokerError::Topic { topic: name, code }),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), BrokerError> {
        let record = FutureRecord::to(topic).key(key).payload(value);
        match self
            .producer
            .send(record, Timeout::After(DELIVERY_TIMEOUT))
            .await
        {
            Ok((partition, offset)) => {
                debug!(
                    "{:<12} --> 전송 완료: {} key={} ({}:{})",
                    "Publisher", topic, key, partition, offset
                );
                Ok(())
            }
            Err((e, _)) => {
                warn!("{:<12} --> 전송 실패: {} key={}: {}", "Publisher", topic, key, e);
                Err(BrokerError::Client(e))
            }
        }
    }
}

// endregion: --- Kafka
