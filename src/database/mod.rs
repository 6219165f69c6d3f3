use crate::config::Config;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 스키마 초기화를 직렬화하는 advisory lock 키
const SCHEMA_LOCK_KEY: i64 = 0x5745_4245_4c;

pub struct DatabaseManager {
    pub pool: Arc<PgPool>,
}

impl DatabaseManager {
    /// 데이터베이스 매니저 생성
    pub async fn new(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    /// 연결을 미루는 풀 (첫 쿼리에서 연결)
    pub fn connect_lazy(config: &Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(&config.database_url)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 초기화
    /// `reset`이면 00-recreate-db.sql로 기존 테이블을 지운 뒤 스키마를 만든다.
    pub async fn initialize_database(&self, reset: bool) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // 여러 인스턴스가 동시에 기동해도 스키마 생성은 한 번에 하나씩
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        if reset {
            info!("{:<12} --> 기존 테이블 삭제", "Database");
            Self::execute_multi_query(&mut tx, include_str!("../sql/00-recreate-db.sql")).await?;
        }

        Self::execute_multi_query(&mut tx, include_str!("../sql/01-create-schema.sql")).await?;

        tx.commit().await?;
        info!("{:<12} --> 스키마 준비 완료", "Database");
        Ok(())
    }

    /// 여러 쿼리 실행
    async fn execute_multi_query(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        sql: &str,
    ) -> Result<(), sqlx::Error> {
        for query in split_statements(sql) {
            sqlx::query(query).execute(&mut **tx).await?;
        }
        Ok(())
    }
}

/// `;` 기준으로 문장 분리. 주석만 남은 조각은 버린다.
fn split_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|query| {
        query
            .lines()
            .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with("--"))
    })
}
