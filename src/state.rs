use crate::config::Config;
use crate::database::DatabaseManager;
use crate::event_store::PostgresEventStore;
use crate::payment::gateway::Gateways;
use std::sync::Arc;

/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub event_store: Arc<PostgresEventStore>,
    pub gateways: Arc<Gateways>,
    pub config: Arc<Config>,
}
