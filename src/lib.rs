// region:    --- Imports
use crate::config::Config;
use crate::database::DatabaseManager;
use crate::event_store::PostgresEventStore;
use crate::message_broker::{EventPublisher, KafkaPublisher, LogPublisher};
use crate::payment::gateway::Gateways;
use crate::scheduler::AuctionScheduler;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Modules
pub mod auction;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod event_store;
pub mod handlers;
pub mod i18n;
pub mod location;
pub mod message_broker;
pub mod pagination;
pub mod payment;
pub mod query;
pub mod resource;
pub mod scheduler;
pub mod search;
pub mod service;
pub mod state;
pub mod upload;
pub mod user;

// endregion: --- Modules

/// 일반 요청 바디 제한 (업로드 경로는 별도)
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;
/// multipart 경계/헤더 여유분
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

// region:    --- Router
/// 전체 라우터
pub fn app(state: AppState) -> Router {
    use handlers::{admin, auctions, auth, health, i18n, payments, resources, search, services, uploads};

    // 프론트엔드가 다른 오리진에서 호출한다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::handle_health))
        // 인증
        .route("/api/register", post(auth::handle_register))
        .route("/api/login", post(auth::handle_login))
        .route("/api/logout", post(auth::handle_logout))
        .route(
            "/api/user",
            get(auth::handle_get_current_user).patch(auth::handle_update_current_user),
        )
        // 자료
        .route("/api/resources", get(resources::handle_list_resources))
        .route("/api/resources/featured", get(resources::handle_featured_resources))
        .route("/api/resources/:id", get(resources::handle_get_resource))
        .route(
            "/api/resources/:id/download",
            post(resources::handle_download_resource),
        )
        // 서비스
        .route(
            "/api/services",
            get(services::handle_list_services).post(services::handle_create_service),
        )
        .route(
            "/api/services/:id",
            get(services::handle_get_service)
                .put(services::handle_update_service)
                .delete(services::handle_delete_service),
        )
        .route("/api/services/:id/rate", post(services::handle_rate_service))
        // 역경매
        .route(
            "/api/auctions",
            get(auctions::handle_list_auctions).post(auctions::handle_create),
        )
        .route("/api/auctions/:id", get(auctions::handle_get_auction))
        .route("/api/auctions/:id/cancel", post(auctions::handle_cancel))
        .route("/api/auctions/:id/award", post(auctions::handle_award))
        .route(
            "/api/auctions/:id/bids",
            get(auctions::handle_list_bids).post(auctions::handle_bid),
        )
        // 결제
        .route("/api/payments", get(payments::handle_list))
        .route("/api/payments/initialize", post(payments::handle_initialize))
        .route("/api/payments/approve", post(payments::handle_approve))
        .route("/api/payments/:order_id/cancel", post(payments::handle_cancel))
        // 검색
        .route("/api/search", get(search::handle_search))
        // 업로드
        .route(
            "/api/uploads",
            post(uploads::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/uploads/config", get(uploads::handle_upload_config))
        .route("/api/uploads/:id", get(uploads::handle_get_upload))
        // 다국어
        .route("/api/i18n/languages", get(i18n::handle_languages))
        .route("/api/i18n/:lang", get(i18n::handle_bundle))
        // 관리자
        .route("/api/admin/stats", get(admin::handle_stats))
        .route("/api/admin/users", get(admin::handle_list_users))
        .route("/api/admin/users/:id/admin", post(admin::handle_set_admin))
        .route("/api/admin/resources", post(resources::handle_create_resource))
        .route(
            "/api/admin/resources/:id",
            axum::routing::put(resources::handle_update_resource)
                .delete(resources::handle_delete_resource),
        )
        .route(
            "/api/admin/resources/:id/feature",
            post(resources::handle_feature_resource),
        )
        .route(
            "/api/admin/services/:id/verify",
            post(services::handle_verify_service),
        )
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            i18n::localize_errors,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

// endregion: --- Router

// region:    --- Server
/// 이벤트 발행기 선택. 브로커가 없거나 연결에 실패하면 로그 발행기를 쓴다.
async fn event_publisher(config: &Config) -> Arc<dyn EventPublisher> {
    let Some(brokers) = config.kafka_brokers.as_deref() else {
        info!("{:<12} --> KAFKA_BROKERS 미설정: 이벤트는 로그로만 남긴다", "Main");
        return Arc::new(LogPublisher);
    };

    match KafkaPublisher::connect(brokers) {
        Ok(publisher) => {
            if let Err(e) = publisher.ensure_topic(&config.events_topic, 5, 1).await {
                warn!("{:<12} --> Kafka 토픽 준비 실패: {}", "Main", e);
            }
            let publisher: Arc<dyn EventPublisher> = Arc::new(publisher);
            publisher
        }
        Err(e) => {
            warn!("{:<12} --> Kafka 초기화 실패, 로그 발행기 사용: {}", "Main", e);
            Arc::new(LogPublisher)
        }
    }
}

/// 공유 상태 구성 (DB 연결, 스키마 준비, 발행기, 결제사)
pub async fn build_state(config: Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let db_manager = Arc::new(DatabaseManager::new(&config).await?);
    db_manager.initialize_database(config.reset_database).await?;
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let publisher = event_publisher(&config).await;
    let event_store = Arc::new(PostgresEventStore::new(publisher, config.events_topic.clone()));
    let gateways = Arc::new(Gateways::from_config(&config)?);

    Ok(AppState {
        db: db_manager,
        event_store,
        gateways,
        config: Arc::new(config),
    })
}

/// 서버 실행 (Ctrl-C / SIGTERM 까지)
pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.socket_addr();
    let state = build_state(config).await?;

    let scheduler = AuctionScheduler::new(
        Arc::clone(&state.db),
        Arc::clone(&state.event_store),
        Duration::from_secs(state.config.scheduler_interval_secs),
    )
    .start();

    let listener = TcpListener::bind(addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.abort();
    info!("{:<12} --> 서버 종료", "Main");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("{:<12} --> Ctrl+C 핸들러 설치 실패: {}", "Main", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("{:<12} --> SIGTERM 핸들러 설치 실패: {}", "Main", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("{:<12} --> Ctrl+C 수신", "Main"),
        _ = terminate => info!("{:<12} --> SIGTERM 수신", "Main"),
    }
}

// endregion: --- Server
