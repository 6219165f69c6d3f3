//! 데이터베이스 통합 테스트. `DATABASE_URL`이 없으면 건너뛴다.
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tokio::task::JoinSet;
use tracing::info;
use uuid::Uuid;
use webel::auction::commands::{
    handle_award_auction, handle_cancel_auction, handle_create_auction, handle_place_bid,
    PlaceBidCommand,
};
use webel::auction::model::{Auction, CreateAuctionRequest, PlaceBidRequest};
use webel::config::Config;
use webel::database::DatabaseManager;
use webel::error::AppError;
use webel::event_store::PostgresEventStore;
use webel::location::Location;
use webel::message_broker::LogPublisher;
use webel::payment::commands::{
    generate_order_id, handle_approve_payment, handle_cancel_payment, handle_initialize_payment,
};
use webel::payment::gateway::{ConfirmedPayment, Gateways, PaymentGateway, PreparedPayment};
use webel::payment::model::{
    ApprovePaymentRequest, InitializePaymentRequest, Payment, PaymentProvider, PaymentStatus,
};
use webel::query::{auctions, payments, resources, search, services, users};
use webel::resource::model::{CreateResourceRequest, ResourceCategory, ResourceFilter};
use webel::pagination::Page;
use webel::scheduler::close_expired_auctions;
use webel::search::choose_strategy;
use webel::service::model::{CreateServiceRequest, ServiceFilter, ServiceType};
use webel::state::AppState;
use webel::user::model::User;

struct TestContext {
    db: Arc<DatabaseManager>,
    store: Arc<PostgresEventStore>,
    config: Config,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// 테스트 컨텍스트 설정
async fn setup() -> Option<TestContext> {
    init_tracing();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        info!("DATABASE_URL 없음, 통합 테스트 건너뜀");
        return None;
    };
    let config = Config {
        database_url,
        database_max_connections: 20,
        ..Config::default()
    };
    let db = DatabaseManager::new(&config).await.expect("데이터베이스 연결 실패");
    db.initialize_database(false)
        .await
        .expect("스키마 초기화 실패");
    Some(TestContext {
        db: Arc::new(db),
        store: Arc::new(PostgresEventStore::new(Arc::new(LogPublisher), "test-events")),
        config,
    })
}

fn unique(prefix: &str) -> String {
    format!("{prefix}{}", &Uuid::new_v4().simple().to_string()[..12])
}

async fn create_test_user(ctx: &TestContext) -> User {
    let username = unique("tester_");
    users::create_user(
        &ctx.db,
        users::NewUser {
            email: format!("{username}@webel.test"),
            username,
            password_hash: "not-a-real-hash".to_string(),
            full_name: None,
            location: None,
            is_service_provider: false,
            preferred_language: "en".to_string(),
        },
    )
    .await
    .expect("사용자 생성 실패")
}

async fn create_test_auction(ctx: &TestContext, owner: &User) -> Auction {
    handle_create_auction(
        owner.id,
        CreateAuctionRequest {
            title: "PLA 출력 견적".to_string(),
            description: "20cm 하우징 2개".to_string(),
            auction_type: ServiceType::ThreeDPrinting,
            location: None,
            tags: vec!["PLA".to_string()],
            deadline: Utc::now() + Duration::hours(1),
        },
        &*ctx.store,
        &ctx.db,
    )
    .await
    .expect("경매 생성 실패")
}

fn bid(auction_id: i64, bidder: &User, amount: i64) -> PlaceBidCommand {
    PlaceBidCommand::new(
        auction_id,
        bidder.id,
        PlaceBidRequest {
            amount,
            description: String::new(),
        },
    )
}

async fn event_versions(ctx: &TestContext, aggregate_type: &str, aggregate_id: i64) -> Vec<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT version FROM events WHERE aggregate_type = $1 AND aggregate_id = $2 ORDER BY version",
    )
    .bind(aggregate_type)
    .bind(aggregate_id)
    .fetch_all(ctx.db.pool())
    .await
    .expect("이벤트 조회 실패")
}

fn resource_request(title: &str, tags: &[&str]) -> CreateResourceRequest {
    CreateResourceRequest {
        title: title.to_string(),
        description: "오픈 하드웨어 자료".to_string(),
        category: ResourceCategory::HardwareDesign,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        image_url: None,
        download_url: Some("https://files.webel.test/board.zip".to_string()),
        download_file: None,
        how_to_use: None,
        assembly_instructions: None,
        is_featured: false,
        is_crawled: false,
        source_site: None,
    }
}

fn service_request(title: &str, lat: f64, long: f64) -> CreateServiceRequest {
    CreateServiceRequest {
        title: title.to_string(),
        description: "출력 서비스".to_string(),
        service_type: ServiceType::ThreeDPrinting,
        location: Location {
            lat,
            long,
            address: None,
        },
        tags: vec![],
        image_url: None,
        printer_model: Some("Prusa MK4".to_string()),
        materials: vec!["PLA".to_string()],
        specialty: None,
        hourly_rate: Some(20000),
        contact_phone: None,
        contact_email: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn resource_lifecycle_and_tag_filters() {
    let Some(ctx) = setup().await else { return };
    let tag = unique("tag");
    let other = unique("tag");

    let both = resources::create_resource(
        &ctx.db,
        resource_request("Both tags", &[tag.to_uppercase().as_str(), other.as_str()]),
    )
    .await
    .unwrap();
    let single = resources::create_resource(&ctx.db, resource_request("One tag", &[tag.as_str()]))
        .await
        .unwrap();
    assert!(both.tags.contains(&tag), "태그는 소문자로 저장된다");

    let filter = ResourceFilter {
        tag: Some(tag.clone()),
        ..ResourceFilter::default()
    };
    let (found, total) = resources::list_resources(&ctx.db, &filter).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(found.len(), 2);

    let filter = ResourceFilter {
        tags: Some(format!("{tag},{other}")),
        ..ResourceFilter::default()
    };
    let (found, total) = resources::list_resources(&ctx.db, &filter).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].id, both.id);

    let featured = resources::set_resource_featured(&ctx.db, single.id, true)
        .await
        .unwrap();
    assert!(featured.is_featured);

    assert!(resources::delete_resource(&ctx.db, single.id).await.unwrap());
    assert!(!resources::delete_resource(&ctx.db, single.id).await.unwrap());
    let missing = resources::get_resource(&ctx.db, single.id).await;
    assert!(matches!(missing, Err(sqlx::Error::RowNotFound)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_downloads_are_counted_once_each() {
    let Some(ctx) = setup().await else { return };
    let resource = resources::create_resource(&ctx.db, resource_request("Counter", &[]))
        .await
        .unwrap();
    let n = 20;

    let mut tasks = JoinSet::new();
    for _ in 0..n {
        let db = ctx.db.clone();
        let store = ctx.store.clone();
        let id = resource.id;
        tasks.spawn(async move { resources::record_download(&db, &*store, id).await });
    }
    while let Some(result) = tasks.join_next().await {
        result.expect("태스크 실패").expect("다운로드 기록 실패");
    }

    let resource = resources::get_resource(&ctx.db, resource.id).await.unwrap();
    assert_eq!(resource.download_count, n);
    let versions = event_versions(&ctx, "resource", resource.id).await;
    assert_eq!(versions, (1..=n).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bids_keep_auction_aggregates_consistent() {
    let Some(ctx) = setup().await else { return };
    let owner = create_test_user(&ctx).await;
    let auction = create_test_auction(&ctx, &owner).await;

    let mut bidders = Vec::new();
    for _ in 0..4 {
        bidders.push(create_test_user(&ctx).await);
    }

    let mut tasks = JoinSet::new();
    for i in 0..20_i64 {
        let db = ctx.db.clone();
        let store = ctx.store.clone();
        let cmd = bid(auction.id, &bidders[(i % 4) as usize], 50_000 - i * 100);
        tasks.spawn(async move { handle_place_bid(cmd, &*store, &db).await });
    }
    let mut placed = 0;
    while let Some(result) = tasks.join_next().await {
        result.expect("태스크 실패").expect("입찰 실패");
        placed += 1;
    }
    assert_eq!(placed, 20);

    let auction = auctions::get_auction(&ctx.db, auction.id).await.unwrap();
    let aggregates = auctions::get_bid_aggregates(&ctx.db, auction.id).await.unwrap();
    assert_eq!(auction.bid_count, aggregates.bid_count);
    assert_eq!(auction.current_lowest_bid, aggregates.lowest_bid);
    assert_eq!(auction.current_lowest_bid, Some(50_000 - 19 * 100));

    let versions = event_versions(&ctx, "auction", auction.id).await;
    assert_eq!(versions.len() as i32, aggregates.bid_count + 1);
    assert_eq!(versions, (1..=versions.len() as i64).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invalid_bids_are_rejected() {
    let Some(ctx) = setup().await else { return };
    let owner = create_test_user(&ctx).await;
    let bidder = create_test_user(&ctx).await;
    let auction = create_test_auction(&ctx, &owner).await;

    let own = handle_place_bid(bid(auction.id, &owner, 10_000), &*ctx.store, &ctx.db).await;
    assert_eq!(own.err().map(|e| e.code()), Some("OWN_AUCTION_BID"));

    let zero = handle_place_bid(bid(auction.id, &bidder, 0), &*ctx.store, &ctx.db).await;
    assert_eq!(zero.err().map(|e| e.code()), Some("INVALID_BID_AMOUNT"));

    let stranger = handle_cancel_auction(auction.id, bidder.id, false, &*ctx.store, &ctx.db).await;
    assert!(matches!(stranger, Err(AppError::Forbidden)));

    let cancelled = handle_cancel_auction(auction.id, owner.id, false, &*ctx.store, &ctx.db)
        .await
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");

    let late = handle_place_bid(bid(auction.id, &bidder, 10_000), &*ctx.store, &ctx.db).await;
    assert_eq!(late.err().map(|e| e.code()), Some("AUCTION_NOT_ACTIVE"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn expired_auctions_are_awarded_to_the_lowest_bid() {
    let Some(ctx) = setup().await else { return };
    let owner = create_test_user(&ctx).await;
    let bidder = create_test_user(&ctx).await;
    let auction = create_test_auction(&ctx, &owner).await;

    handle_place_bid(bid(auction.id, &bidder, 30_000), &*ctx.store, &ctx.db)
        .await
        .unwrap();
    let lowest = handle_place_bid(bid(auction.id, &bidder, 25_000), &*ctx.store, &ctx.db)
        .await
        .unwrap();

    sqlx::query("UPDATE auctions SET deadline = $2 WHERE id = $1")
        .bind(auction.id)
        .bind(Utc::now() - Duration::minutes(1))
        .execute(ctx.db.pool())
        .await
        .unwrap();

    let closed = close_expired_auctions(&ctx.db, &*ctx.store).await.unwrap();
    assert!(closed >= 1);

    let auction = auctions::get_auction(&ctx.db, auction.id).await.unwrap();
    assert_eq!(auction.status, "completed");
    assert_eq!(auction.winning_bid_id, Some(lowest.id));

    // 이미 종료된 경매는 다시 건드리지 않는다.
    let versions = event_versions(&ctx, "auction", auction.id).await;
    close_expired_auctions(&ctx.db, &*ctx.store).await.unwrap();
    assert_eq!(event_versions(&ctx, "auction", auction.id).await, versions);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn service_ratings_use_a_running_average() {
    let Some(ctx) = setup().await else { return };
    let owner = create_test_user(&ctx).await;
    let service = services::create_service(&ctx.db, owner.id, service_request("Rated", 37.5, 127.0))
        .await
        .unwrap();
    assert_eq!(service.rating_count, 0);
    assert!(users::get_user(&ctx.db, owner.id).await.unwrap().is_service_provider);

    let own = services::rate_service(&ctx.db, service.id, owner.id, 5).await;
    assert_eq!(own.err().map(|e| e.code()), Some("OWN_SERVICE_RATING"));

    let rater = create_test_user(&ctx).await;
    let out_of_range = services::rate_service(&ctx.db, service.id, rater.id, 6).await;
    assert_eq!(out_of_range.err().map(|e| e.code()), Some("INVALID_RATING"));

    services::rate_service(&ctx.db, service.id, rater.id, 5).await.unwrap();
    let service = services::rate_service(&ctx.db, service.id, rater.id, 2)
        .await
        .unwrap();
    assert_eq!(service.rating_count, 2);
    assert!((service.rating - 3.5).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn nearby_services_are_sorted_by_distance() {
    let Some(ctx) = setup().await else { return };
    let owner = create_test_user(&ctx).await;
    // 다른 테스트와 겹치지 않는 외딴 좌표
    let (lat, long) = (-54.28, -36.5);
    let near = services::create_service(&ctx.db, owner.id, service_request("Near", lat + 0.01, long))
        .await
        .unwrap();
    let mid = services::create_service(&ctx.db, owner.id, service_request("Mid", lat + 0.05, long))
        .await
        .unwrap();
    let far = services::create_service(&ctx.db, owner.id, service_request("Far", lat + 1.0, long))
        .await
        .unwrap();

    let center = Location {
        lat,
        long,
        address: None,
    };
    let filter = ServiceFilter {
        radius_km: Some(10.0),
        limit: Some(100),
        ..ServiceFilter::default()
    };
    let (nearby, total) = services::list_nearby_services(&ctx.db, &filter, &center)
        .await
        .unwrap();
    let ids: Vec<i64> = nearby.iter().map(|n| n.service.id).collect();
    assert_eq!(total as usize, ids.len());
    assert!(!ids.contains(&far.id));

    let near_pos = ids.iter().position(|id| *id == near.id).expect("near 누락");
    let mid_pos = ids.iter().position(|id| *id == mid.id).expect("mid 누락");
    assert!(near_pos < mid_pos);
    assert!(nearby.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn search_finds_resources_by_title() {
    let Some(ctx) = setup().await else { return };
    let token = unique("sensor");
    let resource = resources::create_resource(
        &ctx.db,
        resource_request(&format!("{token} breakout board"), &[]),
    )
    .await
    .unwrap();

    let strategy = choose_strategy(&token, Some("en"));
    let found = search::search_resources(&ctx.db, &strategy, Page::new(None, Some(50)))
        .await
        .unwrap();
    assert!(found.iter().any(|r| r.id == resource.id));

    // 짧은 검색어는 부분 문자열 검색
    let strategy = choose_strategy("zz", Some("en"));
    search::search_resources(&ctx.db, &strategy, Page::default())
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pending_payments_can_be_cancelled_once() {
    let Some(ctx) = setup().await else { return };
    let user = create_test_user(&ctx).await;
    let order_id = generate_order_id();
    let payment = payments::insert_payment(
        &ctx.db,
        user.id,
        PaymentProvider::Toss,
        &order_id,
        "PLA 출력",
        15_000,
        "KRW",
    )
    .await
    .unwrap();
    assert_eq!(payment.status(), Ok(PaymentStatus::Pending));

    let stranger = create_test_user(&ctx).await;
    let other = handle_cancel_payment(stranger.id, &order_id, &*ctx.store, &ctx.db).await;
    assert_eq!(other.err().map(|e| e.code()), Some("NOT_FOUND"));

    let cancelled = handle_cancel_payment(user.id, &order_id, &*ctx.store, &ctx.db)
        .await
        .unwrap();
    assert_eq!(cancelled.status(), Ok(PaymentStatus::Cancelled));

    let again = handle_cancel_payment(user.id, &order_id, &*ctx.store, &ctx.db).await;
    assert_eq!(again.err().map(|e| e.code()), Some("PAYMENT_NOT_PENDING"));
    assert_eq!(event_versions(&ctx, "payment", payment.id).await, vec![1]);

    let unavailable = handle_initialize_payment(
        user.id,
        InitializePaymentRequest {
            provider: PaymentProvider::Kakao,
            amount: 1000,
            currency: None,
            order_name: "PLA".to_string(),
        },
        &Gateways::default(),
        &*ctx.store,
        &ctx.db,
    )
    .await;
    assert_eq!(unavailable.err().map(|e| e.code()), Some("PROVIDER_UNAVAILABLE"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_the_owner_awards_a_bid_from_their_auction() {
    let Some(ctx) = setup().await else { return };
    let owner = create_test_user(&ctx).await;
    let bidder = create_test_user(&ctx).await;
    let auction = create_test_auction(&ctx, &owner).await;
    let other_auction = create_test_auction(&ctx, &owner).await;

    let chosen = handle_place_bid(bid(auction.id, &bidder, 42_000), &*ctx.store, &ctx.db)
        .await
        .unwrap();
    let elsewhere = handle_place_bid(bid(other_auction.id, &bidder, 10_000), &*ctx.store, &ctx.db)
        .await
        .unwrap();

    let stranger =
        handle_award_auction(auction.id, bidder.id, chosen.id, &*ctx.store, &ctx.db).await;
    assert!(matches!(stranger, Err(AppError::Forbidden)));

    let foreign_bid =
        handle_award_auction(auction.id, owner.id, elsewhere.id, &*ctx.store, &ctx.db).await;
    assert_eq!(foreign_bid.err().map(|e| e.code()), Some("NOT_FOUND"));

    let awarded = handle_award_auction(auction.id, owner.id, chosen.id, &*ctx.store, &ctx.db)
        .await
        .unwrap();
    assert_eq!(awarded.status, "completed");
    assert_eq!(awarded.winning_bid_id, Some(chosen.id));
    assert_eq!(event_versions(&ctx, "auction", auction.id).await, vec![1, 2, 3]);

    let again = handle_award_auction(auction.id, owner.id, chosen.id, &*ctx.store, &ctx.db).await;
    assert_eq!(again.err().map(|e| e.code()), Some("AUCTION_NOT_ACTIVE"));
}

/// 결과가 정해진 결제사
enum Outcome {
    Approve,
    Reject,
    MissingKey,
}

struct ScriptedGateway(Outcome);

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Toss
    }

    async fn prepare(&self, payment: &Payment) -> Result<PreparedPayment, AppError> {
        Ok(PreparedPayment {
            reference: None,
            client_data: json!({ "orderId": payment.order_id }),
        })
    }

    async fn confirm(
        &self,
        payment: &Payment,
        _approval: &ApprovePaymentRequest,
    ) -> Result<ConfirmedPayment, AppError> {
        match self.0 {
            Outcome::Approve => Ok(ConfirmedPayment {
                reference: format!("pk-{}", payment.order_id),
            }),
            Outcome::Reject => Err(AppError::PaymentGateway("card declined".to_string())),
            Outcome::MissingKey => Err(AppError::bad_request(
                "INVALID_INPUT",
                "paymentKey is required",
            )),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn approval_outcome_decides_the_payment_status() {
    let Some(ctx) = setup().await else { return };
    let user = create_test_user(&ctx).await;

    let mut results = Vec::new();
    for outcome in [Outcome::MissingKey, Outcome::Reject, Outcome::Approve] {
        let mut gateways = Gateways::default();
        gateways.register(Arc::new(ScriptedGateway(outcome)));

        let initialized = handle_initialize_payment(
            user.id,
            InitializePaymentRequest {
                provider: PaymentProvider::Toss,
                amount: 15_000,
                currency: None,
                order_name: "PLA 출력".to_string(),
            },
            &gateways,
            &*ctx.store,
            &ctx.db,
        )
        .await
        .unwrap();
        let order_id = initialized.payment.order_id.clone();
        assert_eq!(initialized.payment.currency, "KRW");

        let approval = ApprovePaymentRequest {
            order_id: order_id.clone(),
            payment_key: Some("pk".to_string()),
            ..ApprovePaymentRequest::default()
        };
        let result = handle_approve_payment(user.id, approval, &gateways, &*ctx.store, &ctx.db).await;
        let stored = payments::find_payment_by_order(&ctx.db, &order_id)
            .await
            .unwrap()
            .unwrap();
        results.push((result.map_err(|e| e.code()), stored));
    }

    let (missing_key, pending) = &results[0];
    assert_eq!(missing_key.as_ref().err(), Some(&"INVALID_INPUT"));
    assert_eq!(pending.status(), Ok(PaymentStatus::Pending));
    assert!(event_versions(&ctx, "payment", pending.id).await.is_empty());

    let (rejected, failed) = &results[1];
    assert_eq!(rejected.as_ref().err(), Some(&"PAYMENT_GATEWAY_ERROR"));
    assert_eq!(failed.status(), Ok(PaymentStatus::Failed));
    assert!(failed.approved_at.is_none());

    let (approved, stored) = &results[2];
    let approved = approved.as_ref().unwrap();
    assert_eq!(approved.status(), Ok(PaymentStatus::Approved));
    assert!(approved.approved_at.is_some());
    assert_eq!(
        stored.provider_reference.as_deref(),
        Some(format!("pk-{}", stored.order_id).as_str())
    );
    assert_eq!(event_versions(&ctx, "payment", stored.id).await, vec![1]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn oversized_uploads_are_rejected_and_removed() {
    let Some(ctx) = setup().await else { return };
    let user = create_test_user(&ctx).await;
    let token = unique("token");
    users::create_session(&ctx.db, &token, user.id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    let upload_dir = std::env::temp_dir().join(unique("webel-uploads-"));
    let config = Config {
        upload_dir: upload_dir.clone(),
        max_upload_bytes: 1024,
        ..ctx.config.clone()
    };
    let state = AppState {
        db: ctx.db.clone(),
        event_store: ctx.store.clone(),
        gateways: Arc::new(Gateways::default()),
        config: Arc::new(config),
    };

    let boundary = "webel-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"gear.stl\"\r\nContent-Type: model/stl\r\n\r\n"
    )
    .into_bytes();
    body.extend(std::iter::repeat(b'x').take(4096));
    body.extend(format!("\r\n--{boundary}--\r\n").into_bytes());

    let request = Request::post("/api/uploads")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = webel::app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "UPLOAD_TOO_LARGE");

    let mut entries = tokio::fs::read_dir(&upload_dir).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none(), "부분 파일이 남았다");
    tokio::fs::remove_dir_all(&upload_dir).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn nearby_search_is_not_truncated_by_crowded_boxes() {
    let Some(ctx) = setup().await else { return };
    let owner = create_test_user(&ctx).await;
    // 실행마다 다른 좌표 (남극해)
    let seed = Uuid::new_v4().as_u128();
    let lat = -60.0 + (seed % 1000) as f64 / 200.0;
    let long = -150.0 + ((seed >> 16) % 1000) as f64 / 20.0;
    let center = Location {
        lat,
        long,
        address: None,
    };

    // 반경 50km 바깥이지만 경계 상자 안인 모서리에 2100개
    let bbox = webel::location::bounding_box(&center, 50.0);
    let (corner_lat, corner_long) = (bbox.max_lat - 0.01, bbox.long_ranges[0].1 - 0.01);
    sqlx::query(
        "INSERT INTO services (user_id, title, service_type, location)
         SELECT $1, 'Crowded corner ' || n, '3d_printing',
                jsonb_build_object('lat', $2::float8, 'long', $3::float8)
         FROM generate_series(1, 2100) AS n",
    )
    .bind(owner.id)
    .bind(corner_lat)
    .bind(corner_long)
    .execute(ctx.db.pool())
    .await
    .unwrap();
    assert!(center.distance_km(&Location {
        lat: corner_lat,
        long: corner_long,
        address: None,
    }) > 50.0);

    let near = services::create_service(
        &ctx.db,
        owner.id,
        service_request("Crowded near", lat + 0.009, long),
    )
    .await
    .unwrap();

    let filter = ServiceFilter {
        radius_km: Some(50.0),
        ..ServiceFilter::default()
    };
    let (nearby, total) = services::list_nearby_services(&ctx.db, &filter, &center)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(nearby[0].service.id, near.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn nearby_search_crosses_the_antimeridian() {
    let Some(ctx) = setup().await else { return };
    let owner = create_test_user(&ctx).await;
    let seed = Uuid::new_v4().as_u128();
    let lat = -20.0 + (seed % 1000) as f64 / 100.0;
    let across = services::create_service(
        &ctx.db,
        owner.id,
        service_request("Across the line", lat, -179.95),
    )
    .await
    .unwrap();

    let center = Location {
        lat,
        long: 179.9,
        address: None,
    };
    let filter = ServiceFilter {
        radius_km: Some(30.0),
        limit: Some(50),
        ..ServiceFilter::default()
    };
    let (nearby, _) = services::list_nearby_services(&ctx.db, &filter, &center)
        .await
        .unwrap();
    assert!(nearby.iter().any(|n| n.service.id == across.id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn search_matches_terms_inside_descriptions() {
    let Some(ctx) = setup().await else { return };
    let token = unique("gasket");
    let mut request = resource_request("Printer enclosure", &[]);
    request.description = format!("Laser cut panels with a {token} seal and hinged door");
    let resource = resources::create_resource(&ctx.db, request).await.unwrap();

    let strategy = choose_strategy(&token, Some("en"));
    let found = search::search_resources(&ctx.db, &strategy, Page::new(None, Some(50)))
        .await
        .unwrap();
    assert!(found.iter().any(|r| r.id == resource.id));
}
