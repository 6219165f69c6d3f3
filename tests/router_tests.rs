//! 라우터 테스트. 데이터베이스에 닿기 전에 끝나는 요청만 다룬다.
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use webel::config::Config;
use webel::database::DatabaseManager;
use webel::event_store::PostgresEventStore;
use webel::i18n;
use webel::message_broker::LogPublisher;
use webel::payment::gateway::Gateways;
use webel::state::AppState;

fn test_app() -> Router {
    let config = Config::default();
    let db = DatabaseManager::connect_lazy(&config).expect("lazy pool");
    let state = AppState {
        db: Arc::new(db),
        event_store: Arc::new(PostgresEventStore::new(
            Arc::new(LogPublisher),
            config.events_topic.clone(),
        )),
        gateways: Arc::new(Gateways::default()),
        config: Arc::new(config),
    };
    webel::app(state)
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = test_app().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let (status, body) = send(get("/api/user")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, body) = send(post_json("/api/auctions/1/bids", json!({"amount": 1000}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn error_messages_follow_the_requested_language() {
    let english = i18n::catalog().resolve("en", "en", "errors.UNAUTHORIZED");
    let korean = i18n::catalog().resolve("ko", "en", "errors.UNAUTHORIZED");
    assert_ne!(english, korean);

    let request = Request::get("/api/user")
        .header(header::ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9,en;q=0.5")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(request).await;
    assert_eq!(body["error"], korean);

    // 쿼리 파라미터가 헤더보다 우선
    let request = Request::get("/api/user?lang=en")
        .header(header::ACCEPT_LANGUAGE, "ko")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(request).await;
    assert_eq!(body["error"], english);

    // 번역이 없는 코드는 기본 언어로
    let request = Request::get("/api/services?lat=37.5")
        .header(header::ACCEPT_LANGUAGE, "ja")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_LOCATION");
    assert_eq!(
        body["error"],
        i18n::catalog().resolve("en", "en", "errors.INVALID_LOCATION")
    );
}

#[tokio::test]
async fn empty_search_query_is_rejected() {
    let (status, body) = send(get("/api/search?q=%20%20%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_QUERY");

    let (status, body) = send(get("/api/search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_QUERY");

    let (status, body) = send(get("/api/search?q=pcb&type=everything")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn registration_input_is_validated_before_storage() {
    let (status, body) = send(post_json(
        "/api/register",
        json!({"username": "ab", "password": "long enough", "email": "a@webel.kr"}),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_USERNAME");

    let (_, body) = send(post_json(
        "/api/register",
        json!({"username": "maker", "password": "short", "email": "a@webel.kr"}),
    ))
    .await;
    assert_eq!(body["code"], "WEAK_PASSWORD");

    let (_, body) = send(post_json(
        "/api/register",
        json!({"username": "maker", "password": "long enough", "email": "not-an-email"}),
    ))
    .await;
    assert_eq!(body["code"], "INVALID_EMAIL");

    let request = Request::post("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn malformed_path_and_location_parameters_are_bad_requests() {
    let (status, body) = send(get("/api/auctions/not-a-number")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = send(get("/api/services?lat=91&long=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_LOCATION");

    let (status, _) = send(get("/api/uploads/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn i18n_endpoints_serve_bundles() {
    let (status, body) = send(get("/api/i18n/languages")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["defaultLanguage"], "en");
    assert_eq!(body["languages"], json!(["en", "ja", "ko", "zh"]));

    let (status, body) = send(get("/api/i18n/ja")).await;
    assert_eq!(status, StatusCode::OK);
    // 일본어 번들에 없는 키는 영어로 채워진다.
    assert_eq!(
        body["errors"]["WEAK_PASSWORD"],
        i18n::catalog().resolve("en", "en", "errors.WEAK_PASSWORD")
    );
    assert_eq!(
        body["errors"]["NOT_FOUND"],
        i18n::catalog().resolve("ja", "en", "errors.NOT_FOUND")
    );

    let (status, body) = send(get("/api/i18n/fr")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn upload_config_exposes_retry_delays() {
    let (status, body) = send(get("/api/uploads/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["retryDelays"], json!([0, 1000, 3000, 5000]));
    assert_eq!(body["endpoint"], "/api/uploads");
    assert_eq!(body["maxUploadBytes"], 100 * 1024 * 1024);
}

#[tokio::test]
async fn payment_routes_require_authentication() {
    let (status, _) = send(post_json(
        "/api/payments/initialize",
        json!({"provider": "toss", "amount": 1000, "orderName": "PLA"}),
    ))
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
