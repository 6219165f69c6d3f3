// region:    --- Imports
use super::queries;
use crate::database::DatabaseManager;
use crate::payment::model::{Payment, PaymentProvider};
use sqlx::Error as SqlxError;
use tracing::info;

// endregion: --- Imports

/// 대기 상태 결제 생성
pub async fn insert_payment(
    db_manager: &DatabaseManager,
    user_id: i64,
    provider: PaymentProvider,
    order_id: &str,
    order_name: &str,
    amount: i64,
    currency: &str,
) -> Result<Payment, SqlxError> {
    info!(
        "{:<12} --> 결제 생성: {} {} {} ({})",
        "Query",
        order_id,
        amount,
        currency,
        provider.as_str()
    );
    sqlx::query_as::<_, Payment>(queries::INSERT_PAYMENT)
        .bind(user_id)
        .bind(provider.as_str())
        .bind(order_id)
        .bind(order_name)
        .bind(amount)
        .bind(currency)
        .fetch_one(db_manager.pool())
        .await
}

/// 주문 번호로 결제 조회
pub async fn find_payment_by_order(
    db_manager: &DatabaseManager,
    order_id: &str,
) -> Result<Option<Payment>, SqlxError> {
    sqlx::query_as::<_, Payment>(queries::GET_PAYMENT_BY_ORDER)
        .bind(order_id)
        .fetch_optional(db_manager.pool())
        .await
}

/// 사용자 결제 목록 (최신순)
pub async fn list_user_payments(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<Vec<Payment>, SqlxError> {
    sqlx::query_as::<_, Payment>(queries::LIST_USER_PAYMENTS)
        .bind(user_id)
        .fetch_all(db_manager.pool())
        .await
}

/// 결제사 참조값 저장
pub async fn set_payment_reference(
    db_manager: &DatabaseManager,
    payment_id: i64,
    reference: &str,
) -> Result<Payment, SqlxError> {
    sqlx::query_as::<_, Payment>(queries::SET_PAYMENT_REFERENCE)
        .bind(payment_id)
        .bind(reference)
        .fetch_one(db_manager.pool())
        .await
}
