/// 결제 커맨드 처리
/// 1. 결제 준비
/// 2. 결제 승인
/// 3. 결제 취소
// region:    --- Imports
use super::gateway::Gateways;
use super::model::{
    ApprovePaymentRequest, InitializePaymentRequest, InitializePaymentResponse, Payment,
    PaymentStatus,
};
use crate::auction::events::MarketEvent;
use crate::database::DatabaseManager;
use crate::error::AppError;
use crate::event_store::{current_version, EventStore};
use crate::query::{payments, queries};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

const AGGREGATE: &str = "payment";

/// 주문 번호: `WEBEL-<uuid>`
pub fn generate_order_id() -> String {
    format!("WEBEL-{}", Uuid::new_v4())
}

/// 통화 코드 정리 (없으면 결제사 기본 통화)
pub fn normalize_currency(currency: Option<&str>, default: &str) -> Result<String, AppError> {
    let currency = currency
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(default)
        .to_ascii_uppercase();
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(currency)
    } else {
        Err(AppError::bad_request(
            "INVALID_INPUT",
            format!("invalid currency code {currency}"),
        ))
    }
}

// region:    --- Commands
/// 1. 결제 준비
pub async fn handle_initialize_payment(
    user_id: i64,
    req: InitializePaymentRequest,
    gateways: &Gateways,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<InitializePaymentResponse, AppError> {
    if req.amount <= 0 {
        return Err(AppError::bad_request(
            "INVALID_AMOUNT",
            "amount must be positive",
        ));
    }
    let order_name = req.order_name.trim();
    if order_name.is_empty() {
        return Err(AppError::bad_request("INVALID_INPUT", "orderName is required"));
    }
    let currency = normalize_currency(req.currency.as_deref(), req.provider.default_currency())?;
    let gateway = gateways.get(req.provider)?;

    let order_id = generate_order_id();
    let mut payment = payments::insert_payment(
        db_manager,
        user_id,
        req.provider,
        &order_id,
        order_name,
        req.amount,
        &currency,
    )
    .await?;

    let prepared = match gateway.prepare(&payment).await {
        Ok(prepared) => prepared,
        Err(e) => {
            warn!("{:<12} --> 결제 준비 실패 {}: {}", "Payment", order_id, e);
            transition(db_manager, event_store, &payment, PaymentStatus::Failed, None).await?;
            return Err(e);
        }
    };

    if let Some(reference) = &prepared.reference {
        payment = payments::set_payment_reference(db_manager, payment.id, reference).await?;
    }
    info!("{:<12} --> 결제 준비 완료: {}", "Payment", order_id);

    Ok(InitializePaymentResponse {
        payment,
        client_data: prepared.client_data,
    })
}

/// 2. 결제 승인
pub async fn handle_approve_payment(
    user_id: i64,
    req: ApprovePaymentRequest,
    gateways: &Gateways,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Payment, AppError> {
    let payment = owned_pending_payment(db_manager, user_id, &req.order_id).await?;
    let provider = payment.provider().map_err(AppError::Internal)?;
    let gateway = gateways.get(provider)?;

    match gateway.confirm(&payment, &req).await {
        Ok(confirmed) => {
            transition(
                db_manager,
                event_store,
                &payment,
                PaymentStatus::Approved,
                Some(&confirmed.reference),
            )
            .await
        }
        Err(e @ AppError::BadRequest { .. }) => Err(e),
        Err(e) => {
            warn!("{:<12} --> 결제 승인 실패 {}: {}", "Payment", payment.order_id, e);
            transition(db_manager, event_store, &payment, PaymentStatus::Failed, None).await?;
            Err(e)
        }
    }
}

/// 3. 결제 취소 (대기 중인 결제만)
pub async fn handle_cancel_payment(
    user_id: i64,
    order_id: &str,
    event_store: &impl EventStore,
    db_manager: &DatabaseManager,
) -> Result<Payment, AppError> {
    let payment = owned_pending_payment(db_manager, user_id, order_id).await?;
    transition(db_manager, event_store, &payment, PaymentStatus::Cancelled, None).await
}

// endregion: --- Commands

// region:    --- Helpers
async fn owned_pending_payment(
    db_manager: &DatabaseManager,
    user_id: i64,
    order_id: &str,
) -> Result<Payment, AppError> {
    let payment = payments::find_payment_by_order(db_manager, order_id)
        .await?
        .filter(|p| p.user_id == user_id)
        .ok_or(AppError::NotFound("payment"))?;
    ensure_pending(&payment)?;
    Ok(payment)
}

fn ensure_pending(payment: &Payment) -> Result<(), AppError> {
    if payment.status() == Ok(PaymentStatus::Pending) {
        Ok(())
    } else {
        Err(AppError::conflict(
            "PAYMENT_NOT_PENDING",
            format!("payment {} is {}", payment.order_id, payment.status),
        ))
    }
}

/// 허용되지 않는 상태 변경이면 `PAYMENT_NOT_PENDING`
fn check_transition(payment: &Payment, next: PaymentStatus) -> Result<(), AppError> {
    let current = payment.status().map_err(AppError::Internal)?;
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::conflict(
            "PAYMENT_NOT_PENDING",
            format!(
                "payment {} cannot move from {} to {}",
                payment.order_id,
                current.as_str(),
                next.as_str()
            ),
        ))
    }
}

/// 상태 변경과 이벤트 기록을 한 트랜잭션으로 처리한다.
/// 행 잠금을 먼저 잡으므로 이벤트 버전은 잠금 안에서 정해진다.
async fn transition(
    db_manager: &DatabaseManager,
    event_store: &impl EventStore,
    payment: &Payment,
    status: PaymentStatus,
    reference: Option<&str>,
) -> Result<Payment, AppError> {
    check_transition(payment, status)?;
    let mut tx = db_manager.pool().begin().await?;

    let updated = sqlx::query_as::<_, Payment>(queries::UPDATE_PAYMENT_STATUS)
        .bind(&payment.order_id)
        .bind(status.as_str())
        .bind(reference)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(updated) = updated else {
        tx.rollback().await?;
        return Err(AppError::conflict(
            "PAYMENT_NOT_PENDING",
            format!("payment {} is no longer pending", payment.order_id),
        ));
    };

    let version = current_version(&mut *tx, AGGREGATE, updated.id).await? + 1;
    let event = MarketEvent::PaymentStatusChanged {
        payment_id: updated.id,
        order_id: updated.order_id.clone(),
        status: updated.status.clone(),
        timestamp: Utc::now(),
    };
    let stored = event_store
        .append(&mut tx, &event, version)
        .await?
        .ok_or_else(|| AppError::Internal(format!("payment {} version conflict", updated.id)))?;

    tx.commit().await?;
    event_store.publish(&stored).await;
    info!(
        "{:<12} --> 결제 상태 변경: {} -> {}",
        "Payment", updated.order_id, updated.status
    );
    Ok(updated)
}

// endregion: --- Helpers

#[cfg(test)]
mod tests {
    use super::*;

    fn payment_in(status: &str) -> Payment {
        Payment {
            id: 1,
            user_id: 1,
            provider: "kakao".to_string(),
            order_id: "WEBEL-1".to_string(),
            order_name: "목공 의뢰".to_string(),
            amount: 30000,
            currency: "KRW".to_string(),
            status: status.to_string(),
            provider_reference: None,
            approved_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn only_pending_payments_change_status() {
        let pending = payment_in("pending");
        assert!(check_transition(&pending, PaymentStatus::Approved).is_ok());
        assert!(check_transition(&pending, PaymentStatus::Cancelled).is_ok());

        let err = check_transition(&pending, PaymentStatus::Pending).unwrap_err();
        assert_eq!(err.code(), "PAYMENT_NOT_PENDING");
        let err = check_transition(&payment_in("approved"), PaymentStatus::Failed).unwrap_err();
        assert_eq!(err.code(), "PAYMENT_NOT_PENDING");
        let err = check_transition(&payment_in("refunded"), PaymentStatus::Cancelled).unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn order_ids_are_prefixed_and_unique() {
        let a = generate_order_id();
        let b = generate_order_id();
        assert!(a.starts_with("WEBEL-"));
        assert_eq!(a.len(), "WEBEL-".len() + 36);
        assert_ne!(a, b);
    }

    #[test]
    fn currency_defaults_and_validates() {
        assert_eq!(normalize_currency(None, "KRW").unwrap(), "KRW");
        assert_eq!(normalize_currency(Some(" usd "), "KRW").unwrap(), "USD");
        assert_eq!(normalize_currency(Some(""), "USD").unwrap(), "USD");
        assert!(normalize_currency(Some("dollars"), "USD").is_err());
        assert!(normalize_currency(Some("U$D"), "USD").is_err());
    }
}
