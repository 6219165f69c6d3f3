// region:    --- Imports
use super::extract::{AppJson, AppPath};
use crate::auth::extract::AuthUser;
use crate::error::AppResult;
use crate::payment::commands::{
    handle_approve_payment, handle_cancel_payment, handle_initialize_payment,
};
use crate::payment::model::{
    ApprovePaymentRequest, InitializePaymentRequest, InitializePaymentResponse, Payment,
};
use crate::query::payments;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

// endregion: --- Imports

/// 결제 준비
pub async fn handle_initialize(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<InitializePaymentRequest>,
) -> AppResult<(StatusCode, Json<InitializePaymentResponse>)> {
    info!(
        "{:<12} --> 결제 준비 요청: {} {} by {}",
        "Handler",
        req.provider.as_str(),
        req.amount,
        auth.user.username
    );
    let response = handle_initialize_payment(
        auth.user.id,
        req,
        &state.gateways,
        &*state.event_store,
        &state.db,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// 결제 승인
pub async fn handle_approve(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<ApprovePaymentRequest>,
) -> AppResult<Json<Payment>> {
    info!("{:<12} --> 결제 승인 요청: {}", "Handler", req.order_id);
    let payment = handle_approve_payment(
        auth.user.id,
        req,
        &state.gateways,
        &*state.event_store,
        &state.db,
    )
    .await?;
    Ok(Json(payment))
}

/// 결제 취소
pub async fn handle_cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(order_id): AppPath<String>,
) -> AppResult<Json<Payment>> {
    let payment =
        handle_cancel_payment(auth.user.id, &order_id, &*state.event_store, &state.db).await?;
    Ok(Json(payment))
}

/// 내 결제 목록
pub async fn handle_list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(payments::list_user_payments(&state.db, auth.user.id).await?))
}
