/// KakaoPay 단건 결제 (ready -> 사용자 승인 -> approve)
// region:    --- Imports
use super::gateway::{check_status, ConfirmedPayment, PaymentGateway, PreparedPayment};
use super::model::{ApprovePaymentRequest, Payment, PaymentProvider};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

// endregion: --- Imports

pub struct KakaoGateway {
    client: reqwest::Client,
    api_base: String,
    admin_key: String,
    cid: String,
    public_base_url: String,
}

impl KakaoGateway {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        admin_key: &str,
        cid: &str,
        public_base_url: &str,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            admin_key: admin_key.to_string(),
            cid: cid.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn authorization(&self) -> String {
        format!("SECRET_KEY {}", self.admin_key)
    }

    fn redirect_url(&self, outcome: &str, order_id: &str) -> String {
        format!(
            "{}/payment/{}?provider=kakao&orderId={}",
            self.public_base_url, outcome, order_id
        )
    }
}

#[async_trait]
impl PaymentGateway for KakaoGateway {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Kakao
    }

    async fn prepare(&self, payment: &Payment) -> Result<PreparedPayment, AppError> {
        let resp = self
            .client
            .post(format!("{}/online/v1/payment/ready", self.api_base))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&json!({
                "cid": self.cid,
                "partner_order_id": payment.order_id,
                "partner_user_id": payment.user_id.to_string(),
                "item_name": payment.order_name,
                "quantity": 1,
                "total_amount": payment.amount,
                "tax_free_amount": 0,
                "approval_url": self.redirect_url("success", &payment.order_id),
                "cancel_url": self.redirect_url("cancel", &payment.order_id),
                "fail_url": self.redirect_url("fail", &payment.order_id),
            }))
            .send()
            .await?;
        let body = check_status(PaymentProvider::Kakao, resp).await?;

        let tid = body["tid"]
            .as_str()
            .ok_or_else(|| AppError::PaymentGateway("kakao ready response without tid".into()))?
            .to_string();
        info!("{:<12} --> KakaoPay 준비: {} ({})", "Payment", tid, payment.order_id);

        Ok(PreparedPayment {
            reference: Some(tid.clone()),
            client_data: json!({
                "tid": tid,
                "redirectUrl": body["next_redirect_pc_url"],
                "mobileRedirectUrl": body["next_redirect_mobile_url"],
            }),
        })
    }

    async fn confirm(
        &self,
        payment: &Payment,
        approval: &ApprovePaymentRequest,
    ) -> Result<ConfirmedPayment, AppError> {
        let pg_token = approval
            .pg_token
            .as_deref()
            .ok_or_else(|| AppError::bad_request("INVALID_INPUT", "pgToken is required"))?;
        let tid = payment
            .provider_reference
            .as_deref()
            .ok_or_else(|| AppError::Internal(format!("{} has no kakao tid", payment.order_id)))?;

        let resp = self
            .client
            .post(format!("{}/online/v1/payment/approve", self.api_base))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&json!({
                "cid": self.cid,
                "tid": tid,
                "partner_order_id": payment.order_id,
                "partner_user_id": payment.user_id.to_string(),
                "pg_token": pg_token,
            }))
            .send()
            .await?;
        check_status(PaymentProvider::Kakao, resp).await?;

        Ok(ConfirmedPayment {
            reference: tid.to_string(),
        })
    }
}
