/// Toss Payments 연동. 결제창은 클라이언트 키로 열고, 승인은 시크릿 키로 한다.
// region:    --- Imports
use super::gateway::{check_status, ConfirmedPayment, PaymentGateway, PreparedPayment};
use super::model::{ApprovePaymentRequest, Payment, PaymentProvider};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

// endregion: --- Imports

pub struct TossGateway {
    client: reqwest::Client,
    api_base: String,
    client_key: String,
    secret_key: String,
    public_base_url: String,
}

impl TossGateway {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        client_key: &str,
        secret_key: &str,
        public_base_url: &str,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            client_key: client_key.to_string(),
            secret_key: secret_key.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for TossGateway {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Toss
    }

    async fn prepare(&self, payment: &Payment) -> Result<PreparedPayment, AppError> {
        Ok(PreparedPayment {
            reference: None,
            client_data: json!({
                "clientKey": self.client_key,
                "orderId": payment.order_id,
                "orderName": payment.order_name,
                "amount": payment.amount,
                "currency": payment.currency,
                "successUrl": format!("{}/payment/success?provider=toss", self.public_base_url),
                "failUrl": format!("{}/payment/fail?provider=toss", self.public_base_url),
            }),
        })
    }

    async fn confirm(
        &self,
        payment: &Payment,
        approval: &ApprovePaymentRequest,
    ) -> Result<ConfirmedPayment, AppError> {
        let payment_key = approval
            .payment_key
            .as_deref()
            .ok_or_else(|| AppError::bad_request("INVALID_INPUT", "paymentKey is required"))?;

        // 시크릿 키 뒤에 ':'를 붙인 basic 인증
        let resp = self
            .client
            .post(format!("{}/v1/payments/confirm", self.api_base))
            .basic_auth(&self.secret_key, Some(""))
            .json(&json!({
                "paymentKey": payment_key,
                "orderId": payment.order_id,
                "amount": payment.amount,
            }))
            .send()
            .await?;
        let body = check_status(PaymentProvider::Toss, resp).await?;

        match body["status"].as_str() {
            Some("DONE") => {
                info!("{:<12} --> Toss 승인: {}", "Payment", payment.order_id);
                Ok(ConfirmedPayment {
                    reference: payment_key.to_string(),
                })
            }
            other => Err(AppError::PaymentGateway(format!(
                "toss confirm ended with status {other:?}"
            ))),
        }
    }
}
