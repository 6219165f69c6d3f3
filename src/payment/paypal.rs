/// PayPal Orders v2 연동 (client credentials 토큰)
// region:    --- Imports
use super::gateway::{check_status, ConfirmedPayment, PaymentGateway, PreparedPayment};
use super::model::{ApprovePaymentRequest, Payment, PaymentProvider};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

// endregion: --- Imports

/// 소수점이 없는 통화
const ZERO_DECIMAL_CURRENCIES: [&str; 3] = ["JPY", "KRW", "TWD"];

pub struct PaypalGateway {
    client: reqwest::Client,
    api_base: String,
    client_id: String,
    client_secret: String,
}

impl PaypalGateway {
    pub fn new(client: reqwest::Client, api_base: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    async fn access_token(&self) -> Result<String, AppError> {
        let resp = self
            .client
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body("grant_type=client_credentials")
            .send()
            .await?;
        let body = check_status(PaymentProvider::Paypal, resp).await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::PaymentGateway("paypal token response without access_token".into()))
    }
}

/// 최소 단위 금액을 PayPal 금액 문자열로 변환 (1234 USD -> "12.34")
pub fn paypal_amount(amount: i64, currency: &str) -> String {
    if ZERO_DECIMAL_CURRENCIES.contains(&currency) {
        amount.to_string()
    } else {
        format!("{}.{:02}", amount / 100, amount % 100)
    }
}

/// PayPal 주문 id는 영숫자와 '-'로만 이루어진다.
fn is_paypal_order_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[async_trait]
impl PaymentGateway for PaypalGateway {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Paypal
    }

    async fn prepare(&self, payment: &Payment) -> Result<PreparedPayment, AppError> {
        let token = self.access_token().await?;
        let resp = self
            .client
            .post(format!("{}/v2/checkout/orders", self.api_base))
            .bearer_auth(&token)
            .json(&json!({
                "intent": "CAPTURE",
                "purchase_units": [{
                    "reference_id": payment.order_id,
                    "description": payment.order_name,
                    "amount": {
                        "currency_code": payment.currency,
                        "value": paypal_amount(payment.amount, &payment.currency),
                    }
                }]
            }))
            .send()
            .await?;
        let body = check_status(PaymentProvider::Paypal, resp).await?;

        let paypal_order_id = body["id"]
            .as_str()
            .ok_or_else(|| AppError::PaymentGateway("paypal order response without id".into()))?
            .to_string();
        info!(
            "{:<12} --> PayPal 주문 생성: {} ({})",
            "Payment", paypal_order_id, payment.order_id
        );

        Ok(PreparedPayment {
            reference: Some(paypal_order_id.clone()),
            client_data: json!({
                "paypalOrderId": paypal_order_id,
                "clientId": self.client_id,
                "currency": payment.currency,
            }),
        })
    }

    async fn confirm(
        &self,
        payment: &Payment,
        approval: &ApprovePaymentRequest,
    ) -> Result<ConfirmedPayment, AppError> {
        // 캡처 대상은 준비 단계에서 서버가 만든 주문뿐이다.
        let paypal_order_id = payment
            .provider_reference
            .as_deref()
            .ok_or_else(|| AppError::Internal(format!("{} has no paypal order", payment.order_id)))?;
        if approval
            .provider_reference
            .as_deref()
            .is_some_and(|reference| reference != paypal_order_id)
        {
            return Err(AppError::bad_request(
                "INVALID_INPUT",
                "providerReference does not match this payment",
            ));
        }
        if !is_paypal_order_id(paypal_order_id) {
            return Err(AppError::Internal(format!(
                "{} has a malformed paypal order id",
                payment.order_id
            )));
        }

        let token = self.access_token().await?;
        let resp = self
            .client
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.api_base, paypal_order_id
            ))
            .bearer_auth(&token)
            .json(&json!({}))
            .send()
            .await?;
        let body = check_status(PaymentProvider::Paypal, resp).await?;

        match body["status"].as_str() {
            Some("COMPLETED") => Ok(ConfirmedPayment {
                reference: paypal_order_id.to_string(),
            }),
            other => Err(AppError::PaymentGateway(format!(
                "paypal capture ended with status {other:?}"
            ))),
        }
    }
}
