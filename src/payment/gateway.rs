// region:    --- Imports
use super::kakao::KakaoGateway;
use super::model::{ApprovePaymentRequest, Payment, PaymentProvider};
use super::paypal::PaypalGateway;
use super::toss::TossGateway;
use crate::config::Config;
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// endregion: --- Imports

/// 결제 준비 결과
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPayment {
    /// 결제사가 발급한 식별자 (PayPal 주문 id, Kakao tid)
    pub reference: Option<String>,
    /// 프론트엔드 SDK에 넘길 값
    pub client_data: Value,
}

/// 결제 승인 결과
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedPayment {
    pub reference: String,
}

/// 결제사 연동 트레이트
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn provider(&self) -> PaymentProvider;

    async fn prepare(&self, payment: &Payment) -> Result<PreparedPayment, AppError>;

    async fn confirm(
        &self,
        payment: &Payment,
        approval: &ApprovePaymentRequest,
    ) -> Result<ConfirmedPayment, AppError>;
}

/// 자격 증명이 설정된 결제사만 등록된다.
#[derive(Clone, Default)]
pub struct Gateways {
    gateways: HashMap<PaymentProvider, Arc<dyn PaymentGateway>>,
}

impl Gateways {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let mut gateways = Self::default();

        if let (Some(id), Some(secret)) = (&config.paypal_client_id, &config.paypal_client_secret) {
            gateways.register(Arc::new(PaypalGateway::new(
                client.clone(),
                &config.paypal_api_base,
                id,
                secret,
            )));
        }
        if let (Some(client_key), Some(secret_key)) =
            (&config.toss_client_key, &config.toss_secret_key)
        {
            gateways.register(Arc::new(TossGateway::new(
                client.clone(),
                &config.toss_api_base,
                client_key,
                secret_key,
                &config.public_base_url,
            )));
        }
        if let Some(admin_key) = &config.kakao_admin_key {
            gateways.register(Arc::new(KakaoGateway::new(
                client,
                &config.kakao_api_base,
                admin_key,
                &config.kakao_cid,
                &config.public_base_url,
            )));
        }

        info!(
            "{:<12} --> 결제사 등록: {:?}",
            "Payment",
            gateways.providers()
        );
        Ok(gateways)
    }

    pub fn register(&mut self, gateway: Arc<dyn PaymentGateway>) {
        self.gateways.insert(gateway.provider(), gateway);
    }

    pub fn get(&self, provider: PaymentProvider) -> Result<Arc<dyn PaymentGateway>, AppError> {
        self.gateways.get(&provider).cloned().ok_or_else(|| {
            AppError::bad_request(
                "PROVIDER_UNAVAILABLE",
                format!("{} is not configured", provider.as_str()),
            )
        })
    }

    pub fn providers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.gateways.keys().map(|p| p.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// 결제사 응답 상태 확인
pub(crate) async fn check_status(
    provider: PaymentProvider,
    resp: reqwest::Response,
) -> Result<Value, AppError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AppError::PaymentGateway(format!(
            "{} responded {}: {}",
            provider.as_str(),
            status,
            body
        )));
    }
    Ok(resp.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct FixedGateway(PaymentProvider);

    #[async_trait]
    impl PaymentGateway for FixedGateway {
        fn provider(&self) -> PaymentProvider {
            self.0
        }

        async fn prepare(&self, payment: &Payment) -> Result<PreparedPayment, AppError> {
            Ok(PreparedPayment {
                reference: Some(format!("ref-{}", payment.order_id)),
                client_data: serde_json::json!({ "orderId": payment.order_id }),
            })
        }

        async fn confirm(
            &self,
            payment: &Payment,
            _approval: &ApprovePaymentRequest,
        ) -> Result<ConfirmedPayment, AppError> {
            Ok(ConfirmedPayment {
                reference: format!("ref-{}", payment.order_id),
            })
        }
    }

    fn payment() -> Payment {
        Payment {
            id: 1,
            user_id: 1,
            provider: "toss".to_string(),
            order_id: "WEBEL-1".to_string(),
            order_name: "PLA 출력".to_string(),
            amount: 15000,
            currency: "KRW".to_string(),
            status: "pending".to_string(),
            provider_reference: None,
            approved_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn unregistered_provider_is_unavailable() {
        let mut gateways = Gateways::default();
        gateways.register(Arc::new(FixedGateway(PaymentProvider::Toss)));

        assert_eq!(gateways.providers(), vec!["toss"]);
        let err = gateways.get(PaymentProvider::Kakao).err().map(|e| e.code());
        assert_eq!(err, Some("PROVIDER_UNAVAILABLE"));

        let toss = gateways.get(PaymentProvider::Toss).unwrap();
        let prepared = toss.prepare(&payment()).await.unwrap();
        assert_eq!(prepared.reference.as_deref(), Some("ref-WEBEL-1"));
    }

    #[test]
    fn gateways_without_credentials_are_skipped() {
        let config = Config {
            toss_client_key: Some("test_ck".to_string()),
            toss_secret_key: Some("test_sk".to_string()),
            ..Config::default()
        };
        let gateways = Gateways::from_config(&config).unwrap();
        assert_eq!(gateways.providers(), vec!["toss"]);
    }
}
