use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 결제사
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Paypal,
    Toss,
    Kakao,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Paypal => "paypal",
            PaymentProvider::Toss => "toss",
            PaymentProvider::Kakao => "kakao",
        }
    }

    pub fn default_currency(&self) -> &'static str {
        match self {
            PaymentProvider::Paypal => "USD",
            PaymentProvider::Toss | PaymentProvider::Kakao => "KRW",
        }
    }
}

impl FromStr for PaymentProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paypal" => Ok(PaymentProvider::Paypal),
            "toss" => Ok(PaymentProvider::Toss),
            "kakao" => Ok(PaymentProvider::Kakao),
            other => Err(format!("unknown payment provider: {other}")),
        }
    }
}

/// 결제 상태. 대기(pending)에서만 다른 상태로 갈 수 있다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (
                PaymentStatus::Pending,
                PaymentStatus::Approved | PaymentStatus::Failed | PaymentStatus::Cancelled
            )
        )
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "approved" => Ok(PaymentStatus::Approved),
            "failed" => Ok(PaymentStatus::Failed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

// 결제 모델
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub provider: String,
    pub order_id: String,
    pub order_name: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub provider_reference: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn status(&self) -> Result<PaymentStatus, String> {
        self.status.parse()
    }

    pub fn provider(&self) -> Result<PaymentProvider, String> {
        self.provider.parse()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentRequest {
    pub provider: PaymentProvider,
    pub amount: i64,
    pub currency: Option<String>,
    pub order_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePaymentRequest {
    pub order_id: String,
    /// PayPal 주문 id
    pub provider_reference: Option<String>,
    /// KakaoPay 승인 리다이렉트의 `pg_token`
    pub pg_token: Option<String>,
    /// Toss 성공 리다이렉트의 `paymentKey`
    pub payment_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentResponse {
    pub payment: Payment,
    pub client_data: serde_json::Value,
}
