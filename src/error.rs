// region:    --- Imports
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

pub type AppResult<T> = Result<T, AppError>;

// region:    --- App Error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("authentication required ({0})")]
    Unauthorized(&'static str),

    #[error("forbidden")]
    Forbidden,

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 클라이언트에 노출되는 에러 코드 (번역 키 `errors.<CODE>`)
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) | AppError::Database(sqlx::Error::RowNotFound) => "NOT_FOUND",
            AppError::BadRequest { code, .. } | AppError::Conflict { code, .. } => *code,
            AppError::Unauthorized(code) => *code,
            AppError::Forbidden => "FORBIDDEN",
            AppError::PaymentGateway(_) => "PAYMENT_GATEWAY_ERROR",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 내부 정보가 새지 않도록 서버 오류는 고정 문구만 내보낸다.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(sqlx::Error::RowNotFound) => "The requested item was not found.".to_string(),
            AppError::Database(_) | AppError::Internal(_) => {
                "An internal server error occurred.".to_string()
            }
            AppError::PaymentGateway(_) => "The payment provider rejected the request.".to_string(),
            AppError::Unauthorized(_) => "Please sign in to continue.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::PaymentGateway(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

// endregion: --- App Error

// region:    --- Response
/// 에러 응답 본문
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

/// 응답 확장에 남겨 두는 에러 코드. 번역 미들웨어가 본문을 현지화할 때 사용한다.
#[derive(Debug, Clone, Copy)]
pub struct ErrorCode(pub &'static str);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:<12} --> {:?}", "Error", self);
        }

        let code = self.code();
        let body = ErrorBody {
            error: self.public_message(),
            code,
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(ErrorCode(code));
        response
    }
}

// endregion: --- Response
