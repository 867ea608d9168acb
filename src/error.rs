use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    NotFound(String),

    #[error("Code not found")]
    OtpNotFound,

    #[error("Code has expired")]
    OtpExpired,

    #[error("Wrong code")]
    OtpMismatch,

    #[error("Too fast! Try again in {retry_after} seconds")]
    OtpThrottled { retry_after: u64 },

    #[error("Too many attempts. Request a new code")]
    TooManyAttempts,

    #[error("Daily limit reached ({limit} per 24h)")]
    QuotaExceeded { limit: i64 },

    #[error("Too many requests, please try again later")]
    RateLimited { retry_after: u64 },

    #[error("Photo must be smaller than {limit_mb}MB")]
    PayloadTooLarge { limit_mb: usize },

    #[error("Analysis service is not configured (OPENAI_API_KEY required)")]
    Configuration,

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] eyre::Report),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Seconds a client should wait before retrying, for throttling errors.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ApiError::OtpThrottled { retry_after } | ApiError::RateLimited { retry_after } => {
                Some(*retry_after)
            }
            _ => None,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Analysis(_) => "Analysis error".to_string(),
            ApiError::Database(_) | ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::OtpNotFound
            | ApiError::OtpExpired
            | ApiError::OtpMismatch => StatusCode::BAD_REQUEST,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::OtpThrottled { .. }
            | ApiError::TooManyAttempts
            | ApiError::QuotaExceeded { .. }
            | ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Configuration
            | ApiError::Analysis(_)
            | ApiError::Database(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }

        let mut response = HttpResponse::build(status);
        if let Some(seconds) = self.retry_after() {
            response.insert_header((header::RETRY_AFTER, seconds.to_string()));
        }
        response.json(json!({ "error": self.public_message() }))
    }
}
