use serde::Serialize;
use sqlx::FromRow;

/// One issued passcode. Timestamps are Unix epoch milliseconds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OtpRequest {
    pub id: i64,
    pub phone: String,
    #[serde(skip_serializing)]
    pub code_hash: String,
    pub expires_at: i64,
    pub attempts: i64,
    pub created_at: i64,
}

impl OtpRequest {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }

    pub fn attempts_exhausted(&self, max_attempts: i64) -> bool {
        self.attempts >= max_attempts
    }

    /// Milliseconds since issuance, never negative.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.created_at).max(0)
    }
}
