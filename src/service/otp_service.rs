use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::config::{config::Limits, crypto::CryptoService};
use crate::error::ApiError;
use crate::models::otp_request::OtpRequest;
use crate::service::sms_service::SmsSender;
use crate::utils::now_ms;

/// Issues and checks phone passcodes.
///
/// Each issuance appends a row; verification only ever looks at the newest
/// row for a phone, so older codes become unreachable until they expire and
/// get swept.
pub struct OtpService {
    pool: SqlitePool,
    crypto: CryptoService,
    sms: Arc<dyn SmsSender>,
    limits: Limits,
}

impl OtpService {
    pub fn new(
        pool: SqlitePool,
        crypto: CryptoService,
        sms: Arc<dyn SmsSender>,
        limits: Limits,
    ) -> Self {
        Self {
            pool,
            crypto,
            sms,
            limits,
        }
    }

    async fn latest_request(&self, phone: &str) -> Result<Option<OtpRequest>, ApiError> {
        let record = sqlx::query_as::<_, OtpRequest>(
            r#"
                SELECT id, phone, code_hash, expires_at, attempts, created_at
                FROM otp_requests
                WHERE phone = $1
                ORDER BY id DESC
                LIMIT 1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Removes every expired code, whatever phone it belongs to.
    pub async fn sweep_expired(&self, now: i64) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM otp_requests WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    pub async fn issue(&self, phone: &str) -> Result<(), ApiError> {
        if phone.is_empty() {
            return Err(ApiError::validation("Phone number required"));
        }

        let now = now_ms();
        let cooldown_ms = self.limits.otp_cooldown.as_millis() as i64;

        // Cooldown (1 minute)
        if let Some(last) = self.latest_request(phone).await? {
            let age = last.age_ms(now);
            if age < cooldown_ms {
                let retry_after = ((cooldown_ms - age) as u64).div_ceil(1000);
                return Err(ApiError::OtpThrottled { retry_after });
            }
        }

        let swept = self.sweep_expired(now).await?;
        if swept > 0 {
            info!(swept, "Removed expired OTP codes");
        }

        let code = self.crypto.generate_otp_code();
        let expires_at = now + self.limits.otp_lifetime.as_millis() as i64;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
                INSERT INTO otp_requests (phone, code_hash, expires_at, attempts, created_at)
                VALUES ($1, $2, $3, 0, $4)
                RETURNING id
            "#,
        )
        .bind(phone)
        .bind(self.crypto.hash_code(&code))
        .bind(expires_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        // An undelivered code must not hold the cooldown.
        if let Err(err) = self.sms.send_code(phone, &code).await {
            sqlx::query("DELETE FROM otp_requests WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            return Err(err.into());
        }

        Ok(())
    }

    /// Consumes the newest code for `phone` when `code` matches it.
    #[instrument(skip(self, code))]
    pub async fn verify(&self, phone: &str, code: &str) -> Result<(), ApiError> {
        if phone.is_empty() || code.trim().is_empty() {
            return Err(ApiError::validation("Phone number and code required"));
        }

        let otp = self
            .latest_request(phone)
            .await?
            .ok_or(ApiError::OtpNotFound)?;

        if otp.is_expired(now_ms()) {
            return Err(ApiError::OtpExpired);
        }

        if otp.attempts_exhausted(self.limits.otp_max_attempts) {
            return Err(ApiError::TooManyAttempts);
        }

        if !self.crypto.verify_code(code, &otp.code_hash) {
            sqlx::query("UPDATE otp_requests SET attempts = attempts + 1 WHERE id = $1")
                .bind(otp.id)
                .execute(&self.pool)
                .await?;
            warn!(attempts = otp.attempts + 1, "Wrong OTP submitted");
            return Err(ApiError::OtpMismatch);
        }

        // Correct OTP → one-time use
        sqlx::query("DELETE FROM otp_requests WHERE id = $1")
            .bind(otp.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
