use std::time::Duration;

use sqlx::SqlitePool;
use tracing::instrument;

use crate::error::ApiError;
use crate::models::upload_event::UploadEvent;
use crate::utils::now_ms;

/// Rolling-window cap on analyses per user.
pub struct QuotaService {
    pool: SqlitePool,
    limit: i64,
    window: Duration,
}

impl QuotaService {
    pub fn new(pool: SqlitePool, limit: i64, window: Duration) -> Self {
        Self {
            pool,
            limit,
            window,
        }
    }

    /// Uploads by `user_id` inside the trailing window.
    pub async fn daily_count(&self, user_id: i64) -> Result<i64, ApiError> {
        let since = now_ms() - self.window.as_millis() as i64;
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM uploads WHERE user_id = $1 AND created_at > $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[instrument(skip(self))]
    pub async fn ensure_available(&self, user_id: i64) -> Result<(), ApiError> {
        if self.daily_count(user_id).await? >= self.limit {
            return Err(ApiError::QuotaExceeded { limit: self.limit });
        }
        Ok(())
    }

    pub async fn add_upload(&self, user_id: i64) -> Result<UploadEvent, ApiError> {
        let event = sqlx::query_as::<_, UploadEvent>(
            r#"
                INSERT INTO uploads (user_id, created_at)
                VALUES ($1, $2)
                RETURNING id, user_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(now_ms())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }
}
