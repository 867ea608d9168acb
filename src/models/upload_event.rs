use serde::Serialize;
use sqlx::FromRow;

/// A successful analysis, counted against the user's rolling daily quota.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UploadEvent {
    pub id: i64,
    pub user_id: i64,
    pub created_at: i64,
}
