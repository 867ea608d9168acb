use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::models::user::User;

pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, phone, password FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, phone, password FROM users WHERE phone = $1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Returns the user owning `phone`, creating one named after the phone
    /// number on first login.
    #[instrument(skip(self))]
    pub async fn find_or_create_by_phone(&self, phone: &str) -> Result<User, ApiError> {
        if let Some(user) = self.get_user_by_phone(phone).await? {
            return Ok(user);
        }

        let created = sqlx::query(
            r#"
                INSERT INTO users (username, password, phone)
                VALUES ($1, NULL, $1)
                ON CONFLICT DO NOTHING
            "#,
        )
        .bind(phone)
        .execute(&self.pool)
        .await?;

        if created.rows_affected() > 0 {
            info!("Created user on first login");
        }

        self.get_user_by_phone(phone)
            .await?
            .ok_or_else(|| eyre::eyre!("User row missing after insert").into())
    }
}
