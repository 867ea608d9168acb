use std::time::Duration;

use color_eyre::Result;
use dotenv::dotenv;
use eyre::WrapErr;
use serde::Deserialize;
use sqlx::sqlite::SqlitePool;
use tracing::{info, warn};

use crate::config::database;

pub const DEFAULT_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        info!("Initializing configuration");
        let settings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("database_url", "sqlite://veritabani.db?mode=rwc")?
            .set_default("jwt_secret", DEFAULT_JWT_SECRET)?
            .set_default("openai_base_url", "https://api.openai.com/v1")?
            .set_default("openai_model", "gpt-4o-mini")?
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .wrap_err("Building configuration")?;

        let mut config: Config = settings
            .try_deserialize()
            .wrap_err("loading configuration from environment")?;
        config.openai_api_key = config
            .openai_api_key
            .take()
            .filter(|key| !key.trim().is_empty());

        Ok(config)
    }

    pub async fn db_pool(&self) -> Result<SqlitePool> {
        info!("Initializing database pool");
        database::connect(&self.database_url, 5)
            .await
            .wrap_err("Creating database pool")
    }

    /// Logs the settings that are allowed to fall back but should not in production.
    pub fn warn_insecure_defaults(&self) {
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("JWT_SECRET is not set, tokens are signed with the development secret");
        }
        if self.openai_api_key.is_none() {
            warn!("OPENAI_API_KEY is not set, /analyze will answer 500 until it is configured");
        }
    }
}

/// Policy knobs shared by the OTP, quota, token and rate limiting code.
#[derive(Debug, Clone)]
pub struct Limits {
    pub otp_cooldown: Duration,
    pub otp_lifetime: Duration,
    pub otp_max_attempts: i64,
    pub daily_quota: i64,
    pub quota_window: Duration,
    pub token_lifetime: Duration,
    pub max_upload_bytes: usize,
    pub requests_per_window: u32,
    pub request_window: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            otp_cooldown: Duration::from_secs(60),
            otp_lifetime: Duration::from_secs(5 * 60),
            otp_max_attempts: 5,
            daily_quota: 3,
            quota_window: Duration::from_secs(24 * 60 * 60),
            token_lifetime: Duration::from_secs(24 * 60 * 60),
            max_upload_bytes: 5 * 1024 * 1024,
            requests_per_window: 300,
            request_window: Duration::from_secs(15 * 60),
        }
    }
}
