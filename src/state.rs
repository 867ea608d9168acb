use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::config::{Config, Limits};
use crate::config::crypto::CryptoService;
use crate::middleware::rate_limit::RateLimiter;
use crate::service::analysis_service::AnalysisService;
use crate::service::openai_client::{OpenAiVisionClient, VisionModel};
use crate::service::otp_service::OtpService;
use crate::service::quota_service::QuotaService;
use crate::service::sms_service::{LogSmsSender, SmsSender};
use crate::service::token_service::TokenService;
use crate::service::user_service::UserService;

/// Everything a request handler needs, built once and shared by all workers.
pub struct AppState {
    pub users: UserService,
    pub otp: OtpService,
    pub tokens: TokenService,
    pub analysis: AnalysisService,
    pub limiter: RateLimiter,
    pub limits: Limits,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        limits: Limits,
        jwt_secret: &str,
        sms: Arc<dyn SmsSender>,
        model: Arc<dyn VisionModel>,
    ) -> Self {
        let quota = QuotaService::new(pool.clone(), limits.daily_quota, limits.quota_window);

        Self {
            users: UserService::new(pool.clone()),
            otp: OtpService::new(pool, CryptoService::new(), sms, limits.clone()),
            tokens: TokenService::new(jwt_secret, limits.token_lifetime),
            analysis: AnalysisService::new(model, quota),
            limiter: RateLimiter::new(limits.requests_per_window, limits.request_window),
            limits,
        }
    }

    pub fn from_config(pool: SqlitePool, config: &Config) -> Self {
        let model = OpenAiVisionClient::new(
            &config.openai_base_url,
            config.openai_api_key.clone(),
            &config.openai_model,
        );

        Self::new(
            pool,
            Limits::default(),
            &config.jwt_secret,
            Arc::new(LogSmsSender),
            Arc::new(model),
        )
    }
}
