pub mod analysis_service;
pub mod openai_client;
pub mod otp_service;
pub mod prompts;
pub mod quota_service;
pub mod sms_service;
pub mod token_service;
pub mod user_service;
