use async_trait::async_trait;
use color_eyre::Result;
use tracing::info;

/// Out-of-band delivery channel for one-time passcodes.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_code(&self, phone: &str, code: &str) -> Result<()>;
}

/// Development sender: writes the code to the log instead of texting it.
#[derive(Debug, Default)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send_code(&self, phone: &str, code: &str) -> Result<()> {
        info!("[DEV] OTP for {phone}: {code}");
        Ok(())
    }
}
