use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub phone: String,

    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl User {
    /// Name used when greeting the user.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.phone)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Phone number required"))]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Phone number and code required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Phone number and code required"))]
    pub code: String,
}
