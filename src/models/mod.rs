pub mod analysis;
pub mod otp_request;
pub mod upload_event;
pub mod user;
