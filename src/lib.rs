//! Phone OTP login, photo upload and vision-model analysis.
//!
//! Users prove ownership of a phone number with a one-time code, receive a
//! signed session token, then upload a photo that is forwarded to a vision
//! model. The reply comes back either as a structured object or as Markdown
//! split into titled sections and grouped into slides.

pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod service;
pub mod slides;
pub mod state;
pub mod utils;

pub use config::routes::routes;
pub use error::ApiError;
pub use state::AppState;
