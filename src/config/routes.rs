use actix_web::web;

use crate::controllers::{analysis_controller, user_controller};
use crate::error::ApiError;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(2 * 1024 * 1024)
            .error_handler(|err, _req| ApiError::validation(format!("Invalid JSON body: {err}")).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::validation(format!("Invalid query: {err}")).into()),
    )
    .route("/send-otp", web::post().to(user_controller::send_otp))
    .route("/verify-otp", web::post().to(user_controller::verify_otp))
    .route("/analyze", web::post().to(analysis_controller::analyze))
    .route("/profil", web::get().to(user_controller::profile));
}
