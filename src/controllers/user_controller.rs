use actix_web::{web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{SendOtpRequest, VerifyOtpRequest};
use crate::state::AppState;
use crate::utils::phone::normalize_phone;

fn validate<T: Validate>(request: &T) -> Result<(), ApiError> {
    request.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|err| err.message.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "Invalid request".to_string());
        ApiError::Validation(message)
    })
}

pub async fn send_otp(
    state: web::Data<AppState>,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    validate(&*request)?;
    let phone = normalize_phone(&request.phone);
    if phone.is_empty() {
        return Err(ApiError::validation("Phone number required"));
    }

    state.otp.issue(&phone).await?;

    Ok(HttpResponse::Ok().json(json!({
        "ok": true,
        "message": "Verification code sent"
    })))
}

pub async fn verify_otp(
    state: web::Data<AppState>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    validate(&*request)?;
    let phone = normalize_phone(&request.phone);
    let code = request.code.trim();

    state.otp.verify(&phone, code).await?;

    let user = state.users.find_or_create_by_phone(&phone).await?;
    let token = state.tokens.issue(&user)?;

    Ok(HttpResponse::Ok().json(json!({
        "token": token,
        "message": "Login successful"
    })))
}

pub async fn profile(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .users
        .get_user_by_id(auth.id())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Hello {}, welcome to your profile page!", user.display_name()),
        "user": user,
    })))
}
