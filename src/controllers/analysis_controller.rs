use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::TryStreamExt;
use tracing::debug;

use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::analysis::{AnalysisMode, AnalysisOutcome, ModeQuery, ProseResponse};
use crate::service::analysis_service::Photo;
use crate::state::AppState;

const PHOTO_FIELD: &str = "photo";
const MODE_FIELD: &str = "mode";
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";
/// Upper bound for the short text fields of the form.
const MAX_TEXT_FIELD: usize = 64;

#[derive(Debug, Default)]
struct AnalyzeForm {
    photo: Option<Photo>,
    mode: Option<String>,
}

fn multipart_error(err: actix_multipart::MultipartError) -> ApiError {
    ApiError::validation(format!("Invalid upload: {err}"))
}

/// Reads the multipart body, refusing photos above `max_bytes` as soon as the
/// limit is crossed.
async fn read_form(mut payload: Multipart, max_bytes: usize) -> Result<AnalyzeForm, ApiError> {
    let mut form = AnalyzeForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            PHOTO_FIELD => {
                let content_type = field
                    .content_type()
                    .map(|mime| mime.essence_str().to_string())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

                let mut bytes = Vec::new();
                while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(ApiError::PayloadTooLarge {
                            limit_mb: max_bytes / (1024 * 1024),
                        });
                    }
                    bytes.extend_from_slice(&chunk);
                }

                if !bytes.is_empty() {
                    form.photo = Some(Photo {
                        bytes,
                        content_type,
                    });
                }
            }
            MODE_FIELD => {
                let mut value = Vec::new();
                while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
                    if value.len() + chunk.len() <= MAX_TEXT_FIELD {
                        value.extend_from_slice(&chunk);
                    }
                }
                form.mode = Some(String::from_utf8_lossy(&value).into_owned());
            }
            other => {
                debug!(field = other, "Skipping unknown form field");
                while field.try_next().await.map_err(multipart_error)?.is_some() {}
            }
        }
    }

    Ok(form)
}

pub async fn analyze(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<ModeQuery>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    state.analysis.ensure_configured()?;

    let form = read_form(payload, state.limits.max_upload_bytes).await?;
    let photo = form
        .photo
        .ok_or_else(|| ApiError::validation("Photo required"))?;

    let header = req
        .headers()
        .get(AnalysisMode::HEADER)
        .and_then(|value| value.to_str().ok());
    let mode = AnalysisMode::resolve(query.mode.as_deref(), form.mode.as_deref(), header);

    match state.analysis.analyze(auth.id(), &photo, mode).await? {
        AnalysisOutcome::Structured(analysis) => Ok(HttpResponse::Ok().json(analysis)),
        AnalysisOutcome::Narrative(text) => Ok(HttpResponse::Ok().json(ProseResponse::new(text))),
    }
}
