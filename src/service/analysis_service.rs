use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::models::analysis::{AnalysisMode, AnalysisOutcome, FaceAnalysis};
use crate::service::openai_client::{extract_output_text, ModelRequest, VisionModel};
use crate::service::prompts::{face_analysis_schema, JSON_PROMPT, JSON_SCHEMA_NAME, PROSE_PROMPT};
use crate::service::quota_service::QuotaService;

pub const EMPTY_PROSE: &str = "The model returned an empty response.";

/// An uploaded photo held in memory.
#[derive(Debug, Clone)]
pub struct Photo {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl Photo {
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Sends photos to the vision model, gated by the daily quota.
pub struct AnalysisService {
    model: Arc<dyn VisionModel>,
    quota: QuotaService,
}

impl AnalysisService {
    pub fn new(model: Arc<dyn VisionModel>, quota: QuotaService) -> Self {
        Self { model, quota }
    }

    pub fn quota(&self) -> &QuotaService {
        &self.quota
    }

    pub fn ensure_configured(&self) -> Result<(), ApiError> {
        if self.model.is_configured() {
            Ok(())
        } else {
            Err(ApiError::Configuration)
        }
    }

    /// Runs one analysis for `user_id`. The quota is checked before the model
    /// is called and only charged once the model has answered.
    #[instrument(skip(self, photo), fields(bytes = photo.bytes.len()))]
    pub async fn analyze(
        &self,
        user_id: i64,
        photo: &Photo,
        mode: AnalysisMode,
    ) -> Result<AnalysisOutcome, ApiError> {
        self.ensure_configured()?;
        self.quota.ensure_available(user_id).await?;

        let image_url = photo.data_url();
        let outcome = match mode {
            AnalysisMode::Json => AnalysisOutcome::Structured(self.describe(image_url).await?),
            AnalysisMode::Prose => AnalysisOutcome::Narrative(self.narrate(image_url).await?),
        };

        self.quota.add_upload(user_id).await?;
        info!(?mode, "Analysis completed");

        Ok(outcome)
    }

    async fn describe(&self, image_url: String) -> Result<FaceAnalysis, ApiError> {
        let request = ModelRequest {
            prompt: JSON_PROMPT.to_string(),
            image_url,
            schema: Some((JSON_SCHEMA_NAME, face_analysis_schema())),
        };
        let response = self.model.respond(&request).await?;
        let raw = extract_output_text(&response);

        match serde_json::from_str::<FaceAnalysis>(&raw) {
            Ok(analysis) => Ok(analysis),
            Err(e) => {
                warn!(error = %e, "Model reply did not match the schema");
                Ok(FaceAnalysis::parse_error())
            }
        }
    }

    async fn narrate(&self, image_url: String) -> Result<String, ApiError> {
        let request = ModelRequest {
            prompt: PROSE_PROMPT.to_string(),
            image_url,
            schema: None,
        };
        let response = self.model.respond(&request).await?;
        let prose = extract_output_text(&response);

        if prose.trim().is_empty() {
            Ok(EMPTY_PROSE.to_string())
        } else {
            Ok(prose)
        }
    }
}
