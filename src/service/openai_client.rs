use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, instrument};

use crate::error::ApiError;

/// One image plus instructions for the vision model.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    pub image_url: String,
    /// JSON schema the reply must follow; `None` asks for free text.
    pub schema: Option<(&'static str, Value)>,
}

impl ModelRequest {
    /// Body for the Responses API.
    pub fn to_body(&self, model: &str) -> Value {
        let mut body = json!({
            "model": model,
            "input": [{
                "role": "user",
                "content": [
                    { "type": "input_text", "text": self.prompt },
                    { "type": "input_image", "image_url": self.image_url }
                ]
            }]
        });

        if let Some((name, schema)) = &self.schema {
            body["text"] = json!({
                "format": {
                    "type": "json_schema",
                    "name": name,
                    "schema": schema
                }
            });
        }
        body
    }
}

/// Pulls the reply text out of a Responses API envelope.
///
/// Looks for the first `output_text` or `summary_text` part of the first
/// output item, then the top level `output_text`, then the first part's text.
pub fn extract_output_text(response: &Value) -> String {
    let content = response["output"][0]["content"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default();

    content
        .iter()
        .find(|part| matches!(part["type"].as_str(), Some("output_text" | "summary_text")))
        .and_then(|part| part["text"].as_str())
        .or_else(|| response["output_text"].as_str())
        .or_else(|| content.first().and_then(|part| part["text"].as_str()))
        .unwrap_or_default()
        .to_string()
}

/// The external vision/language model.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Whether a credential is available to call the model at all.
    fn is_configured(&self) -> bool;

    /// Sends one request and returns the raw response envelope. Non-success
    /// statuses are errors; nothing is retried.
    async fn respond(&self, request: &ModelRequest) -> Result<Value, ApiError>;
}

pub struct OpenAiVisionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiVisionClient {
    pub fn new(base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl VisionModel for OpenAiVisionClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn respond(&self, request: &ModelRequest) -> Result<Value, ApiError> {
        let api_key = self.api_key.as_deref().ok_or(ApiError::Configuration)?;

        let response = self
            .http
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(api_key)
            .json(&request.to_body(&self.model))
            .send()
            .await
            .map_err(|e| ApiError::Analysis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "OpenAI error");
            return Err(ApiError::Analysis(format!("model returned {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Analysis(format!("unreadable response: {e}")))
    }
}
