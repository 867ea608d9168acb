use serde::{Deserialize, Serialize};

use crate::slides::{paginate, sectionize, Section, PAGE_SIZE};

/// Structured reply of the `json` analysis mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnalysis {
    pub overall_impression: String,
    pub mood: String,
    pub style_tags: Vec<String>,
    pub disclaimer: String,
}

impl FaceAnalysis {
    pub const PARSE_ERROR: &'static str = "json_parse_error";

    /// Returned in place of a reply the model did not format as requested.
    pub fn parse_error() -> Self {
        Self {
            overall_impression: String::new(),
            mood: String::new(),
            style_tags: Vec::new(),
            disclaimer: Self::PARSE_ERROR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisMode {
    #[default]
    Json,
    Prose,
}

impl AnalysisMode {
    pub const HEADER: &'static str = "x-analyze-mode";

    /// Picks the first mode given, in query, form field, header order.
    /// Anything other than `prose` means `json`.
    pub fn resolve(query: Option<&str>, field: Option<&str>, header: Option<&str>) -> Self {
        let requested = [query, field, header]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty());

        match requested {
            Some("prose") => AnalysisMode::Prose,
            _ => AnalysisMode::Json,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ModeQuery {
    pub mode: Option<String>,
}

/// What the dispatcher got back from the model.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Structured(FaceAnalysis),
    Narrative(String),
}

/// Body of a `prose` mode response.
#[derive(Debug, Serialize)]
pub struct ProseResponse {
    pub text: String,
    pub format: &'static str,
    pub slides: Vec<Vec<Section>>,
}

impl ProseResponse {
    pub fn new(text: String) -> Self {
        let slides = paginate(&sectionize(&text), PAGE_SIZE);
        Self {
            text,
            format: "markdown",
            slides,
        }
    }
}
