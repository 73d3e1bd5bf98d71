use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::common::pii::Detection;
use crate::kernel::AzureOpenAICredentials;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// Body shared by detect and submit.
#[derive(Debug, Deserialize)]
pub struct PiiRequest {
    #[serde(alias = "Text")]
    pub text: String,
    /// Per-call classifier credentials; blank values fall back to the server default.
    #[serde(default, rename = "azureOpenAI", alias = "AzureOpenAI")]
    pub azure_openai: Option<AzureOpenAICredentials>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub tokenized_text: String,
}

/// POST /api/detect-pii
///
/// Returns every candidate detection with offsets into the submitted text.
/// Nothing is stored.
pub async fn detect_pii_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<PiiRequest>,
) -> Json<Vec<Detection>> {
    let classifier = state.pii.classifier_for(request.azure_openai.as_ref());
    let detections = state.pii.detect(&request.text, classifier.as_deref()).await;

    Json(detections)
}

/// POST /api/submit
///
/// Tokenizes the text and records the substitutions. Fails only when the
/// submission cannot be persisted.
pub async fn submit_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<PiiRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let classifier = state.pii.classifier_for(request.azure_openai.as_ref());
    let outcome = state
        .pii
        .submit(&request.text, classifier.as_deref())
        .await
        .map_err(ApiError::Persistence)?;

    Ok(Json(SubmitResponse {
        tokenized_text: outcome.tokenized_text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_pascal_case() {
        let request: PiiRequest = serde_json::from_str(
            r#"{"Text":"hi","AzureOpenAI":{"Endpoint":"https://x","ApiKey":"k"}}"#,
        )
        .unwrap();

        assert_eq!(request.text, "hi");
        let creds = request.azure_openai.unwrap();
        assert_eq!(creds.endpoint, "https://x");
        assert_eq!(creds.api_key, "k");
    }

    #[test]
    fn test_request_requires_text() {
        assert!(serde_json::from_str::<PiiRequest>(r#"{"azureOpenAI":null}"#).is_err());
    }
}
