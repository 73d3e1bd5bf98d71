//! Health term detection through a chat-completion model
//!
//! The model only names terms; it never reports positions. Every term it
//! returns is reduced to the exact literal spans found in the input, so
//! downstream code treats these detections like pattern matches.

use std::collections::HashSet;

use anyhow::{Context, Result};
use openai_client::{strip_code_blocks, ChatRequest, Message, OpenAIClient};
use regex::RegexBuilder;
use serde::Deserialize;

use super::detector::{Detection, PiiType, Utf16Cursor};

/// Reply budget for one classification call.
pub const MAX_RESPONSE_TOKENS: u32 = 200;

pub const CLASSIFIER_TEMPERATURE: f32 = 0.1;

/// System prompt for health term extraction
const HEALTH_DETECTION_PROMPT: &str = r#"You are a medical data classifier. Analyze the given text and identify any specific mentions of health conditions, diseases, symptoms, or medical information that could be considered personally identifiable health information (PHI).

Return a JSON response with this structure:
{
  "detections": [
    {
      "term": "string - the exact health/medical term found in the text"
    }
  ]
}

Only include the actual health/medical terms found, copied exactly as they appear in the text. Return an empty array if no health data is found."#;

/// Top-level object the model is asked to return.
#[derive(Debug, Deserialize)]
struct HealthDetectionResponse {
    #[serde(default, alias = "Detections")]
    detections: Option<Vec<serde_json::Value>>,
}

/// Build the completion request for `text`.
pub fn build_request(text: &str, model: &str) -> ChatRequest {
    ChatRequest::new(model)
        .message(Message::system(HEALTH_DETECTION_PROMPT))
        .message(Message::user(format!(
            "Find health/medical information in this text: \"{}\"",
            text
        )))
        .temperature(CLASSIFIER_TEMPERATURE)
        .max_tokens(MAX_RESPONSE_TOKENS)
        .json_object()
}

/// Pull the candidate terms out of the model's reply.
///
/// Items without a usable `term` are skipped; a reply that is not a JSON
/// object at all is an error.
pub fn parse_terms(content: &str) -> Result<Vec<String>> {
    let response: HealthDetectionResponse = serde_json::from_str(strip_code_blocks(content))
        .context("classifier reply is not the expected JSON object")?;

    let terms = response
        .detections
        .unwrap_or_default()
        .iter()
        .filter_map(|item| item.get("term").or_else(|| item.get("Term")))
        .filter_map(|term| term.as_str())
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect();

    Ok(terms)
}

/// Every case-insensitive literal occurrence of `term` in `text`.
pub fn locate_term(text: &str, term: &str) -> Vec<Detection> {
    let pattern = match RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::warn!(error = %e, term_len = term.len(), "Unsearchable health term skipped");
            return Vec::new();
        }
    };

    let mut cursor = Utf16Cursor::new(text);
    pattern
        .find_iter(text)
        .map(|mat| cursor.detection(PiiType::Health, mat.start(), mat.end()))
        .collect()
}

/// Map classifier terms onto spans of `text`.
///
/// Terms that differ only in case locate the same spans, so they are
/// searched once.
pub fn terms_to_detections(text: &str, terms: &[String]) -> Vec<Detection> {
    let mut seen = HashSet::new();
    let mut detections = Vec::new();

    for term in terms {
        if !seen.insert(term.to_lowercase()) {
            continue;
        }
        let found = locate_term(text, term);
        tracing::debug!(occurrences = found.len(), "Located health term");
        detections.extend(found);
    }

    detections
}

/// Ask the model for health terms in `text` and locate them.
///
/// Errors are returned to the caller; the kernel decides to degrade.
pub async fn detect_health_terms(text: &str, client: &OpenAIClient) -> Result<Vec<Detection>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let model = client.deployment().unwrap_or("gpt-35-turbo").to_string();
    let response = client
        .chat_completion(build_request(text, &model))
        .await
        .context("health classification request failed")?;

    let terms = parse_terms(&response.content)?;
    tracing::debug!(terms = terms.len(), "Classifier returned health terms");

    Ok(terms_to_detections(text, &terms))
}
