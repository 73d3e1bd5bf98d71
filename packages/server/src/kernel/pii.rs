// Health classifier implementations

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use openai_client::OpenAIClient;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::common::pii::{detect_health_terms, Detection};
use crate::kernel::traits::BaseHealthClassifier;

/// Deployment used when credentials do not name one.
pub const DEFAULT_DEPLOYMENT: &str = "gpt-35-turbo";

lazy_static! {
    static ref TRAILING_API_PATH: Regex = Regex::new(r"/openai/v\d+/*$").unwrap();
}

// =============================================================================
// Credentials
// =============================================================================

/// Azure OpenAI connection details, either configured at start-up or sent
/// with an individual request.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureOpenAICredentials {
    #[serde(alias = "Endpoint")]
    pub endpoint: String,
    #[serde(alias = "ApiKey")]
    pub api_key: String,
    #[serde(default, alias = "Deployment")]
    pub deployment: Option<String>,
}

impl fmt::Debug for AzureOpenAICredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAICredentials")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .finish()
    }
}

impl AzureOpenAICredentials {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: Option<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment,
        }
    }

    /// Cleaned-up copy, or `None` when endpoint or key is blank.
    pub fn normalized(&self) -> Option<Self> {
        let endpoint = normalize_endpoint(&self.endpoint);
        let api_key = self.api_key.trim();
        if endpoint.is_empty() || api_key.is_empty() {
            return None;
        }

        let deployment = self
            .deployment
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DEPLOYMENT);

        Some(Self {
            endpoint,
            api_key: api_key.to_string(),
            deployment: Some(deployment.to_string()),
        })
    }
}

/// Strip whitespace, a pasted `/openai/v1` suffix and trailing slashes.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    TRAILING_API_PATH
        .replace(trimmed, "")
        .trim_end_matches('/')
        .to_string()
}

// =============================================================================
// Azure OpenAI Health Classifier
// =============================================================================

/// Health term classifier backed by an Azure OpenAI chat deployment.
pub struct AzureHealthClassifier {
    client: OpenAIClient,
}

impl AzureHealthClassifier {
    pub fn new(client: OpenAIClient) -> Self {
        Self { client }
    }

    /// Build a classifier whose every request is bounded by `timeout`.
    ///
    /// Credentials are normalised first; blank ones are rejected.
    pub fn from_credentials(credentials: &AzureOpenAICredentials, timeout: Duration) -> Result<Self> {
        let credentials = credentials
            .normalized()
            .context("Azure OpenAI endpoint and API key are required")?;
        let deployment = credentials
            .deployment
            .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string());

        let client = OpenAIClient::azure(credentials.endpoint, credentials.api_key, deployment)
            .with_timeout(timeout)
            .context("Failed to build Azure OpenAI client")?;

        Ok(Self::new(client))
    }

    pub fn deployment(&self) -> Option<&str> {
        self.client.deployment()
    }
}

#[async_trait]
impl BaseHealthClassifier for AzureHealthClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<Detection>> {
        detect_health_terms(text, &self.client).await
    }
}

// =============================================================================
// Factory function
// =============================================================================

/// Create the process-wide default classifier, if credentials are configured.
pub fn create_health_classifier(
    credentials: Option<&AzureOpenAICredentials>,
    timeout: Duration,
) -> Option<Arc<dyn BaseHealthClassifier>> {
    let Some(credentials) = credentials.and_then(AzureOpenAICredentials::normalized) else {
        tracing::info!("Azure OpenAI credentials not provided - health data detection disabled");
        return None;
    };

    match AzureHealthClassifier::from_credentials(&credentials, timeout) {
        Ok(classifier) => {
            tracing::info!(
                deployment = ?classifier.deployment(),
                "Azure OpenAI configured for health data detection"
            );
            Some(Arc::new(classifier))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create health classifier - health data detection disabled");
            None
        }
    }
}
