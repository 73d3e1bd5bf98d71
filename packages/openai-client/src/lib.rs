//! Pure chat-completions REST client
//!
//! A small client for the OpenAI chat completions API with no domain-specific
//! logic. The same client speaks to Azure OpenAI deployments, which differ
//! only in URL layout and authentication header.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, ChatRequest, Message};
//!
//! let client = OpenAIClient::azure("https://my-resource.openai.azure.com", key, "gpt-35-turbo")
//!     .with_timeout(std::time::Duration::from_secs(10))?;
//!
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new("gpt-35-turbo")
//!             .message(Message::system("Reply in JSON"))
//!             .message(Message::user("Hello!"))
//!             .json_object(),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

/// Azure API version used when none is configured.
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Flavor {
    OpenAI,
    Azure {
        deployment: String,
        api_version: String,
    },
}

/// Chat completions client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    flavor: Flavor,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            flavor: Flavor::OpenAI,
        }
    }

    /// Create a client bound to one Azure OpenAI deployment.
    ///
    /// Trailing slashes on the endpoint are ignored.
    pub fn azure(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into();
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: endpoint.trim_end_matches('/').to_string(),
            flavor: Flavor::Azure {
                deployment: deployment.into(),
                api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            },
        }
    }

    /// Set a custom base URL (for proxies, mock servers, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the Azure `api-version` query parameter. No-op for OpenAI.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        if let Flavor::Azure { api_version, .. } = &mut self.flavor {
            *api_version = version.into();
        }
        self
    }

    /// Bound every request made by this client to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpenAIError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Azure deployment name, if this is an Azure client.
    pub fn deployment(&self) -> Option<&str> {
        match &self.flavor {
            Flavor::OpenAI => None,
            Flavor::Azure { deployment, .. } => Some(deployment),
        }
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        match &self.flavor {
            Flavor::OpenAI => format!("{}/chat/completions", self.base_url),
            Flavor::Azure {
                deployment,
                api_version,
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, deployment, api_version
            ),
        }
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and return the content of
    /// the first choice.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let builder = self
            .http_client
            .post(self.completions_url())
            .header("Content-Type", "application/json");
        let builder = match self.flavor {
            Flavor::OpenAI => builder.header("Authorization", format!("Bearer {}", self.api_key)),
            Flavor::Azure { .. } => builder.header("api-key", &self.api_key),
        };

        let response = builder.json(&request).send().await.map_err(|e| {
            warn!(error = %e, "Chat completion request failed");
            OpenAIError::from_reqwest(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Chat completion API error");
            return Err(OpenAIError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body = response.text().await.map_err(OpenAIError::from_reqwest)?;
        let chat_response: types::ChatResponseRaw = serde_json::from_str(&body)
            .map_err(|e| OpenAIError::Parse(format!("Invalid completion body: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| OpenAIError::Parse("No choices in completion".into()))?
            .message
            .content
            .ok_or_else(|| OpenAIError::Parse("Empty message content".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
        })
    }
}
