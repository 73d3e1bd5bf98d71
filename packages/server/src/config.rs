use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::kernel::pii::{AzureOpenAICredentials, DEFAULT_DEPLOYMENT};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub azure_openai_endpoint: Option<String>,
    pub azure_openai_api_key: Option<String>,
    pub azure_openai_deployment: String,
    pub classifier_timeout: Duration,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            azure_openai_endpoint: non_blank_var("AZURE_OPENAI_ENDPOINT"),
            azure_openai_api_key: non_blank_var("AZURE_OPENAI_API_KEY"),
            azure_openai_deployment: non_blank_var("AZURE_OPENAI_DEPLOYMENT")
                .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
            classifier_timeout: Duration::from_secs(
                env::var("CLASSIFIER_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .context("CLASSIFIER_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }

    /// Default classifier credentials, when both endpoint and key are set.
    pub fn azure_openai_credentials(&self) -> Option<AzureOpenAICredentials> {
        match (&self.azure_openai_endpoint, &self.azure_openai_api_key) {
            (Some(endpoint), Some(api_key)) => Some(AzureOpenAICredentials::new(
                endpoint.clone(),
                api_key.clone(),
                Some(self.azure_openai_deployment.clone()),
            )),
            _ => None,
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_url: "postgres://localhost/pii".to_string(),
            port: 8080,
            database_max_connections: 10,
            azure_openai_endpoint: None,
            azure_openai_api_key: None,
            azure_openai_deployment: DEFAULT_DEPLOYMENT.to_string(),
            classifier_timeout: Duration::from_secs(15),
            allowed_origins: Vec::new(),
        }
    }

    #[test]
    fn test_parse_origins() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins("*").is_empty());
        assert_eq!(
            parse_origins(" https://a.example , ,https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_credentials_need_endpoint_and_key() {
        let mut cfg = config();
        assert!(cfg.azure_openai_credentials().is_none());

        cfg.azure_openai_endpoint = Some("https://res.openai.azure.com".to_string());
        assert!(cfg.azure_openai_credentials().is_none());

        cfg.azure_openai_api_key = Some("key".to_string());
        let creds = cfg.azure_openai_credentials().unwrap();
        assert_eq!(creds.endpoint, "https://res.openai.azure.com");
        assert_eq!(creds.deployment.as_deref(), Some(DEFAULT_DEPLOYMENT));
    }
}
