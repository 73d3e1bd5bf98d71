//! Detect / submit / stats pipeline.
//!
//! Each call is independent. The only shared state is the submission store
//! and the optional default classifier, both behind traits.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::common::pii::{aggregate, find_emails, tokenize, Detection, NewClassification, PiiType};
use crate::common::SubmissionId;
use crate::domains::submissions::SubmissionWithClassifications;
use crate::kernel::pii::{AzureHealthClassifier, AzureOpenAICredentials};
use crate::kernel::traits::{BaseHealthClassifier, BaseSubmissionStore};

/// Aggregate counts over every committed classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiiStats {
    pub total_pii_emails: i64,
    pub total_pii_health_data: i64,
}

/// What a successful submit produced.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub submission_id: SubmissionId,
    pub tokenized_text: String,
    pub classifications: Vec<NewClassification>,
}

#[derive(Clone)]
pub struct PiiService {
    store: Arc<dyn BaseSubmissionStore>,
    default_classifier: Option<Arc<dyn BaseHealthClassifier>>,
    classifier_timeout: Duration,
}

impl PiiService {
    pub fn new(
        store: Arc<dyn BaseSubmissionStore>,
        default_classifier: Option<Arc<dyn BaseHealthClassifier>>,
        classifier_timeout: Duration,
    ) -> Self {
        Self {
            store,
            default_classifier,
            classifier_timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn BaseSubmissionStore> {
        &self.store
    }

    pub fn has_default_classifier(&self) -> bool {
        self.default_classifier.is_some()
    }

    /// Pick the classifier for one request.
    ///
    /// Usable per-request credentials get a transient client; otherwise the
    /// default classifier (if any) is reused.
    pub fn classifier_for(
        &self,
        credentials: Option<&AzureOpenAICredentials>,
    ) -> Option<Arc<dyn BaseHealthClassifier>> {
        if let Some(credentials) = credentials.and_then(AzureOpenAICredentials::normalized) {
            match AzureHealthClassifier::from_credentials(&credentials, self.classifier_timeout) {
                Ok(classifier) => return Some(Arc::new(classifier)),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring per-request classifier credentials");
                }
            }
        }
        self.default_classifier.clone()
    }

    /// Health detections for `text`, or none if the classifier is absent,
    /// fails, or exceeds the timeout.
    pub async fn classify_health_terms(
        &self,
        text: &str,
        classifier: Option<&dyn BaseHealthClassifier>,
    ) -> Vec<Detection> {
        let Some(classifier) = classifier else {
            return Vec::new();
        };
        if text.trim().is_empty() {
            return Vec::new();
        }

        match tokio::time::timeout(self.classifier_timeout, classifier.classify(text)).await {
            Ok(Ok(detections)) => detections,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Health classification failed, continuing without it");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.classifier_timeout.as_millis(),
                    "Health classification timed out, continuing without it"
                );
                Vec::new()
            }
        }
    }

    /// All candidate detections, ordered by start offset. Never fails.
    pub async fn detect(
        &self,
        text: &str,
        classifier: Option<&dyn BaseHealthClassifier>,
    ) -> Vec<Detection> {
        let emails = find_emails(text);
        let health = self.classify_health_terms(text, classifier).await;

        tracing::debug!(
            text_len = text.len(),
            emails = emails.len(),
            health = health.len(),
            "Detected sensitive spans"
        );

        aggregate(emails, health)
    }

    /// Tokenize `text` and persist the result in one transaction.
    ///
    /// Only persistence errors are returned.
    pub async fn submit(
        &self,
        text: &str,
        classifier: Option<&dyn BaseHealthClassifier>,
    ) -> Result<SubmitOutcome> {
        let detections = self.detect(text, classifier).await;
        let tokenized = tokenize(text, &detections);

        let saved = self
            .store
            .save_submission(&tokenized.tokenized_text, &tokenized.classifications)
            .await?;

        tracing::info!(
            submission_id = %saved.submission.id,
            classifications = tokenized.classifications.len(),
            "Submission stored"
        );

        Ok(SubmitOutcome {
            submission_id: saved.submission.id,
            tokenized_text: tokenized.tokenized_text,
            classifications: tokenized.classifications,
        })
    }

    pub async fn count_by_tag(&self, tag: PiiType) -> Result<i64> {
        self.store.count_by_tag(tag).await
    }

    pub async fn stats(&self) -> Result<PiiStats> {
        Ok(PiiStats {
            total_pii_emails: self.count_by_tag(PiiType::Email).await?,
            total_pii_health_data: self.count_by_tag(PiiType::Health).await?,
        })
    }

    pub async fn find_submission(
        &self,
        id: SubmissionId,
    ) -> Result<Option<SubmissionWithClassifications>> {
        self.store.find_submission(id).await
    }
}
