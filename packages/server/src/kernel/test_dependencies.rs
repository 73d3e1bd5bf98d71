// Test doubles for the kernel traits
//
// Provides in-memory services that can be injected into PiiService and the
// HTTP router for tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseHealthClassifier, BaseSubmissionStore};
use crate::common::pii::{terms_to_detections, Detection, NewClassification, PiiType};
use crate::common::{ClassificationId, SubmissionId};
use crate::domains::submissions::{Classification, Submission, SubmissionWithClassifications};

// =============================================================================
// Mock Health Classifier
// =============================================================================

/// Classifier that "finds" a fixed list of terms wherever they occur.
pub struct MockHealthClassifier {
    terms: Vec<String>,
    fail: bool,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockHealthClassifier {
    pub fn with_terms(terms: &[&str]) -> Self {
        Self {
            terms: terms.iter().map(|t| t.to_string()).collect(),
            fail: false,
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Classifier whose every call errors.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_terms(&[])
        }
    }

    /// Sleep before answering (to exercise timeouts).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all texts that were sent to the classifier
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseHealthClassifier for MockHealthClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<Detection>> {
        self.calls.lock().unwrap().push(text.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            anyhow::bail!("mock classifier failure");
        }

        Ok(terms_to_detections(text, &self.terms))
    }
}

// =============================================================================
// In-memory Submission Store
// =============================================================================

#[derive(Default)]
pub struct InMemorySubmissionStore {
    submissions: Arc<Mutex<Vec<SubmissionWithClassifications>>>,
    fail_writes: bool,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects every write, like an unreachable database.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<SubmissionWithClassifications> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseSubmissionStore for InMemorySubmissionStore {
    async fn save_submission(
        &self,
        tokenized_text: &str,
        classifications: &[NewClassification],
    ) -> Result<SubmissionWithClassifications> {
        if self.fail_writes {
            anyhow::bail!("storage unavailable");
        }

        let submission = Submission {
            id: SubmissionId::new(),
            tokenized_text: tokenized_text.to_string(),
            submitted_at: Utc::now(),
        };
        let classifications = classifications
            .iter()
            .map(|c| Classification {
                id: ClassificationId::new(),
                token: c.token.clone(),
                original_value: c.original_value.clone(),
                tag: c.tag.as_str().to_string(),
                submission_id: submission.id,
            })
            .collect();

        let saved = SubmissionWithClassifications {
            submission,
            classifications,
        };
        self.submissions.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn find_submission(
        &self,
        id: SubmissionId,
    ) -> Result<Option<SubmissionWithClassifications>> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.submission.id == id)
            .cloned())
    }

    async fn count_by_tag(&self, tag: PiiType) -> Result<i64> {
        let count = self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .flat_map(|s| s.classifications.iter())
            .filter(|c| c.tag == tag.as_str())
            .count();
        Ok(count as i64)
    }

    async fn ping(&self) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("storage unavailable");
        }
        Ok(())
    }
}
