// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Detection and tokenization live in common::pii and only use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseHealthClassifier)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::pii::{Detection, NewClassification, PiiType};
use crate::common::SubmissionId;
use crate::domains::submissions::SubmissionWithClassifications;

// =============================================================================
// Health Classifier Trait (Infrastructure - external AI classification)
// =============================================================================

#[async_trait]
pub trait BaseHealthClassifier: Send + Sync {
    /// Health/medical spans in `text`, located by literal search.
    ///
    /// May fail or hang; `PiiService` bounds the call and treats any error
    /// as "no health detections".
    async fn classify(&self, text: &str) -> Result<Vec<Detection>>;
}

// =============================================================================
// Submission Store Trait (Infrastructure - durable audit records)
// =============================================================================

#[async_trait]
pub trait BaseSubmissionStore: Send + Sync {
    /// Persist a tokenized text and its classifications as one unit.
    async fn save_submission(
        &self,
        tokenized_text: &str,
        classifications: &[NewClassification],
    ) -> Result<SubmissionWithClassifications>;

    async fn find_submission(&self, id: SubmissionId)
        -> Result<Option<SubmissionWithClassifications>>;

    /// Number of committed classifications carrying `tag`.
    async fn count_by_tag(&self, tag: PiiType) -> Result<i64>;

    /// Cheap connectivity check for health probes.
    async fn ping(&self) -> Result<()>;
}
