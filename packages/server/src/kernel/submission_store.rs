// Postgres-backed submission store

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::pii::{NewClassification, PiiType};
use crate::common::SubmissionId;
use crate::domains::submissions::{Classification, Submission, SubmissionWithClassifications};
use crate::kernel::traits::BaseSubmissionStore;

pub struct PostgresSubmissionStore {
    pool: PgPool,
}

impl PostgresSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseSubmissionStore for PostgresSubmissionStore {
    async fn save_submission(
        &self,
        tokenized_text: &str,
        classifications: &[NewClassification],
    ) -> Result<SubmissionWithClassifications> {
        Submission::create_with_classifications(tokenized_text, classifications, &self.pool).await
    }

    async fn find_submission(
        &self,
        id: SubmissionId,
    ) -> Result<Option<SubmissionWithClassifications>> {
        let Some(submission) = Submission::find_by_id(id, &self.pool).await? else {
            return Ok(None);
        };
        let classifications = Classification::find_for_submission(id, &self.pool).await?;

        Ok(Some(SubmissionWithClassifications {
            submission,
            classifications,
        }))
    }

    async fn count_by_tag(&self, tag: PiiType) -> Result<i64> {
        Classification::count_by_tag(tag, &self.pool).await
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
