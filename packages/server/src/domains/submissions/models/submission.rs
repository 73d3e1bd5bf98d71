use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use super::classification::Classification;
use crate::common::pii::NewClassification;
use crate::common::SubmissionId;

/// One tokenized text as it was submitted. Never updated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Submission {
    pub id: SubmissionId,
    pub tokenized_text: String,
    pub submitted_at: DateTime<Utc>,
}

/// A submission together with the classifications it owns.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionWithClassifications {
    pub submission: Submission,
    pub classifications: Vec<Classification>,
}

// =============================================================================
// Submission Queries
// =============================================================================

impl Submission {
    pub async fn create<'e, E: PgExecutor<'e>>(tokenized_text: &str, executor: E) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO submissions (id, tokenized_text)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(SubmissionId::new())
        .bind(tokenized_text)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: SubmissionId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert a submission and all of its classifications atomically.
    ///
    /// Either every row is committed or none is.
    pub async fn create_with_classifications(
        tokenized_text: &str,
        classifications: &[NewClassification],
        pool: &PgPool,
    ) -> Result<SubmissionWithClassifications> {
        let mut tx = pool.begin().await.context("Failed to open transaction")?;

        let submission = Self::create(tokenized_text, &mut *tx)
            .await
            .context("Failed to insert submission")?;

        let mut saved = Vec::with_capacity(classifications.len());
        for classification in classifications {
            let row = Classification::create(submission.id, classification, &mut *tx)
                .await
                .context("Failed to insert classification")?;
            saved.push(row);
        }

        tx.commit().await.context("Failed to commit submission")?;

        Ok(SubmissionWithClassifications {
            submission,
            classifications: saved,
        })
    }
}
