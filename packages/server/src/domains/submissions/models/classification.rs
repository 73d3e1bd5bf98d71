use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::pii::{NewClassification, PiiType};
use crate::common::{ClassificationId, SubmissionId};

/// Record of one substitution: which token replaced which original value.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Classification {
    pub id: ClassificationId,
    pub token: String,
    pub original_value: String,
    pub tag: String, // "Email" | "Health"
    pub submission_id: SubmissionId,
}

impl Classification {
    pub async fn create<'e, E: PgExecutor<'e>>(
        submission_id: SubmissionId,
        classification: &NewClassification,
        executor: E,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO classifications (id, token, original_value, tag, submission_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(ClassificationId::new())
        .bind(&classification.token)
        .bind(&classification.original_value)
        .bind(classification.tag.as_str())
        .bind(submission_id)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Classifications of a submission in the order they were created.
    pub async fn find_for_submission(submission_id: SubmissionId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM classifications WHERE submission_id = $1 ORDER BY id",
        )
        .bind(submission_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count_by_tag(tag: PiiType, pool: &PgPool) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classifications WHERE tag = $1")
            .bind(tag.as_str())
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub fn pii_type(&self) -> Result<PiiType> {
        self.tag.parse()
    }
}
