use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::HealthSummary;

pub struct HealthSummaryRepository {
    storage: Arc<Storage>,
}

impl HealthSummaryRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl HealthSummaryRepository {
    pub async fn create(
        &self,
        item: &HealthSummary,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO health_summaries (patient_id, summary_text, source, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(item.patient_id)
        .bind(&item.summary_text)
        .bind(&item.source)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_latest_by_patient_id(
        &self,
        patient_id: i32,
    ) -> Result<Option<HealthSummary>, Error> {
        let summary: Option<HealthSummary> = sqlx::query_as(
            r#"
            SELECT * FROM health_summaries
            WHERE patient_id = $1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(patient_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::tests::{create_test_patient, setup_test_storage};

    use super::*;

    #[tokio::test]
    async fn test_find_latest_summary() {
        let storage = setup_test_storage().await;
        let patient = create_test_patient(storage.clone(), "Alice").await;
        let repo = HealthSummaryRepository::new(storage.clone());

        assert!(repo.find_latest_by_patient_id(patient.id).await.unwrap().is_none());

        let mut tx = storage.get_pool().begin().await.unwrap();
        for text in ["Alice: Low heart rate.", "Alice: Vitals stable."] {
            let summary = HealthSummary {
                id: 0,
                patient_id: patient.id,
                summary_text: text.to_string(),
                source: "rule".to_string(),
                created_at: OffsetDateTime::now_utc(),
            };
            repo.create(&summary, &mut tx).await.unwrap();
        }
        tx.commit().await.unwrap();

        let latest = repo.find_latest_by_patient_id(patient.id).await.unwrap().unwrap();
        assert_eq!(latest.summary_text, "Alice: Vitals stable.");
        assert_eq!(latest.source, "rule");
    }
}
