use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use vitalsync_api::{HealthSummaryResponse, SummarySource};

use super::Table;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct HealthSummary {
    pub id: i32,
    pub patient_id: i32,
    pub summary_text: String,
    pub source: String,
    pub created_at: OffsetDateTime,
}

impl From<HealthSummary> for HealthSummaryResponse {
    fn from(summary: HealthSummary) -> Self {
        HealthSummaryResponse {
            patient_id: summary.patient_id,
            summary_text: summary.summary_text,
            source: SummarySource::from(summary.source),
            created_at: summary.created_at,
        }
    }
}

#[derive(Clone)]
pub struct HealthSummaryTable;

impl Table for HealthSummaryTable {
    fn name(&self) -> &'static str {
        "health_summaries"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS health_summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL,
                summary_text TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT 'rule',
                created_at TIMESTAMP NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES patients (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS health_summaries;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["patients"]
    }
}
