use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Patient {
    pub id: i32,
    pub name: String,
    pub created_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct PatientTable;

impl Table for PatientTable {
    fn name(&self) -> &'static str {
        "patients"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS patients;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
