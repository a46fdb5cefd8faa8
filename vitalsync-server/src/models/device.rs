use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use vitalsync_api::DeviceCategory;

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i32,
    pub patient_id: i32,
    pub name: String,
    pub category: String,
    /// Battery level in percent
    pub battery: f64,
    /// Last time the battery lost a percent, none until the first decrement
    pub battery_decremented_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl Device {
    pub fn category(&self) -> DeviceCategory {
        DeviceCategory::from(self.category.clone())
    }
}

#[derive(Clone)]
pub struct DeviceTable;

impl Table for DeviceTable {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                battery REAL NOT NULL DEFAULT 100 CHECK (battery >= 0 AND battery <= 100),
                battery_decremented_at TIMESTAMP,
                created_at TIMESTAMP NOT NULL,
                FOREIGN KEY (patient_id) REFERENCES patients (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS devices;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["patients"]
    }
}
