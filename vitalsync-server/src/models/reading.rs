use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use vitalsync_api::ReadingPoint;

use super::Table;

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i32,
    pub device_id: i32,
    pub value: f64,
    /// The time of the reading
    pub time: OffsetDateTime,
}

impl From<&Reading> for ReadingPoint {
    fn from(reading: &Reading) -> Self {
        ReadingPoint {
            time: reading.time.unix_timestamp(),
            value: reading.value,
        }
    }
}

#[derive(Clone)]
pub struct ReadingTable;

impl Table for ReadingTable {
    fn name(&self) -> &'static str {
        "readings"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id INTEGER NOT NULL,
                value REAL NOT NULL,
                time TIMESTAMP NOT NULL,
                FOREIGN KEY (device_id) REFERENCES devices (id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS readings_device_id_index ON readings (device_id, id);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS readings;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["devices"]
    }
}
