use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::Reading;

pub struct ReadingRepository {
    storage: Arc<Storage>,
}

impl ReadingRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl ReadingRepository {
    pub async fn create(
        &self,
        item: &Reading,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO readings (device_id, value, time)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(item.device_id)
        .bind(item.value)
        .bind(item.time)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    // Latest N readings of one device, oldest first
    pub async fn find_latest_by_device_id(
        &self,
        device_id: i32,
        limit: i64,
    ) -> Result<Vec<Reading>, Error> {
        let mut readings: Vec<Reading> = sqlx::query_as(
            r#"
            SELECT * FROM readings
            WHERE device_id = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(device_id)
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        readings.reverse();

        Ok(readings)
    }

    // Latest N readings of every device, grouped by device and oldest first
    pub async fn find_window(&self, limit: i64) -> Result<Vec<Reading>, Error> {
        let readings: Vec<Reading> = sqlx::query_as(
            r#"
            SELECT id, device_id, value, time FROM (
                SELECT *, ROW_NUMBER() OVER (PARTITION BY device_id ORDER BY id DESC) AS position
                FROM readings
            )
            WHERE position <= $1
            ORDER BY device_id, id
            "#,
        )
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(readings)
    }

    pub async fn count_by_device_id(&self, device_id: i32) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM readings WHERE device_id = $1")
            .bind(device_id)
            .fetch_one(self.storage.get_pool())
            .await?;

        Ok(count)
    }

    // Drop everything but the latest `keep` readings of a device
    pub async fn prune_by_device_id(
        &self,
        device_id: i32,
        keep: i64,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM readings
            WHERE device_id = $1 AND id NOT IN (
                SELECT id FROM readings WHERE device_id = $1 ORDER BY id DESC LIMIT $2
            )
            "#,
        )
        .bind(device_id)
        .bind(keep)
        .execute(&mut **transaction)
        .await?
        .rows_affected();

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{create_test_device, create_test_patient, create_test_reading, setup_test_storage};

    use super::*;

    #[tokio::test]
    async fn test_find_latest_is_oldest_first() {
        let storage = setup_test_storage().await;
        let patient = create_test_patient(storage.clone(), "Alice").await;
        let device = create_test_device(storage.clone(), patient.id, "Heart Rate Sensor", 100.0).await;

        for value in [70.0, 71.0, 72.0, 73.0] {
            create_test_reading(storage.clone(), device.id, value).await;
        }

        let repo = ReadingRepository::new(storage.clone());
        let values: Vec<f64> = repo
            .find_latest_by_device_id(device.id, 3)
            .await
            .unwrap()
            .iter()
            .map(|r| r.value)
            .collect();

        assert_eq!(values, vec![71.0, 72.0, 73.0]);
    }

    #[tokio::test]
    async fn test_find_window_limits_each_device() {
        let storage = setup_test_storage().await;
        let patient = create_test_patient(storage.clone(), "Alice").await;
        let heart = create_test_device(storage.clone(), patient.id, "Heart Rate Sensor", 100.0).await;
        let temperature = create_test_device(storage.clone(), patient.id, "Temperature Sensor", 100.0).await;

        for value in [70.0, 71.0, 72.0] {
            create_test_reading(storage.clone(), heart.id, value).await;
        }
        create_test_reading(storage.clone(), temperature.id, 98.6).await;

        let repo = ReadingRepository::new(storage.clone());
        let window = repo.find_window(2).await.unwrap();

        let heart_values: Vec<f64> = window.iter().filter(|r| r.device_id == heart.id).map(|r| r.value).collect();
        let temperature_values: Vec<f64> = window.iter().filter(|r| r.device_id == temperature.id).map(|r| r.value).collect();

        assert_eq!(heart_values, vec![71.0, 72.0]);
        assert_eq!(temperature_values, vec![98.6]);
    }

    #[tokio::test]
    async fn test_prune_keeps_latest() {
        let storage = setup_test_storage().await;
        let patient = create_test_patient(storage.clone(), "Alice").await;
        let device = create_test_device(storage.clone(), patient.id, "Heart Rate Sensor", 100.0).await;

        for value in [70.0, 71.0, 72.0, 73.0, 74.0] {
            create_test_reading(storage.clone(), device.id, value).await;
        }

        let repo = ReadingRepository::new(storage.clone());
        let mut tx = storage.get_pool().begin().await.unwrap();
        let deleted = repo.prune_by_device_id(device.id, 2, &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(deleted, 3);
        assert_eq!(repo.count_by_device_id(device.id).await.unwrap(), 2);

        let values: Vec<f64> = repo
            .find_latest_by_device_id(device.id, 10)
            .await
            .unwrap()
            .iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec![73.0, 74.0]);
    }
}
