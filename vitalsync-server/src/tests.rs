//! Fixtures shared by unit and integration tests.

use std::sync::Arc;

use time::OffsetDateTime;
use vitalsync_api::DeviceCategory;

use crate::configs::{Database, SchemaManager, Storage};
use crate::models::{Device, Patient, Reading};
use crate::repositories::{DeviceRepository, PatientRepository, ReadingRepository};

pub async fn setup_test_storage() -> Arc<Storage> {
    Arc::new(
        Storage::new(
            Database {
                migration_path: None,
                clean_start: true,
                url: String::from("sqlite::memory:"),
            },
            SchemaManager::default(),
        )
        .await
        .unwrap(),
    )
}

pub async fn create_test_patient(storage: Arc<Storage>, name: &str) -> Patient {
    let repo = PatientRepository::new(storage.clone());
    let patient = Patient {
        id: 0,
        name: name.to_string(),
        created_at: OffsetDateTime::now_utc(),
    };

    let mut tx = storage.get_pool().begin().await.unwrap();
    let id = repo.create(&patient, &mut tx).await.unwrap();
    tx.commit().await.unwrap();

    repo.find_by_id(id).await.unwrap().unwrap()
}

pub async fn create_test_device(
    storage: Arc<Storage>,
    patient_id: i32,
    name: &str,
    battery: f64,
) -> Device {
    let repo = DeviceRepository::new(storage.clone());
    let device = Device {
        id: 0,
        patient_id,
        name: name.to_string(),
        category: DeviceCategory::from_name(name).to_string(),
        battery,
        battery_decremented_at: None,
        created_at: OffsetDateTime::now_utc(),
    };

    let mut tx = storage.get_pool().begin().await.unwrap();
    let id = repo.create(&device, &mut tx).await.unwrap();
    tx.commit().await.unwrap();

    repo.find_by_id(id).await.unwrap().unwrap()
}

pub async fn create_test_reading(storage: Arc<Storage>, device_id: i32, value: f64) -> Reading {
    let repo = ReadingRepository::new(storage.clone());
    let reading = Reading {
        id: 0,
        device_id,
        value,
        time: OffsetDateTime::now_utc(),
    };

    let mut tx = storage.get_pool().begin().await.unwrap();
    let id = repo.create(&reading, &mut tx).await.unwrap();
    tx.commit().await.unwrap();

    Reading { id, ..reading }
}
