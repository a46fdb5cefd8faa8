use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use vitalsync_api::DeviceCategory;

use crate::configs::Storage;
use crate::models::{Device, Patient, Reading};
use crate::repositories::{DeviceRepository, PatientRepository, ReadingRepository};

struct SeedDevice {
    name: &'static str,
    battery: f64,
    readings: &'static [f64],
}

struct SeedPatient {
    name: &'static str,
    devices: &'static [SeedDevice],
}

const DEMO_PATIENTS: &[SeedPatient] = &[
    SeedPatient {
        name: "Alice",
        devices: &[
            SeedDevice { name: "Heart Rate Sensor", battery: 100.0, readings: &[72.0, 75.0] },
            SeedDevice { name: "Temperature Sensor", battery: 95.0, readings: &[98.6, 99.1] },
        ],
    },
    SeedPatient {
        name: "Bob",
        devices: &[
            SeedDevice { name: "Heart Rate Sensor", battery: 90.0, readings: &[80.0, 78.0] },
            SeedDevice { name: "Temperature Sensor", battery: 85.0, readings: &[97.9, 99.4] },
        ],
    },
];

/// Loads the demo patients into an empty database. Returns whether anything was inserted.
pub async fn seed_if_empty(storage: &Arc<Storage>) -> Result<bool, sqlx::Error> {
    let patient_repository = PatientRepository::new(storage.clone());
    let device_repository = DeviceRepository::new(storage.clone());
    let reading_repository = ReadingRepository::new(storage.clone());

    if patient_repository.count().await? > 0 {
        return Ok(false);
    }

    let now = OffsetDateTime::now_utc();
    let mut tx = storage.get_pool().begin().await?;

    for seed_patient in DEMO_PATIENTS {
        let patient_id = patient_repository
            .create(
                &Patient {
                    id: 0,
                    name: seed_patient.name.to_string(),
                    created_at: now,
                },
                &mut tx,
            )
            .await?;

        for seed_device in seed_patient.devices {
            let device_id = device_repository
                .create(
                    &Device {
                        id: 0,
                        patient_id,
                        name: seed_device.name.to_string(),
                        category: DeviceCategory::from_name(seed_device.name).to_string(),
                        battery: seed_device.battery,
                        battery_decremented_at: None,
                        created_at: now,
                    },
                    &mut tx,
                )
                .await?;

            let count = seed_device.readings.len() as i64;
            for (index, value) in seed_device.readings.iter().enumerate() {
                let reading = Reading {
                    id: 0,
                    device_id,
                    value: *value,
                    time: now - Duration::seconds(count - index as i64),
                };
                reading_repository.create(&reading, &mut tx).await?;
            }
        }
    }

    tx.commit().await?;

    tracing::info!("seeded {} demo patients", DEMO_PATIENTS.len());

    Ok(true)
}
