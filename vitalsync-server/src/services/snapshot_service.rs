use std::collections::HashMap;
use std::sync::Arc;

use sqlx::Error;
use vitalsync_api::{DeviceSnapshot, PatientSnapshot, ReadingPoint, Snapshot};

use crate::repositories::{DeviceRepository, PatientRepository, ReadingRepository};

pub struct SnapshotService {
    patient_repository: Arc<PatientRepository>,
    device_repository: Arc<DeviceRepository>,
    reading_repository: Arc<ReadingRepository>,
    reading_window: u32,
}

impl SnapshotService {
    pub fn new(
        patient_repository: Arc<PatientRepository>,
        device_repository: Arc<DeviceRepository>,
        reading_repository: Arc<ReadingRepository>,
        reading_window: u32,
    ) -> Self {
        Self {
            patient_repository,
            device_repository,
            reading_repository,
            reading_window,
        }
    }

    /// Assembles every patient with their devices and trailing readings.
    pub async fn snapshot(&self) -> Result<Snapshot, Error> {
        let patients = self.patient_repository.find_all().await?;
        let devices = self.device_repository.find_all().await?;

        // At least one reading per device is needed for the current value
        let window = self.reading_window.max(1) as i64;
        let mut readings: HashMap<i32, Vec<ReadingPoint>> = HashMap::new();
        for reading in self.reading_repository.find_window(window).await? {
            readings
                .entry(reading.device_id)
                .or_default()
                .push(ReadingPoint::from(&reading));
        }

        let mut devices_by_patient: HashMap<i32, Vec<DeviceSnapshot>> = HashMap::new();
        for device in devices {
            let category = device.category();
            let mut points = readings.remove(&device.id).unwrap_or_default();
            let value = points
                .last()
                .map(|point| point.value)
                .unwrap_or_else(|| category.baseline());

            let skip = points.len().saturating_sub(self.reading_window as usize);
            points.drain(..skip);

            devices_by_patient
                .entry(device.patient_id)
                .or_default()
                .push(DeviceSnapshot::new(
                    device.id,
                    device.name,
                    category,
                    device.battery,
                    value,
                    points,
                ));
        }

        Ok(patients
            .into_iter()
            .map(|patient| PatientSnapshot {
                devices: devices_by_patient.remove(&patient.id).unwrap_or_default(),
                id: patient.id,
                name: patient.name,
            })
            .collect())
    }
}
