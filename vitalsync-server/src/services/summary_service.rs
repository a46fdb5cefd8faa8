use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use vitalsync_api::{DeviceCategory, PatientSnapshot, SummarySource};

use crate::models::HealthSummary;
use crate::repositories::HealthSummaryRepository;
use crate::services::SnapshotService;

const STABLE: &str = "Vitals stable.";

fn average(patient: &PatientSnapshot, category: DeviceCategory) -> Option<f64> {
    let values: Vec<f64> = patient
        .devices
        .iter()
        .filter(|device| device.category == category)
        .map(|device| device.value)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// One line, rule based description of a patient's current vitals.
pub fn summarize(patient: &PatientSnapshot) -> String {
    let mut parts = Vec::new();

    match average(patient, DeviceCategory::HeartRate) {
        Some(heart_rate) if heart_rate > 100.0 => parts.push("Elevated heart rate."),
        Some(heart_rate) if heart_rate < 60.0 => parts.push("Low heart rate."),
        _ => {}
    }

    match average(patient, DeviceCategory::Temperature) {
        Some(temperature) if temperature > 99.0 => parts.push("Temperature slightly elevated."),
        Some(temperature) if temperature < 97.0 => parts.push("Temperature slightly low."),
        _ => {}
    }

    if parts.is_empty() {
        parts.push(STABLE);
    }

    format!("{}: {}", patient.name, parts.join(" "))
}

pub struct SummaryService {
    snapshot_service: Arc<SnapshotService>,
    summary_repository: Arc<HealthSummaryRepository>,
    period: Duration,
}

impl SummaryService {
    pub fn new(
        snapshot_service: Arc<SnapshotService>,
        summary_repository: Arc<HealthSummaryRepository>,
        period: Duration,
    ) -> Self {
        Self {
            snapshot_service,
            summary_repository,
            period,
        }
    }

    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = interval(service.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                match service.run_once().await {
                    Ok(count) => tracing::debug!("stored {} health summaries", count),
                    Err(e) => tracing::error!("Summary job failed: {}", e),
                }
            }
        })
    }

    /// Summarizes every patient of the current snapshot and stores one row each.
    pub async fn run_once(&self) -> Result<usize, sqlx::Error> {
        let snapshot = self.snapshot_service.snapshot().await?;
        let created_at = OffsetDateTime::now_utc();

        let mut tx = self.summary_repository.get_pool().begin().await?;
        for patient in &snapshot {
            let summary = HealthSummary {
                id: 0,
                patient_id: patient.id,
                summary_text: summarize(patient),
                source: SummarySource::Rule.to_string(),
                created_at,
            };
            self.summary_repository.create(&summary, &mut tx).await?;
        }
        tx.commit().await?;

        Ok(snapshot.len())
    }
}
