use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use vitalsync_api::DeviceCategory;

use crate::configs::Simulation;
use crate::models::{Device, Reading};
use crate::repositories::{DeviceRepository, ReadingRepository};
use crate::services::{SnapshotService, ViewerHub};

/// Fraction of the distance to the baseline recovered on every tick.
pub const MEAN_REVERSION: f64 = 0.05;

pub const FULL_BATTERY: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryState {
    pub level: f64,
    pub decremented_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceUpdate {
    pub device_id: i32,
    pub value: f64,
    pub battery: BatteryState,
    pub time: OffsetDateTime,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Devices whose reading and battery were persisted
    pub updated: usize,
    /// Devices whose persistence failed
    pub failed: usize,
    /// Viewers that accepted the snapshot
    pub delivered: usize,
}

/// One step of the mean-reverting random walk, clamped to the category floor.
pub fn next_value<R: Rng>(category: DeviceCategory, previous: Option<f64>, rng: &mut R) -> f64 {
    let baseline = category.baseline();
    let previous = previous.filter(|value| value.is_finite()).unwrap_or(baseline);
    let noise = (rng.random::<f64>() - 0.5) * category.variation();
    let next = previous + (baseline - previous) * MEAN_REVERSION + noise;

    match category.floor() {
        Some(floor) => next.max(floor),
        None => next,
    }
}

/// Drops the battery by one percent at most once per `interval`, refilling it
/// when the drop would empty it.
pub fn decay_battery(
    level: f64,
    decremented_at: Option<OffsetDateTime>,
    now: OffsetDateTime,
    interval: Duration,
) -> BatteryState {
    let level = if level.is_finite() {
        level.clamp(0.0, FULL_BATTERY)
    } else {
        FULL_BATTERY
    };

    let due = match decremented_at {
        None => true,
        Some(last) => {
            let elapsed = now - last;
            !elapsed.is_negative() && elapsed.unsigned_abs() >= interval
        }
    };

    if !due {
        return BatteryState { level, decremented_at };
    }

    let drained = level - 1.0;
    BatteryState {
        level: if drained <= 0.0 { FULL_BATTERY } else { round_to(drained, 1) },
        decremented_at: Some(now),
    }
}

pub fn advance<R: Rng>(
    device: &Device,
    last_value: Option<f64>,
    now: OffsetDateTime,
    battery_interval: Duration,
    rng: &mut R,
) -> DeviceUpdate {
    let value = next_value(device.category(), last_value, rng);

    DeviceUpdate {
        device_id: device.id,
        value: round_to(value, 2),
        battery: decay_battery(device.battery, device.battery_decremented_at, now, battery_interval),
        time: now,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub struct SimulationService {
    device_repository: Arc<DeviceRepository>,
    reading_repository: Arc<ReadingRepository>,
    snapshot_service: Arc<SnapshotService>,
    viewer_hub: Arc<ViewerHub>,
    simulation: Simulation,
}

impl SimulationService {
    pub fn new(
        device_repository: Arc<DeviceRepository>,
        reading_repository: Arc<ReadingRepository>,
        snapshot_service: Arc<SnapshotService>,
        viewer_hub: Arc<ViewerHub>,
        simulation: Simulation,
    ) -> Self {
        Self {
            device_repository,
            reading_repository,
            snapshot_service,
            viewer_hub,
            simulation,
        }
    }

    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);

        tokio::spawn(async move {
            let mut rng = StdRng::from_os_rng();
            let mut ticker = interval(service.simulation.tick_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(
                "simulation started, ticking every {:?}",
                service.simulation.tick_interval()
            );

            loop {
                ticker.tick().await;

                match service.tick(&mut rng).await {
                    Ok(report) => tracing::debug!(
                        updated = report.updated,
                        failed = report.failed,
                        delivered = report.delivered,
                        "simulation tick"
                    ),
                    Err(e) => tracing::error!("Simulation tick failed: {}", e),
                }
            }
        })
    }

    /// Advances every device, persists the results and publishes the new snapshot.
    pub async fn tick<R: Rng>(&self, rng: &mut R) -> anyhow::Result<TickReport> {
        let now = OffsetDateTime::now_utc();
        let devices = self.device_repository.find_all().await?;
        let latest: HashMap<i32, f64> = self
            .reading_repository
            .find_window(1)
            .await?
            .into_iter()
            .map(|reading| (reading.device_id, reading.value))
            .collect();

        let battery_interval = self.simulation.battery_interval();
        let updates: Vec<DeviceUpdate> = devices
            .iter()
            .map(|device| {
                let last_value = latest.get(&device.id).copied();
                advance(device, last_value, now, battery_interval, &mut *rng)
            })
            .collect();

        let results = join_all(updates.iter().map(|update| self.persist(update))).await;

        let mut report = TickReport::default();
        for (update, result) in updates.iter().zip(results) {
            match result {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    tracing::error!("Failed to persist reading for device {}: {}", update.device_id, e);
                    report.failed += 1;
                }
            }
        }

        let snapshot = self.snapshot_service.snapshot().await?;
        report.delivered = self.viewer_hub.publish(&snapshot).await?;

        Ok(report)
    }

    async fn persist(&self, update: &DeviceUpdate) -> Result<(), sqlx::Error> {
        let mut tx = self.device_repository.get_pool().begin().await?;

        let reading = Reading {
            id: 0,
            device_id: update.device_id,
            value: update.value,
            time: update.time,
        };
        self.reading_repository.create(&reading, &mut tx).await?;

        self.device_repository
            .update_battery(
                update.device_id,
                update.battery.level,
                update.battery.decremented_at,
                &mut tx,
            )
            .await?;

        if self.simulation.max_stored_readings > 0 {
            let keep = self.simulation.max_stored_readings as i64;
            self.reading_repository
                .prune_by_device_id(update.device_id, keep, &mut tx)
                .await?;
        }

        tx.commit().await
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::configs::Storage;
    use crate::repositories::PatientRepository;
    use crate::tests::{create_test_device, create_test_patient, create_test_reading, setup_test_storage};

    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    fn simulation_service(storage: Arc<Storage>, simulation: Simulation) -> (SimulationService, Arc<ViewerHub>) {
        let device_repository = Arc::new(DeviceRepository::new(storage.clone()));
        let reading_repository = Arc::new(ReadingRepository::new(storage.clone()));
        let snapshot_service = Arc::new(SnapshotService::new(
            Arc::new(PatientRepository::new(storage.clone())),
            device_repository.clone(),
            reading_repository.clone(),
            simulation.reading_window,
        ));
        let viewer_hub = Arc::new(ViewerHub::new());

        let service = SimulationService::new(
            device_repository,
            reading_repository,
            snapshot_service,
            viewer_hub.clone(),
            simulation,
        );

        (service, viewer_hub)
    }

    #[test]
    fn test_values_never_drop_below_floor() {
        let mut rng = StdRng::seed_from_u64(7);

        for category in [DeviceCategory::HeartRate, DeviceCategory::Temperature] {
            let floor = category.floor().unwrap();
            let mut value = Some(floor);
            for _ in 0..1000 {
                let next = next_value(category, value, &mut rng);
                assert!(next >= floor, "{category} went to {next}");
                value = Some(next);
            }
        }
    }

    #[test]
    fn test_value_reverts_towards_baseline() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut value = Some(140.0);

        for _ in 0..200 {
            value = Some(next_value(DeviceCategory::HeartRate, value, &mut rng));
        }

        assert!((value.unwrap() - 70.0).abs() < 10.0);
    }

    #[test]
    fn test_first_value_starts_at_baseline() {
        let mut rng = StdRng::seed_from_u64(3);
        let value = next_value(DeviceCategory::Temperature, None, &mut rng);

        assert!((value - 98.6).abs() <= 0.1);
    }

    #[test]
    fn test_generic_has_no_floor() {
        let mut rng = StdRng::seed_from_u64(5);
        let value = next_value(DeviceCategory::Generic, Some(-20.0), &mut rng);

        assert!(value < 0.0);
    }

    #[test]
    fn test_battery_decays_once_per_interval() {
        let start = datetime!(2025-10-05 18:00:00 UTC);

        let first = decay_battery(80.0, None, start, MINUTE);
        assert_eq!(first.level, 79.0);
        assert_eq!(first.decremented_at, Some(start));

        let early = decay_battery(first.level, first.decremented_at, start + time::Duration::seconds(30), MINUTE);
        assert_eq!(early, first);

        let later = decay_battery(first.level, first.decremented_at, start + time::Duration::seconds(60), MINUTE);
        assert_eq!(later.level, 78.0);
        assert_eq!(later.decremented_at, Some(start + time::Duration::seconds(60)));
    }

    #[test]
    fn test_battery_resets_when_empty() {
        let now = datetime!(2025-10-05 18:00:00 UTC);

        assert_eq!(decay_battery(1.0, None, now, MINUTE).level, 100.0);
        assert_eq!(decay_battery(0.0, None, now, MINUTE).level, 100.0);
        assert_eq!(decay_battery(-4.0, None, now, MINUTE).level, 100.0);
        assert_eq!(decay_battery(250.0, None, now, MINUTE).level, 99.0);
    }

    #[test]
    fn test_battery_stays_in_bounds() {
        let mut state = BatteryState {
            level: 3.5,
            decremented_at: None,
        };
        let mut now = datetime!(2025-10-05 18:00:00 UTC);

        for _ in 0..500 {
            state = decay_battery(state.level, state.decremented_at, now, MINUTE);
            assert!((0.0..=100.0).contains(&state.level));
            now += time::Duration::seconds(61);
        }
    }

    #[test]
    fn test_clock_going_backwards_does_not_decay() {
        let now = datetime!(2025-10-05 18:00:00 UTC);
        let state = decay_battery(50.0, Some(now), now - time::Duration::hours(1), MINUTE);

        assert_eq!(state.level, 50.0);
        assert_eq!(state.decremented_at, Some(now));
    }

    #[tokio::test]
    async fn test_tick_persists_and_publishes() {
        let storage = setup_test_storage().await;
        let alice = create_test_patient(storage.clone(), "Alice").await;
        let heart = create_test_device(storage.clone(), alice.id, "Heart Rate Sensor", 100.0).await;
        let temperature = create_test_device(storage.clone(), alice.id, "Temperature Sensor", 95.0).await;
        create_test_reading(storage.clone(), heart.id, 72.0).await;

        let (service, hub) = simulation_service(storage.clone(), Simulation::default());
        let (_, mut viewer) = hub.subscribe().await;

        let mut rng = StdRng::seed_from_u64(42);
        let report = service.tick(&mut rng).await.unwrap();

        assert_eq!(report, TickReport { updated: 2, failed: 0, delivered: 1 });

        let readings = ReadingRepository::new(storage.clone());
        assert_eq!(readings.count_by_device_id(heart.id).await.unwrap(), 2);
        assert_eq!(readings.count_by_device_id(temperature.id).await.unwrap(), 1);

        let devices = DeviceRepository::new(storage.clone());
        let heart_after = devices.find_by_id(heart.id).await.unwrap().unwrap();
        assert_eq!(heart_after.battery, 99.0);
        assert!(heart_after.battery_decremented_at.is_some());

        let frame = viewer.recv().await.unwrap();
        let snapshot: vitalsync_api::Snapshot = serde_json::from_str(&frame).unwrap();
        let ids: Vec<i32> = snapshot[0].devices.iter().map(|device| device.id).collect();
        assert_eq!(ids, vec![heart.id, temperature.id]);
        assert!(snapshot[0].devices[0].value >= 50.0);
        assert!(snapshot[0].devices[1].value >= 95.0);
    }

    #[tokio::test]
    async fn test_consecutive_ticks_decay_battery_once() {
        let storage = setup_test_storage().await;
        let alice = create_test_patient(storage.clone(), "Alice").await;
        let heart = create_test_device(storage.clone(), alice.id, "Heart Rate Sensor", 100.0).await;

        let (service, _) = simulation_service(storage.clone(), Simulation::default());
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..5 {
            service.tick(&mut rng).await.unwrap();
        }

        let devices = DeviceRepository::new(storage.clone());
        assert_eq!(devices.find_by_id(heart.id).await.unwrap().unwrap().battery, 99.0);
        assert_eq!(
            ReadingRepository::new(storage).count_by_device_id(heart.id).await.unwrap(),
            5
        );
    }

    #[tokio::test]
    async fn test_tick_prunes_stored_readings() {
        let storage = setup_test_storage().await;
        let alice = create_test_patient(storage.clone(), "Alice").await;
        let heart = create_test_device(storage.clone(), alice.id, "Heart Rate Sensor", 100.0).await;

        let simulation = Simulation {
            max_stored_readings: 3,
            ..Default::default()
        };
        let (service, _) = simulation_service(storage.clone(), simulation);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..6 {
            service.tick(&mut rng).await.unwrap();
        }

        assert_eq!(
            ReadingRepository::new(storage).count_by_device_id(heart.id).await.unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_tick_without_devices() {
        let storage = setup_test_storage().await;
        let (service, hub) = simulation_service(storage, Simulation::default());

        let mut rng = StdRng::seed_from_u64(0);
        let report = service.tick(&mut rng).await.unwrap();

        assert_eq!(report, TickReport::default());
        assert_eq!(hub.latest().await.as_deref(), Some("[]"));
    }
}
