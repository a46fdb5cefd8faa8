use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::configs::{Cors, SchemaManager, Settings, Simulation, Storage};
use crate::handles::*;
use crate::repositories::{DeviceRepository, HealthSummaryRepository, PatientRepository, ReadingRepository};
use crate::services::{SimulationService, SnapshotService, SummaryService, ViewerHub, seed_if_empty};

/// Everything the routers and background loops share.
pub struct AppServices {
    pub storage: Arc<Storage>,
    pub viewer_hub: Arc<ViewerHub>,
    pub patient_repository: Arc<PatientRepository>,
    pub summary_repository: Arc<HealthSummaryRepository>,
    pub snapshot_service: Arc<SnapshotService>,
    pub simulation_service: Arc<SimulationService>,
    pub summary_service: Arc<SummaryService>,
}

impl AppServices {
    pub fn new(storage: Arc<Storage>, simulation: &Simulation) -> Self {
        let patient_repository = Arc::new(PatientRepository::new(storage.clone()));
        let device_repository = Arc::new(DeviceRepository::new(storage.clone()));
        let reading_repository = Arc::new(ReadingRepository::new(storage.clone()));
        let summary_repository = Arc::new(HealthSummaryRepository::new(storage.clone()));
        let viewer_hub = Arc::new(ViewerHub::new());

        let snapshot_service = Arc::new(SnapshotService::new(
            patient_repository.clone(),
            device_repository.clone(),
            reading_repository.clone(),
            simulation.reading_window,
        ));
        let simulation_service = Arc::new(SimulationService::new(
            device_repository,
            reading_repository,
            snapshot_service.clone(),
            viewer_hub.clone(),
            simulation.clone(),
        ));
        let summary_service = Arc::new(SummaryService::new(
            snapshot_service.clone(),
            summary_repository.clone(),
            simulation.summary_interval(),
        ));

        Self {
            storage,
            viewer_hub,
            patient_repository,
            summary_repository,
            snapshot_service,
            simulation_service,
            summary_service,
        }
    }
}

pub fn create_router(services: &AppServices, cors: &Cors) -> Router {
    let patients = patient_router(PatientState {
        snapshot_service: services.snapshot_service.clone(),
        patient_repository: services.patient_repository.clone(),
        summary_repository: services.summary_repository.clone(),
    });

    let streams = stream_router(StreamState {
        viewer_hub: services.viewer_hub.clone(),
    });

    Router::new()
        .merge(patients)
        .merge(streams)
        .merge(health_router())
        .merge(docs_router())
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(cors: &Cors) -> CorsLayer {
    if cors.is_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let storage = Arc::new(Storage::new(settings.database.clone(), SchemaManager::default()).await?);

    if settings.simulation.seed {
        seed_if_empty(&storage).await?;
    }

    let services = AppServices::new(storage, &settings.simulation);
    services.simulation_service.start();
    services.summary_service.start();

    Ok(create_router(&services, &settings.cors))
}
