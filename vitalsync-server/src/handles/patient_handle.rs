use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use vitalsync_api::*;

use crate::errors::{ApiError, PatientError};
use crate::repositories::{HealthSummaryRepository, PatientRepository};
use crate::services::SnapshotService;

#[derive(Clone)]
pub struct PatientState {
    pub snapshot_service: Arc<SnapshotService>,
    pub patient_repository: Arc<PatientRepository>,
    pub summary_repository: Arc<HealthSummaryRepository>,
}

pub fn patient_router(patient_state: PatientState) -> Router {
    Router::new()
        .route("/patients", get(get_patients))
        .route("/api/patients", get(get_patients))
        .route("/api/current", get(get_patients))
        .route("/api/summaries", get(get_summaries))
        .route("/api/patients/:patient_id/summary", get(get_patient_summary))
        .with_state(patient_state)
}

#[utoipa::path(
    get,
    path = "/api/patients",
    tag = "patient",
    responses(
        (status = 200, description = "Current snapshot of every patient", body = Vec<PatientSnapshot>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_patients(State(state): State<PatientState>) -> Result<Json<Snapshot>, ApiError> {
    let snapshot = state.snapshot_service.snapshot().await?;

    Ok(Json(snapshot))
}

#[utoipa::path(
    get,
    path = "/api/summaries",
    tag = "patient",
    responses(
        (status = 200, description = "Latest summary of every patient, keyed by patient id", body = HashMap<String, LatestSummary>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_summaries(
    State(state): State<PatientState>,
) -> Result<Json<HashMap<i32, LatestSummary>>, ApiError> {
    let patients = state.patient_repository.find_all().await?;

    let mut summaries = HashMap::with_capacity(patients.len());
    for patient in patients {
        let latest = state
            .summary_repository
            .find_latest_by_patient_id(patient.id)
            .await?
            .map(|summary| LatestSummary {
                summary: Some(summary.summary_text),
                ts: Some(summary.created_at),
            })
            .unwrap_or_default();

        summaries.insert(patient.id, latest);
    }

    Ok(Json(summaries))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_id}/summary",
    tag = "patient",
    params(
        ("patient_id" = i32, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Latest summary of the patient", body = HealthSummaryResponse),
        (status = 400, description = "Patient ID is not a number"),
        (status = 404, description = "Patient or summary not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_patient_summary(
    State(state): State<PatientState>,
    patient_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<HealthSummaryResponse>, ApiError> {
    let Path(patient_id) = patient_id?;

    state
        .patient_repository
        .find_by_id(patient_id)
        .await?
        .ok_or(PatientError::PatientNotFound)?;

    let summary = state
        .summary_repository
        .find_latest_by_patient_id(patient_id)
        .await?
        .ok_or(PatientError::SummaryNotFound)?;

    Ok(Json(HealthSummaryResponse::from(summary)))
}
