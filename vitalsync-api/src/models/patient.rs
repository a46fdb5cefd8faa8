use serde::{Deserialize, Serialize};

use super::Id;
use super::device::DeviceSnapshot;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    /// Patient identifier
    pub id: Id,
    /// Display name
    pub name: String,
    /// Devices worn by the patient, ordered by id
    pub devices: Vec<DeviceSnapshot>,
}

/// Full state pushed to viewers and served over REST.
pub type Snapshot = Vec<PatientSnapshot>;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
}
