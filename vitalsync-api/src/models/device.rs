use serde::{Deserialize, Serialize};

use super::Id;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    /// Pulse monitor, reports beats per minute
    HeartRate,
    /// Thermometer, reports degrees Fahrenheit
    Temperature,
    /// Anything the name does not identify
    #[default]
    Generic,
}

impl DeviceCategory {
    /// Resolves the category from a device display name.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();

        if name.contains("heart") {
            DeviceCategory::HeartRate
        } else if name.contains("temperature") {
            DeviceCategory::Temperature
        } else {
            DeviceCategory::Generic
        }
    }

    /// The value the simulated signal drifts back towards.
    pub fn baseline(&self) -> f64 {
        match self {
            DeviceCategory::HeartRate => 70.0,
            DeviceCategory::Temperature => 98.6,
            DeviceCategory::Generic => 75.0,
        }
    }

    /// Width of the uniform noise added on every tick.
    pub fn variation(&self) -> f64 {
        match self {
            DeviceCategory::HeartRate => 1.0,
            DeviceCategory::Temperature => 0.2,
            DeviceCategory::Generic => 0.5,
        }
    }

    /// Lowest value a reading may take.
    pub fn floor(&self) -> Option<f64> {
        match self {
            DeviceCategory::HeartRate => Some(50.0),
            DeviceCategory::Temperature => Some(95.0),
            DeviceCategory::Generic => None,
        }
    }
}

impl From<String> for DeviceCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "heart_rate" => DeviceCategory::HeartRate,
            "temperature" => DeviceCategory::Temperature,
            _ => DeviceCategory::Generic,
        }
    }
}

impl core::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            DeviceCategory::HeartRate => write!(f, "heart_rate"),
            DeviceCategory::Temperature => write!(f, "temperature"),
            DeviceCategory::Generic => write!(f, "generic"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    Green,
    Yellow,
    Red,
}

impl AlertLevel {
    pub fn classify(category: DeviceCategory, value: f64) -> Self {
        match category {
            DeviceCategory::HeartRate if value > 100.0 => AlertLevel::Red,
            DeviceCategory::HeartRate if value < 60.0 => AlertLevel::Yellow,
            DeviceCategory::Temperature if value > 100.4 => AlertLevel::Red,
            DeviceCategory::Temperature if value < 97.0 => AlertLevel::Yellow,
            _ => AlertLevel::Green,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadingPoint {
    /// Unix timestamp in seconds
    pub time: i64,
    /// Measured value
    pub value: f64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    /// Device identifier
    pub id: Id,
    /// Display name
    pub name: String,
    /// Category resolved from the name
    pub category: DeviceCategory,
    /// Battery level in percent (0-100)
    pub battery: f64,
    /// Latest simulated value
    pub value: f64,
    /// Latest value, set for heart rate devices only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    /// Latest value, set for temperature devices only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Alert level of the latest value
    pub alert_level: AlertLevel,
    /// Trailing readings, oldest first
    pub readings: Vec<ReadingPoint>,
}

impl DeviceSnapshot {
    pub fn new(
        id: Id,
        name: String,
        category: DeviceCategory,
        battery: f64,
        value: f64,
        readings: Vec<ReadingPoint>,
    ) -> Self {
        Self {
            id,
            name,
            category,
            battery,
            value,
            heart_rate: (category == DeviceCategory::HeartRate).then_some(value),
            temperature: (category == DeviceCategory::Temperature).then_some(value),
            alert_level: AlertLevel::classify(category, value),
            readings,
        }
    }
}
