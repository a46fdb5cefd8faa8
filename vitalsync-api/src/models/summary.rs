use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Id;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    /// Threshold rules over averaged vitals
    #[default]
    Rule,
}

impl From<String> for SummarySource {
    fn from(_: String) -> Self {
        SummarySource::Rule
    }
}

impl core::fmt::Display for SummarySource {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            SummarySource::Rule => write!(f, "rule"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummaryResponse {
    /// Patient the summary describes
    pub patient_id: Id,
    /// One line summary, prefixed with the patient name
    pub summary_text: String,
    /// How the summary was produced
    pub source: SummarySource,
    /// Creation time
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSummary {
    /// Most recent summary text, if one was generated yet
    pub summary: Option<String>,
    /// Creation time of that summary
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub ts: Option<OffsetDateTime>,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_summary_serializes_rfc3339() {
        let response = HealthSummaryResponse {
            patient_id: 1,
            summary_text: "Alice: Vitals stable.".to_string(),
            source: SummarySource::Rule,
            created_at: datetime!(2025-10-05 18:00:00 UTC),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["source"], serde_json::json!("rule"));
        assert_eq!(value["created_at"], serde_json::json!("2025-10-05T18:00:00Z"));
    }

    #[test]
    fn test_empty_latest_summary() {
        let value = serde_json::to_value(LatestSummary::default()).unwrap();
        assert!(value["summary"].is_null());
        assert!(value["ts"].is_null());
    }
}
