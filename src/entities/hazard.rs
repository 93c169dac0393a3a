//! Hazard catalog entity
//!
//! Hazards are the catalog of potential sources of harm a task can be
//! tagged with. Some hazards carry a required parameter (e.g. a load
//! weight for manual handling) that must be filled in when the hazard is
//! attached to a task.

use serde::{Deserialize, Serialize};

use crate::core::matrix::{score, Rating};

/// A hazard as served by `/api/catalog/hazards`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default, deserialize_with = "crate::entities::null_to_default")]
    pub description: String,
    #[serde(default = "default_rating")]
    pub default_likelihood: Rating,
    #[serde(default = "default_rating")]
    pub default_severity: Rating,
    #[serde(default)]
    pub requires_parameter: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_unit: Option<String>,
}

fn default_rating() -> Rating {
    Rating::new(3).expect("3 is a valid rating")
}

impl Hazard {
    /// Default score from the catalog's likelihood/severity pair.
    pub fn default_score(&self) -> u8 {
        score(self.default_likelihood, self.default_severity)
    }

    /// Prompt text for the parameter field, e.g. "Load weight (kg)".
    pub fn parameter_prompt(&self) -> String {
        let label = self.parameter_label.as_deref().unwrap_or("Parameter");
        match self.parameter_unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{} ({})", label, unit),
            _ => label.to_string(),
        }
    }
}

/// Payload for creating or updating a catalog hazard.
///
/// Omitted fields keep the backend's defaults (or, on update, the stored
/// values).
#[derive(Debug, Clone, Default, Serialize)]
pub struct HazardDraft {
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_likelihood: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_severity: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_parameter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_unit: Option<String>,
}
