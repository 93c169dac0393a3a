//! Control measure catalog entity
//!
//! Controls are the mitigations a task hazard can be tagged with. Each
//! attachment is phased: `existing` controls are already in place,
//! `additional` controls are planned to bring the residual risk down.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A control measure as served by `/api/catalog/controls`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default, deserialize_with = "crate::entities::null_to_default")]
    pub description: String,
    /// Ordinal effectiveness, 1 (least) to 5 (most).
    #[serde(default = "default_effectiveness")]
    pub effectiveness: u8,
    #[serde(default)]
    pub requires_parameter: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

fn default_effectiveness() -> u8 {
    2
}

impl Control {
    /// Prompt text for the parameter field, e.g. "Hoist capacity (kg)".
    pub fn parameter_prompt(&self) -> String {
        let label = self.parameter_label.as_deref().unwrap_or("Parameter");
        match self.parameter_unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{} ({})", label, unit),
            _ => label.to_string(),
        }
    }
}

/// Which control list an attachment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlPhase {
    #[default]
    Existing,
    Additional,
}

impl std::fmt::Display for ControlPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlPhase::Existing => write!(f, "existing"),
            ControlPhase::Additional => write!(f, "additional"),
        }
    }
}

impl FromStr for ControlPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "existing" | "current" => Ok(ControlPhase::Existing),
            "additional" | "planned" => Ok(ControlPhase::Additional),
            _ => Err(format!("Unknown control phase: {}", s)),
        }
    }
}

/// Payload for creating or updating a catalog control.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ControlDraft {
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_parameter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}
