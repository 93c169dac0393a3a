//! Task aggregate - the rows of a method statement
//!
//! A task carries its attached hazards, each with its own existing and
//! additional control lists, plus two independent risk evaluations
//! (initial and residual). The backend owns all of it; every mutation
//! goes through the API and the returned task replaces the local copy
//! wholesale.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::matrix::{score, Rating, RiskBand};
use crate::entities::control::{Control, ControlPhase};
use crate::entities::hazard::Hazard;

/// Existing/additional attachment lists, as nested in the task JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSet {
    #[serde(default)]
    pub existing: Vec<TaskControl>,
    #[serde(default)]
    pub additional: Vec<TaskControl>,
}

impl ControlSet {
    pub fn phase(&self, phase: ControlPhase) -> &[TaskControl] {
        match phase {
            ControlPhase::Existing => &self.existing,
            ControlPhase::Additional => &self.additional,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty() && self.additional.is_empty()
    }
}

/// A control attached to a task hazard. The wire shape is the catalog
/// control's fields flattened, plus the attachment's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskControl {
    #[serde(flatten)]
    pub control: Control,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_value: Option<String>,
    #[serde(default)]
    pub phase: ControlPhase,
}

impl TaskControl {
    pub fn id(&self) -> i64 {
        self.control.id
    }

    /// Badge text: the control name, with the parameter in parentheses
    /// when one was recorded.
    pub fn display_label(&self) -> String {
        match self.parameter_value.as_deref() {
            Some(value) if !value.is_empty() => format!("{} ({})", self.control.name, value),
            _ => self.control.name.clone(),
        }
    }
}

/// A hazard attached to a task: the catalog hazard's fields flattened,
/// plus the attachment's parameter value and its own control lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHazard {
    #[serde(flatten)]
    pub hazard: Hazard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_value: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub controls: ControlSet,
}

impl TaskHazard {
    pub fn id(&self) -> i64 {
        self.hazard.id
    }

    /// An attachment is complete when a required parameter has a value.
    pub fn is_complete(&self) -> bool {
        !self.hazard.requires_parameter
            || self
                .parameter_value
                .as_deref()
                .is_some_and(|v| !v.trim().is_empty())
    }

    pub fn display_label(&self) -> String {
        match self.parameter_value.as_deref() {
            Some(value) if !value.is_empty() => {
                let label = self.hazard.parameter_label.as_deref().unwrap_or("Value");
                match self.hazard.parameter_unit.as_deref() {
                    Some(unit) if !unit.is_empty() => {
                        format!("{} ({}: {} {})", self.hazard.name, label, value, unit)
                    }
                    _ => format!("{} ({}: {})", self.hazard.name, label, value),
                }
            }
            _ => self.hazard.name.clone(),
        }
    }
}

/// Which of the task's two risk evaluations an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskPhase {
    Initial,
    Residual,
}

impl std::fmt::Display for RiskPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskPhase::Initial => write!(f, "initial"),
            RiskPhase::Residual => write!(f, "residual"),
        }
    }
}

/// A method statement task as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(default)]
    pub sequence: i64,
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_description: Option<String>,
    /// Comma-joined on the wire; use [`Task::personnel`] /
    /// [`Task::encode_personnel`] instead of touching the string.
    #[serde(default, deserialize_with = "crate::entities::null_to_default")]
    pub personnel_at_risk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_controls_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_controls_summary: Option<String>,
    #[serde(default)]
    pub likelihood: Rating,
    #[serde(default)]
    pub severity: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_category: Option<RiskBand>,
    #[serde(default)]
    pub residual_likelihood: Rating,
    #[serde(default)]
    pub residual_severity: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual_risk_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual_risk_category: Option<RiskBand>,
    /// Legacy task-level control lists (pre hazard-scoping).
    #[serde(default)]
    pub controls: ControlSet,
    #[serde(default)]
    pub hazards: Vec<TaskHazard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_completion_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Task {
    pub fn ratings(&self, phase: RiskPhase) -> (Rating, Rating) {
        match phase {
            RiskPhase::Initial => (self.likelihood, self.severity),
            RiskPhase::Residual => (self.residual_likelihood, self.residual_severity),
        }
    }

    /// The server-stored score when present, else likelihood x severity.
    pub fn score(&self, phase: RiskPhase) -> u8 {
        let stored = match phase {
            RiskPhase::Initial => self.risk_score,
            RiskPhase::Residual => self.residual_risk_score,
        };
        stored.unwrap_or_else(|| {
            let (l, s) = self.ratings(phase);
            score(l, s)
        })
    }

    pub fn band(&self, phase: RiskPhase) -> Option<&RiskBand> {
        match phase {
            RiskPhase::Initial => self.risk_category.as_ref(),
            RiskPhase::Residual => self.residual_risk_category.as_ref(),
        }
    }

    /// Risk is only meaningful once hazards are attached; without them the
    /// cell renders as "select hazards first" regardless of stored ratings.
    pub fn is_evaluable(&self) -> bool {
        !self.hazards.is_empty()
    }

    pub fn hazard(&self, hazard_id: i64) -> Option<&TaskHazard> {
        self.hazards.iter().find(|h| h.id() == hazard_id)
    }

    /// Decode `personnel_at_risk` into discrete names, preserving order.
    pub fn personnel(&self) -> Vec<String> {
        decode_personnel(&self.personnel_at_risk)
    }

    /// Encode names back into the wire's comma-joined form.
    pub fn encode_personnel(names: &[String]) -> String {
        names.join(", ")
    }
}

pub(crate) fn decode_personnel(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
