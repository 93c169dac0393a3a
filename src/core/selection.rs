//! Selection sessions
//!
//! A session is the transient checked/unchecked state built up while the
//! user edits one facet of a task: its hazards, one phase of one control
//! list, or the personnel at risk. Sessions are seeded from the task's
//! current attachments, mutated locally, and then committed wholesale -
//! the server replaces the whole collection with what the session sends,
//! so an id missing from the payload is a removal. Cancelling a session
//! just drops it; nothing touches the task until commit.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::core::catalog::Catalog;
use crate::entities::control::ControlPhase;
use crate::entities::task::{decode_personnel, Task};

/// Whether a control session targets a hazard's own lists or the legacy
/// task-level lists kept for method statements imported before hazard
/// scoping existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlScope {
    Legacy,
    PerHazard(i64),
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("Enter {field} for {hazard}")]
    MissingParameter { hazard: String, field: String },
}

/// One selected hazard in a session: the catalog id plus whatever the
/// user has typed into its parameter field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardPick {
    pub id: i64,
    pub parameter_value: String,
}

/// Commit body for `PUT /api/tasks/{id}/hazards`.
#[derive(Debug, Serialize)]
pub struct HazardAssignments {
    pub hazards: Vec<HazardPick>,
}

/// Hazard selection for one task.
#[derive(Debug, Clone)]
pub struct HazardSession {
    task_id: i64,
    entries: Vec<HazardPick>,
    /// Parameter text parked when a hazard is unchecked, so re-checking
    /// it in the same session restores what was typed.
    parked: HashMap<i64, String>,
}

impl HazardSession {
    pub fn begin(task: &Task) -> Self {
        let entries = task
            .hazards
            .iter()
            .map(|attachment| HazardPick {
                id: attachment.id(),
                parameter_value: attachment.parameter_value.clone().unwrap_or_default(),
            })
            .collect();
        HazardSession {
            task_id: task.id,
            entries,
            parked: HashMap::new(),
        }
    }

    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    pub fn is_selected(&self, hazard_id: i64) -> bool {
        self.entries.iter().any(|entry| entry.id == hazard_id)
    }

    pub fn selected(&self) -> &[HazardPick] {
        &self.entries
    }

    pub fn parameter_value(&self, hazard_id: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == hazard_id)
            .map(|entry| entry.parameter_value.as_str())
    }

    /// Select a hazard. Restores any parameter text parked by an earlier
    /// uncheck in this session.
    pub fn check(&mut self, hazard_id: i64) {
        if self.is_selected(hazard_id) {
            return;
        }
        let parameter_value = self.parked.remove(&hazard_id).unwrap_or_default();
        self.entries.push(HazardPick {
            id: hazard_id,
            parameter_value,
        });
    }

    /// Deselect a hazard, parking its parameter text.
    pub fn uncheck(&mut self, hazard_id: i64) {
        if let Some(index) = self.entries.iter().position(|entry| entry.id == hazard_id) {
            let entry = self.entries.remove(index);
            if !entry.parameter_value.is_empty() {
                self.parked.insert(hazard_id, entry.parameter_value);
            }
        }
    }

    /// Flip selection; returns whether the hazard is now selected.
    pub fn toggle(&mut self, hazard_id: i64) -> bool {
        if self.is_selected(hazard_id) {
            self.uncheck(hazard_id);
            false
        } else {
            self.check(hazard_id);
            true
        }
    }

    /// Update a hazard's parameter text. Editing the field counts as
    /// checking the hazard, so an unchecked hazard becomes selected.
    pub fn set_parameter(&mut self, hazard_id: i64, value: &str) {
        self.check(hazard_id);
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == hazard_id) {
            entry.parameter_value = value.to_string();
        }
    }

    /// Check every selected hazard that requires a parameter has one.
    /// The first violation aborts the save before any network call.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), SelectionError> {
        for entry in &self.entries {
            let Some(hazard) = catalog.hazard(entry.id) else {
                continue;
            };
            if hazard.requires_parameter && entry.parameter_value.trim().is_empty() {
                return Err(SelectionError::MissingParameter {
                    hazard: hazard.name.clone(),
                    field: hazard
                        .parameter_label
                        .clone()
                        .unwrap_or_else(|| "a parameter".to_string()),
                });
            }
        }
        Ok(())
    }

    /// The full replacement payload for the task's hazard attachments.
    pub fn assignments(&self) -> HazardAssignments {
        HazardAssignments {
            hazards: self.entries.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ControlParam {
    id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter_value: Option<String>,
}

/// Commit body for the control endpoints (both scopes share the shape).
#[derive(Debug, Serialize)]
pub struct ControlAssignments {
    phase: ControlPhase,
    control_ids: Vec<i64>,
    controls_with_parameters: Vec<ControlParam>,
}

/// Control selection for one (task, phase, scope) target.
#[derive(Debug, Clone)]
pub struct ControlSession {
    task_id: i64,
    phase: ControlPhase,
    scope: ControlScope,
    ids: Vec<i64>,
    params: HashMap<i64, String>,
}

impl ControlSession {
    /// Seed from the task's current attachments for the target phase.
    /// A `PerHazard` scope naming a hazard the task no longer carries
    /// seeds empty, mirroring the silent no-op lookup policy.
    pub fn begin(task: &Task, phase: ControlPhase, scope: ControlScope) -> Self {
        let attached = match scope {
            ControlScope::PerHazard(hazard_id) => task
                .hazard(hazard_id)
                .map(|h| h.controls.phase(phase))
                .unwrap_or(&[]),
            ControlScope::Legacy => task.controls.phase(phase),
        };

        let mut ids = Vec::new();
        let mut params = HashMap::new();
        for attachment in attached {
            ids.push(attachment.id());
            // Stored values carry the "<label>: <value>" convention; strip
            // the label so the session holds the raw text the user typed.
            if let Some(stored) = attachment.parameter_value.as_deref() {
                let raw = attachment
                    .control
                    .parameter_label
                    .as_deref()
                    .and_then(|label| stored.strip_prefix(&format!("{}: ", label)))
                    .unwrap_or(stored);
                if !raw.is_empty() {
                    params.insert(attachment.id(), raw.to_string());
                }
            }
        }

        ControlSession {
            task_id: task.id,
            phase,
            scope,
            ids,
            params,
        }
    }

    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    pub fn phase(&self) -> ControlPhase {
        self.phase
    }

    pub fn scope(&self) -> ControlScope {
        self.scope
    }

    pub fn is_selected(&self, control_id: i64) -> bool {
        self.ids.contains(&control_id)
    }

    pub fn selected_ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn parameter_value(&self, control_id: i64) -> Option<&str> {
        self.params.get(&control_id).map(String::as_str)
    }

    pub fn check(&mut self, control_id: i64) {
        if !self.is_selected(control_id) {
            self.ids.push(control_id);
        }
    }

    /// Deselect and drop any entered parameter text.
    pub fn uncheck(&mut self, control_id: i64) {
        self.ids.retain(|id| *id != control_id);
        self.params.remove(&control_id);
    }

    pub fn toggle(&mut self, control_id: i64) -> bool {
        if self.is_selected(control_id) {
            self.uncheck(control_id);
            false
        } else {
            self.check(control_id);
            true
        }
    }

    /// Record parameter text for a selected control; empty clears it.
    pub fn set_parameter(&mut self, control_id: i64, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.params.remove(&control_id);
        } else {
            self.params.insert(control_id, trimmed.to_string());
        }
    }

    /// The full replacement payload for the target phase. Parameter
    /// values are labelled at commit time from the catalog: a control
    /// with label "Hoist capacity" and entered text "500" commits as
    /// "Hoist capacity: 500". Required parameters are deliberately NOT
    /// validated here; only hazard sessions block on missing values.
    pub fn assignments(&self, catalog: &Catalog) -> ControlAssignments {
        let controls_with_parameters = self
            .ids
            .iter()
            .map(|&id| {
                let parameter_value = self.params.get(&id).and_then(|value| {
                    let control = catalog.control(id)?;
                    if !control.requires_parameter {
                        return None;
                    }
                    control
                        .parameter_label
                        .as_deref()
                        .map(|label| format!("{}: {}", label, value))
                });
                ControlParam {
                    id,
                    parameter_value,
                }
            })
            .collect();

        ControlAssignments {
            phase: self.phase,
            control_ids: self.ids.clone(),
            controls_with_parameters,
        }
    }
}

/// Personnel selection for one task: an insertion-ordered set of catalog
/// display names. Matching is by name equality, so catalog renames do not
/// follow through to existing assignments.
#[derive(Debug, Clone)]
pub struct PersonnelSession {
    task_id: i64,
    names: Vec<String>,
}

impl PersonnelSession {
    pub fn begin(task: &Task) -> Self {
        PersonnelSession {
            task_id: task.id,
            names: decode_personnel(&task.personnel_at_risk),
        }
    }

    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn selected(&self) -> &[String] {
        &self.names
    }

    pub fn check(&mut self, name: &str) {
        if !self.is_selected(name) {
            self.names.push(name.to_string());
        }
    }

    pub fn uncheck(&mut self, name: &str) {
        self.names.retain(|n| n != name);
    }

    pub fn toggle(&mut self, name: &str) -> bool {
        if self.is_selected(name) {
            self.uncheck(name);
            false
        } else {
            self.check(name);
            true
        }
    }

    /// The comma-joined wire encoding for `personnel_at_risk`.
    pub fn encoded(&self) -> String {
        Task::encode_personnel(&self.names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Catalog;
    use crate::core::matrix::{Rating, RiskBand, RiskMatrix};
    use crate::entities::control::Control;
    use crate::entities::hazard::Hazard;
    use crate::entities::task::{ControlSet, TaskControl, TaskHazard};

    fn catalog_hazard(id: i64, name: &str, requires_parameter: bool) -> Hazard {
        Hazard {
            id,
            name: name.to_string(),
            category: "General".to_string(),
            description: String::new(),
            default_likelihood: Rating::new(3).unwrap(),
            default_severity: Rating::new(3).unwrap(),
            requires_parameter,
            parameter_label: requires_parameter.then(|| "Load weight".to_string()),
            parameter_unit: requires_parameter.then(|| "kg".to_string()),
        }
    }

    fn catalog_control(id: i64, name: &str, requires_parameter: bool) -> Control {
        Control {
            id,
            name: name.to_string(),
            category: "Procedural".to_string(),
            description: String::new(),
            effectiveness: 2,
            requires_parameter,
            parameter_label: requires_parameter.then(|| "Hoist capacity".to_string()),
            parameter_unit: requires_parameter.then(|| "kg".to_string()),
            reference: None,
        }
    }

    fn test_catalog() -> Catalog {
        Catalog::new(
            vec![
                catalog_hazard(1, "Manual handling", true),
                catalog_hazard(2, "Stored energy release", false),
            ],
            vec![
                catalog_control(10, "Mechanical lifting aid", true),
                catalog_control(11, "Permit to Work", false),
            ],
            vec![],
            RiskMatrix::unchecked(vec![RiskBand {
                id: None,
                label: "ALL".to_string(),
                color: "#ccc".to_string(),
                guidance: None,
                min_score: 1,
                max_score: 25,
            }]),
        )
    }

    fn task_with_hazard() -> Task {
        let mut task: Task = serde_json::from_value(serde_json::json!({
            "id": 5,
            "sequence": 1,
            "activity": "Lift pump casing",
            "personnel_at_risk": "Fitter, Rigger",
            "likelihood": 3,
            "severity": 3,
        }))
        .unwrap();
        task.hazards.push(TaskHazard {
            hazard: catalog_hazard(1, "Manual handling", true),
            parameter_value: Some("40".to_string()),
            is_primary: false,
            notes: None,
            controls: ControlSet {
                existing: vec![TaskControl {
                    control: catalog_control(10, "Mechanical lifting aid", true),
                    parameter_value: Some("Hoist capacity: 500".to_string()),
                    phase: ControlPhase::Existing,
                }],
                additional: vec![],
            },
        });
        task
    }

    #[test]
    fn test_hazard_session_seeds_from_task() {
        let session = HazardSession::begin(&task_with_hazard());
        assert!(session.is_selected(1));
        assert_eq!(session.parameter_value(1), Some("40"));
    }

    #[test]
    fn test_uncheck_then_recheck_restores_parameter() {
        let mut session = HazardSession::begin(&task_with_hazard());
        session.uncheck(1);
        assert!(!session.is_selected(1));
        session.check(1);
        assert_eq!(session.parameter_value(1), Some("40"));
    }

    #[test]
    fn test_uncheck_then_commit_drops_hazard() {
        let mut session = HazardSession::begin(&task_with_hazard());
        session.uncheck(1);
        assert!(session.assignments().hazards.is_empty());
    }

    #[test]
    fn test_set_parameter_implicitly_checks() {
        let mut session = HazardSession::begin(&task_with_hazard());
        assert!(!session.is_selected(2));
        session.set_parameter(2, "n/a");
        assert!(session.is_selected(2));
        assert_eq!(session.parameter_value(2), Some("n/a"));
    }

    #[test]
    fn test_validate_blocks_missing_required_parameter() {
        let catalog = test_catalog();
        let mut session = HazardSession::begin(&task_with_hazard());
        session.set_parameter(1, "  ");
        let err = session.validate(&catalog).unwrap_err();
        assert_eq!(
            err,
            SelectionError::MissingParameter {
                hazard: "Manual handling".to_string(),
                field: "Load weight".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_passes_optional_parameter_hazard() {
        let catalog = test_catalog();
        let mut session = HazardSession::begin(&task_with_hazard());
        session.check(2);
        session.set_parameter(1, "40");
        assert!(session.validate(&catalog).is_ok());
    }

    #[test]
    fn test_hazard_payload_shape() {
        let session = HazardSession::begin(&task_with_hazard());
        let body = serde_json::to_value(session.assignments()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"hazards": [{"id": 1, "parameter_value": "40"}]})
        );
    }

    #[test]
    fn test_control_session_seeds_and_strips_label() {
        let task = task_with_hazard();
        let session =
            ControlSession::begin(&task, ControlPhase::Existing, ControlScope::PerHazard(1));
        assert!(session.is_selected(10));
        assert_eq!(session.parameter_value(10), Some("500"));
    }

    #[test]
    fn test_control_session_phases_are_independent() {
        let task = task_with_hazard();
        let existing =
            ControlSession::begin(&task, ControlPhase::Existing, ControlScope::PerHazard(1));
        let additional =
            ControlSession::begin(&task, ControlPhase::Additional, ControlScope::PerHazard(1));
        assert_eq!(existing.selected_ids(), [10]);
        assert!(additional.selected_ids().is_empty());
    }

    #[test]
    fn test_control_uncheck_clears_parameter() {
        let task = task_with_hazard();
        let mut session =
            ControlSession::begin(&task, ControlPhase::Existing, ControlScope::PerHazard(1));
        session.uncheck(10);
        session.check(10);
        assert_eq!(session.parameter_value(10), None);
    }

    #[test]
    fn test_control_payload_labels_parameters() {
        let catalog = test_catalog();
        let task = task_with_hazard();
        let mut session =
            ControlSession::begin(&task, ControlPhase::Existing, ControlScope::PerHazard(1));
        session.check(11);
        session.set_parameter(10, "500");
        let body = serde_json::to_value(session.assignments(&catalog)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "phase": "existing",
                "control_ids": [10, 11],
                "controls_with_parameters": [
                    {"id": 10, "parameter_value": "Hoist capacity: 500"},
                    {"id": 11}
                ]
            })
        );
    }

    #[test]
    fn test_control_session_missing_hazard_seeds_empty() {
        let task = task_with_hazard();
        let session =
            ControlSession::begin(&task, ControlPhase::Existing, ControlScope::PerHazard(99));
        assert!(session.selected_ids().is_empty());
    }

    #[test]
    fn test_personnel_round_trip() {
        let task = task_with_hazard();
        let mut session = PersonnelSession::begin(&task);
        assert_eq!(session.selected(), ["Fitter", "Rigger"]);
        session.uncheck("Rigger");
        session.check("Electrician");
        session.check("Supervisor");
        session.uncheck("Fitter");
        assert_eq!(session.encoded(), "Electrician, Supervisor");
    }

    #[test]
    fn test_personnel_insertion_order_preserved() {
        let mut task = task_with_hazard();
        task.personnel_at_risk = String::new();
        let mut session = PersonnelSession::begin(&task);
        session.check("Electrician");
        session.check("Supervisor");
        session.check("Electrician");
        assert_eq!(session.encoded(), "Electrician, Supervisor");
    }
}
