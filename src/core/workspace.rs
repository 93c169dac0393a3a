//! Workspace - the loaded work order and its tasks
//!
//! The workspace is a cache of what the backend holds, never an
//! independent store: every mutation goes out as a REST call and the
//! task the server returns replaces the local copy wholesale (append if
//! somehow unknown). A failed call leaves the workspace exactly as it
//! was; the caller reports the error and the user retries manually.

use serde::Serialize;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::core::catalog::Catalog;
use crate::core::matrix::Rating;
use crate::core::selection::{
    ControlSession, HazardSession, PersonnelSession, SelectionError,
};
use crate::entities::task::{RiskPhase, Task};
use crate::entities::work_order::WorkOrder;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Body for `POST /api/tasks`. Matches the defaults a freshly added row
/// gets before the user edits it.
#[derive(Debug, Serialize)]
struct NewTask<'a> {
    work_order_number: &'a str,
    activity: &'a str,
    personnel_at_risk: &'a str,
    existing_controls_summary: &'a str,
    additional_controls_summary: &'a str,
    likelihood: Rating,
    severity: Rating,
    residual_likelihood: Rating,
    residual_severity: Rating,
    sequence: i64,
}

/// Partial update body for `PUT /api/tasks/{id}`. Only fields that are
/// set are serialized; the backend leaves the rest untouched.
#[derive(Debug, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hazard_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personnel_at_risk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_controls_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_controls_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual_likelihood: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual_severity: Option<Rating>,
    /// ISO date; empty string clears the date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_completion_date: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        serde_json::to_value(self)
            .map(|value| value.as_object().is_some_and(|map| map.is_empty()))
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone)]
pub struct Workspace {
    work_order: WorkOrder,
    tasks: Vec<Task>,
}

impl Workspace {
    pub fn new(work_order: WorkOrder, tasks: Vec<Task>) -> Self {
        Workspace { work_order, tasks }
    }

    /// Fetch a work order and its tasks.
    pub fn load(client: &ApiClient, number: &str) -> Result<Self, ApiError> {
        let (work_order, tasks) = client.work_order(number)?;
        Ok(Workspace::new(work_order, tasks))
    }

    /// Import a server-side method statement CSV into the work order.
    pub fn import_named(
        client: &ApiClient,
        number: &str,
        filename: &str,
        title: Option<&str>,
        replace: bool,
    ) -> Result<Self, ApiError> {
        let (work_order, tasks) = client.import_named(number, filename, title, replace)?;
        Ok(Workspace::new(work_order, tasks))
    }

    /// Upload and import a local method statement CSV.
    pub fn import_upload(
        client: &ApiClient,
        number: &str,
        file: &std::path::Path,
        title: Option<&str>,
        replace: bool,
    ) -> Result<Self, ApiError> {
        let (work_order, tasks) = client.import_upload(number, file, title, replace)?;
        Ok(Workspace::new(work_order, tasks))
    }

    pub fn work_order(&self) -> &WorkOrder {
        &self.work_order
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: i64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Tasks in sequence order. Equal sequences keep load order.
    pub fn ordered_tasks(&self) -> Vec<&Task> {
        let mut ordered: Vec<&Task> = self.tasks.iter().collect();
        ordered.sort_by_key(|task| task.sequence);
        ordered
    }

    /// Merge a task the server returned: replace by id, append if the id
    /// is unknown (should not happen in normal flow).
    pub fn apply(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Append a new task row with default content.
    pub fn add_task(&mut self, client: &ApiClient) -> Result<&Task, ApiError> {
        let body = NewTask {
            work_order_number: &self.work_order.number,
            activity: "New activity",
            personnel_at_risk: "",
            existing_controls_summary: "",
            additional_controls_summary: "",
            likelihood: Rating::default(),
            severity: Rating::default(),
            residual_likelihood: Rating::default(),
            residual_severity: Rating::default(),
            sequence: self.tasks.len() as i64 + 1,
        };
        let task = client.create_task(&body)?;
        self.tasks.push(task);
        Ok(self.tasks.last().expect("task just pushed"))
    }

    pub fn update_task(
        &mut self,
        client: &ApiClient,
        task_id: i64,
        patch: &TaskPatch,
    ) -> Result<(), ApiError> {
        let task = client.update_task(task_id, patch)?;
        self.apply(task);
        Ok(())
    }

    pub fn delete_task(&mut self, client: &ApiClient, task_id: i64) -> Result<(), ApiError> {
        client.delete_task(task_id)?;
        self.tasks.retain(|task| task.id != task_id);
        Ok(())
    }

    /// Set one phase's likelihood/severity pair.
    pub fn set_risk(
        &mut self,
        client: &ApiClient,
        task_id: i64,
        phase: RiskPhase,
        likelihood: Rating,
        severity: Rating,
    ) -> Result<(), ApiError> {
        let patch = match phase {
            RiskPhase::Initial => TaskPatch {
                likelihood: Some(likelihood),
                severity: Some(severity),
                ..TaskPatch::default()
            },
            RiskPhase::Residual => TaskPatch {
                residual_likelihood: Some(likelihood),
                residual_severity: Some(severity),
                ..TaskPatch::default()
            },
        };
        self.update_task(client, task_id, &patch)
    }

    /// Commit a hazard session: validate required parameters first (a
    /// violation aborts before any network call), then replace the
    /// task's hazard attachments server-side.
    pub fn commit_hazards(
        &mut self,
        client: &ApiClient,
        catalog: &Catalog,
        session: &HazardSession,
    ) -> Result<(), WorkspaceError> {
        session.validate(catalog)?;
        let task = client.put_task_hazards(session.task_id(), &session.assignments())?;
        self.apply(task);
        Ok(())
    }

    /// Commit a control session to the endpoint its scope selects.
    pub fn commit_controls(
        &mut self,
        client: &ApiClient,
        catalog: &Catalog,
        session: &ControlSession,
    ) -> Result<(), ApiError> {
        let task = client.put_task_controls(
            session.task_id(),
            session.scope(),
            &session.assignments(catalog),
        )?;
        self.apply(task);
        Ok(())
    }

    /// Commit a personnel session as a field-only task update.
    pub fn commit_personnel(
        &mut self,
        client: &ApiClient,
        session: &PersonnelSession,
    ) -> Result<(), ApiError> {
        let patch = TaskPatch {
            personnel_at_risk: Some(session.encoded()),
            ..TaskPatch::default()
        };
        self.update_task(client, session.task_id(), &patch)
    }
}
