//! HTTP client for the RAMS backend
//!
//! Thin blocking wrapper over ureq. Every mutating endpoint answers with
//! the full updated record (the backend is the source of truth), so the
//! typed methods here return the decoded entity for the caller to merge.
//! Non-2xx responses surface the server's body text as the error message;
//! transport failures and decode failures are kept distinct.

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::matrix::RiskBand;
use crate::core::selection::{ControlAssignments, ControlScope, HazardAssignments};
use crate::entities::control::{Control, ControlDraft};
use crate::entities::hazard::{Hazard, HazardDraft};
use crate::entities::person::{Person, PersonDraft};
use crate::entities::task::Task;
use crate::entities::work_order::WorkOrder;

const MULTIPART_BOUNDARY: &str = "----rams-toolkit-upload";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered outside 2xx; `message` is its body text.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blocking client bound to one backend base URL.
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        ApiClient {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn handle(result: Result<ureq::Response, ureq::Error>) -> Result<ureq::Response, ApiError> {
        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                let message = if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body
                };
                Err(ApiError::Http { status, message })
            }
            Err(ureq::Error::Transport(err)) => Err(ApiError::Transport(err.to_string())),
        }
    }

    fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ApiError> {
        let body = response.into_string()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = Self::handle(self.agent.get(&self.url(path)).call())?;
        Self::decode(response)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let payload = serde_json::to_string(body)?;
        let request = self
            .agent
            .request(method, &self.url(path))
            .set("content-type", "application/json");
        let response = Self::handle(request.send_string(&payload))?;
        Self::decode(response)
    }

    fn delete(&self, path: &str) -> Result<(), ApiError> {
        Self::handle(self.agent.delete(&self.url(path)).call())?;
        Ok(())
    }

    // Catalog reads

    pub fn list_hazards(&self) -> Result<Vec<Hazard>, ApiError> {
        #[derive(Deserialize)]
        struct Envelope {
            hazards: Vec<Hazard>,
        }
        Ok(self.get_json::<Envelope>("/api/catalog/hazards")?.hazards)
    }

    pub fn list_controls(&self) -> Result<Vec<Control>, ApiError> {
        #[derive(Deserialize)]
        struct Envelope {
            controls: Vec<Control>,
        }
        Ok(self.get_json::<Envelope>("/api/catalog/controls")?.controls)
    }

    pub fn list_personnel(&self) -> Result<Vec<Person>, ApiError> {
        #[derive(Deserialize)]
        struct Envelope {
            personnel: Vec<Person>,
        }
        Ok(self.get_json::<Envelope>("/api/catalog/personnel")?.personnel)
    }

    pub fn risk_matrix_bands(&self) -> Result<Vec<RiskBand>, ApiError> {
        #[derive(Deserialize)]
        struct Envelope {
            risk_categories: Vec<RiskBand>,
        }
        Ok(self.get_json::<Envelope>("/api/risk-matrix")?.risk_categories)
    }

    // Work orders

    pub fn work_order(&self, number: &str) -> Result<(WorkOrder, Vec<Task>), ApiError> {
        let envelope: WorkOrderEnvelope =
            self.get_json(&format!("/api/work-orders/{}", number))?;
        Ok((envelope.work_order, envelope.tasks))
    }

    /// Import a method statement CSV already on the server.
    pub fn import_named(
        &self,
        number: &str,
        filename: &str,
        title: Option<&str>,
        replace: bool,
    ) -> Result<(WorkOrder, Vec<Task>), ApiError> {
        #[derive(Serialize)]
        struct Body<'a> {
            filename: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            title: Option<&'a str>,
            replace: bool,
        }
        let envelope: WorkOrderEnvelope = self.send_json(
            "POST",
            &format!("/api/work-orders/{}/import", number),
            &Body {
                filename,
                title,
                replace,
            },
        )?;
        Ok((envelope.work_order, envelope.tasks))
    }

    /// Import a local method statement CSV via multipart upload.
    pub fn import_upload(
        &self,
        number: &str,
        file: &Path,
        title: Option<&str>,
        replace: bool,
    ) -> Result<(WorkOrder, Vec<Task>), ApiError> {
        let filename = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        let contents = std::fs::read(file)?;

        let mut body: Vec<u8> = Vec::with_capacity(contents.len() + 512);
        push_field(&mut body, "replace", if replace { "true" } else { "false" });
        if let Some(title) = title {
            push_field(&mut body, "title", title);
        }
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                MULTIPART_BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(&contents);
        body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

        let request = self
            .agent
            .post(&self.url(&format!("/api/work-orders/{}/import", number)))
            .set(
                "content-type",
                &format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
            );
        let response = Self::handle(request.send_bytes(&body))?;
        let envelope: WorkOrderEnvelope = Self::decode(response)?;
        Ok((envelope.work_order, envelope.tasks))
    }

    // Tasks

    pub fn create_task(&self, body: &impl Serialize) -> Result<Task, ApiError> {
        Ok(self
            .send_json::<TaskEnvelope>("POST", "/api/tasks", body)?
            .task)
    }

    pub fn update_task(&self, task_id: i64, body: &impl Serialize) -> Result<Task, ApiError> {
        Ok(self
            .send_json::<TaskEnvelope>("PUT", &format!("/api/tasks/{}", task_id), body)?
            .task)
    }

    pub fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/tasks/{}", task_id))
    }

    pub fn put_task_hazards(
        &self,
        task_id: i64,
        assignments: &HazardAssignments,
    ) -> Result<Task, ApiError> {
        Ok(self
            .send_json::<TaskEnvelope>(
                "PUT",
                &format!("/api/tasks/{}/hazards", task_id),
                assignments,
            )?
            .task)
    }

    pub fn put_task_controls(
        &self,
        task_id: i64,
        scope: ControlScope,
        assignments: &ControlAssignments,
    ) -> Result<Task, ApiError> {
        let path = match scope {
            ControlScope::Legacy => format!("/api/tasks/{}/controls", task_id),
            ControlScope::PerHazard(hazard_id) => {
                format!("/api/tasks/{}/hazards/{}/controls", task_id, hazard_id)
            }
        };
        Ok(self.send_json::<TaskEnvelope>("PUT", &path, assignments)?.task)
    }

    // Catalog CRUD

    pub fn create_hazard(&self, draft: &HazardDraft) -> Result<Hazard, ApiError> {
        Ok(self
            .send_json::<HazardEnvelope>("POST", "/api/catalog/hazards", draft)?
            .hazard)
    }

    pub fn update_hazard(&self, hazard_id: i64, draft: &HazardDraft) -> Result<Hazard, ApiError> {
        Ok(self
            .send_json::<HazardEnvelope>(
                "PUT",
                &format!("/api/catalog/hazards/{}", hazard_id),
                draft,
            )?
            .hazard)
    }

    pub fn delete_hazard(&self, hazard_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/catalog/hazards/{}", hazard_id))
    }

    pub fn create_control(&self, draft: &ControlDraft) -> Result<Control, ApiError> {
        Ok(self
            .send_json::<ControlEnvelope>("POST", "/api/catalog/controls", draft)?
            .control)
    }

    pub fn update_control(
        &self,
        control_id: i64,
        draft: &ControlDraft,
    ) -> Result<Control, ApiError> {
        Ok(self
            .send_json::<ControlEnvelope>(
                "PUT",
                &format!("/api/catalog/controls/{}", control_id),
                draft,
            )?
            .control)
    }

    pub fn delete_control(&self, control_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/catalog/controls/{}", control_id))
    }

    pub fn create_person(&self, draft: &PersonDraft) -> Result<Person, ApiError> {
        Ok(self
            .send_json::<PersonEnvelope>("POST", "/api/catalog/personnel", draft)?
            .personnel)
    }

    pub fn update_person(&self, person_id: i64, draft: &PersonDraft) -> Result<Person, ApiError> {
        Ok(self
            .send_json::<PersonEnvelope>(
                "PUT",
                &format!("/api/catalog/personnel/{}", person_id),
                draft,
            )?
            .personnel)
    }

    pub fn delete_person(&self, person_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/api/catalog/personnel/{}", person_id))
    }
}

fn push_field(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            MULTIPART_BOUNDARY, name, value
        )
        .as_bytes(),
    );
}

#[derive(Deserialize)]
struct WorkOrderEnvelope {
    work_order: WorkOrder,
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct TaskEnvelope {
    task: Task,
}

#[derive(Deserialize)]
struct HazardEnvelope {
    hazard: Hazard,
}

#[derive(Deserialize)]
struct ControlEnvelope {
    control: Control,
}

#[derive(Deserialize)]
struct PersonEnvelope {
    personnel: Person,
}
