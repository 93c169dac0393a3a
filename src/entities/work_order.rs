//! Work order entity

use serde::{Deserialize, Serialize};

/// A work order as served by `/api/work-orders/{number}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: i64,
    pub number: String,
    pub title: String,
    #[serde(default, deserialize_with = "crate::entities::null_to_default")]
    pub description: String,
}
