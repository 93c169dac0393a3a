//! Personnel-at-risk catalog entity

use serde::{Deserialize, Serialize};

/// A personnel role as served by `/api/catalog/personnel`.
///
/// Task assignments reference these by display name, not id, so a catalog
/// rename leaves existing assignments pointing at the old name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "crate::entities::null_to_default")]
    pub description: String,
}

/// Payload for creating or updating a catalog person.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersonDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
