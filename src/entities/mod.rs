//! Entity type definitions

pub mod control;
pub mod hazard;
pub mod person;
pub mod task;
pub mod work_order;

pub use control::{Control, ControlDraft, ControlPhase};
pub use hazard::{Hazard, HazardDraft};
pub use person::{Person, PersonDraft};
pub use task::{ControlSet, RiskPhase, Task, TaskControl, TaskHazard};
pub use work_order::WorkOrder;

use serde::{Deserialize, Deserializer};

/// The backend serializes empty text columns as JSON null; fold those into
/// the type's default instead of failing or forcing Option everywhere.
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
