//! Record types for fieldlog.
//!
//! A record is a note, an EMT incident, or a fire incident. Each kind is
//! persisted as one JSON array under its own storage key, using the same
//! camelCase field names the browser version of the tool wrote.

mod emt;
mod fire;
mod note;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use emt::{EmtIncident, EmtReport};
pub use fire::{FireIncident, FireReport, Severity, TimelineEvent};
pub use note::{Location, Note};

/// Fire types offered by the fire incident form.
pub const FIRE_TYPES: &[&str] = &[
    "Structure Fire",
    "Vehicle Fire",
    "Wildland Fire",
    "Electrical Fire",
    "Alarm Activation",
];

/// Responding units offered as quick toggles on the fire incident form.
pub const PRESET_UNITS: &[&str] = &[
    "Engine 1",
    "Engine 2",
    "Ladder 3",
    "Battalion Chief",
    "Medic Unit",
];

/// Patient condition chips for EMT incidents.
pub const CONDITIONS: &[&str] = &[
    "Conscious",
    "Unconscious",
    "Breathing",
    "Not Breathing",
    "Bleeding",
    "Shock",
    "Cardiac",
    "Trauma",
];

/// Quick-action timeline labels for EMT incidents.
pub const EMT_EVENTS: &[&str] = &[
    "Arrival",
    "Patient Contact",
    "Vitals Taken",
    "Transport",
    "Hospital Arrival",
];

/// A persisted record kind.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Storage key holding the JSON array of all records of this kind.
    const STORAGE_KEY: &'static str;

    /// Short name used in keys, logs and errors.
    const KIND: &'static str;

    /// Stable identifier of this record.
    fn id(&self) -> &str;

    /// When this record was created.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// A record kind that can be edited through an autosaved draft.
///
/// The draft is everything the form edits: the record minus its id and
/// creation timestamp.
pub trait Draftable: Record {
    /// The editable part of the record.
    type Draft: Clone + Default + PartialEq + Serialize + DeserializeOwned;

    /// Copy the editable part of this record.
    fn to_draft(&self) -> Self::Draft;

    /// Build a new record from a draft, with a fresh id and the current time.
    fn from_draft(draft: Self::Draft) -> Self;
}

/// Generate a fresh record id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Insert a trimmed value into an ordered set.
///
/// Returns `false` when the value is blank or already present.
pub(crate) fn insert_unique(values: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || values.iter().any(|v| v == value) {
        return false;
    }
    values.push(value.to_string());
    true
}

/// Add `value` if absent, remove it if present. Returns whether it is now present.
pub(crate) fn toggle(values: &mut Vec<String>, value: &str) -> bool {
    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
        false
    } else {
        values.push(value.to_string());
        true
    }
}
