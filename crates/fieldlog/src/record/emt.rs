//! EMT incident records.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, toggle, Draftable, Record};

/// The editable part of an EMT incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmtReport {
    /// Timestamped events, e.g. `"Arrival — 19:42:10"`.
    pub timeline: Vec<String>,
    /// Free-form narrative.
    pub notes: String,
    /// Logged vitals, e.g. `"BP 120/80"`.
    pub vitals: Vec<String>,
    /// Patient condition tags.
    pub conditions: Vec<String>,
}

impl EmtReport {
    /// Append a quick-action event stamped with the given wall-clock time.
    pub fn add_event(&mut self, label: &str, at: NaiveTime) {
        self.timeline
            .push(format!("{} — {}", label.trim(), at.format("%H:%M:%S")));
    }

    /// Log a vitals reading. Blank readings are ignored.
    pub fn add_vital(&mut self, reading: &str) -> bool {
        let reading = reading.trim();
        if reading.is_empty() {
            return false;
        }
        self.vitals.push(reading.to_string());
        true
    }

    /// Toggle a condition tag. Returns whether the condition is now set.
    pub fn toggle_condition(&mut self, condition: &str) -> bool {
        toggle(&mut self.conditions, condition)
    }
}

/// A saved EMT incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmtIncident {
    /// Unique identifier. Older saves had none; one is assigned on load.
    #[serde(default = "new_id")]
    pub id: String,
    /// When the incident was saved.
    pub created_at: DateTime<Utc>,
    /// Incident details.
    #[serde(flatten)]
    pub report: EmtReport,
}

impl EmtIncident {
    /// Create an incident from a report, stamped with the current time.
    #[must_use]
    pub fn new(report: EmtReport) -> Self {
        Self {
            id: new_id(),
            created_at: Utc::now(),
            report,
        }
    }
}

impl Record for EmtIncident {
    const STORAGE_KEY: &'static str = "emt_incidents";
    const KIND: &'static str = "emt";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Draftable for EmtIncident {
    type Draft = EmtReport;

    fn to_draft(&self) -> EmtReport {
        self.report.clone()
    }

    fn from_draft(draft: EmtReport) -> Self {
        Self::new(draft)
    }
}
