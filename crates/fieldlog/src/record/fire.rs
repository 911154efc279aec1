//! Fire incident records.

use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{insert_unique, new_id, toggle, Draftable, Record};
use crate::error::{Error, Result};

/// Incident severity rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Minor incident.
    Low,
    /// Moderate incident.
    Moderate,
    /// Serious incident.
    High,
    /// Life-threatening or major loss incident.
    Critical,
}

impl Severity {
    /// All severities, mildest first.
    pub const ALL: [Severity; 4] = [Self::Low, Self::Moderate, Self::High, Self::Critical];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid_filter("severity", s))
    }
}

/// One entry on a fire incident timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Wall-clock time, `HH:MM`.
    pub time: String,
    /// What happened.
    pub event: String,
}

/// The editable part of a fire incident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FireReport {
    /// Kind of fire, e.g. "Structure Fire".
    pub fire_type: String,
    /// What crews found on arrival.
    pub arrival_conditions: String,
    /// Hazards present.
    pub hazards: String,
    /// Actions taken by crews.
    pub actions_taken: String,
    /// Free-form narrative.
    pub notes: String,
    /// Severity rating, if assessed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Responding units, e.g. "Engine 1".
    pub units: Vec<String>,
    /// Timeline of events.
    pub timeline: Vec<TimelineEvent>,
    /// Attached photos as base64 data URLs.
    pub photos: Vec<String>,
}

impl FireReport {
    /// Add a tag. Blank and duplicate tags are ignored.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        insert_unique(&mut self.tags, tag)
    }

    /// Remove a tag. Returns whether it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Add a custom unit. Blank and duplicate units are ignored.
    pub fn add_unit(&mut self, unit: &str) -> bool {
        insert_unique(&mut self.units, unit)
    }

    /// Toggle a preset unit. Returns whether the unit is now responding.
    pub fn toggle_unit(&mut self, unit: &str) -> bool {
        toggle(&mut self.units, unit)
    }

    /// Append a timeline event stamped `HH:MM`. Blank events are ignored.
    pub fn add_timeline_event(&mut self, event: &str, at: NaiveTime) -> bool {
        let event = event.trim();
        if event.is_empty() {
            return false;
        }
        self.timeline.push(TimelineEvent {
            time: at.format("%H:%M").to_string(),
            event: event.to_string(),
        });
        true
    }

    /// Remove the timeline event at `index`, if any.
    pub fn remove_timeline_event(&mut self, index: usize) -> Option<TimelineEvent> {
        (index < self.timeline.len()).then(|| self.timeline.remove(index))
    }

    /// Attach a photo.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhotoLimit`] when `limit` photos are already attached.
    pub fn add_photo(&mut self, data: String, limit: usize) -> Result<()> {
        if self.photos.len() >= limit {
            return Err(Error::PhotoLimit { limit });
        }
        self.photos.push(data);
        Ok(())
    }

    /// Remove the photo at `index`, if any.
    pub fn remove_photo(&mut self, index: usize) -> Option<String> {
        (index < self.photos.len()).then(|| self.photos.remove(index))
    }
}

/// A saved fire incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireIncident {
    /// Unique identifier.
    #[serde(default = "new_id")]
    pub id: String,
    /// When the incident was saved.
    pub timestamp: DateTime<Utc>,
    /// Incident details.
    #[serde(flatten)]
    pub report: FireReport,
}

impl FireIncident {
    /// Create an incident from a report, stamped with the current time.
    #[must_use]
    pub fn new(report: FireReport) -> Self {
        Self {
            id: new_id(),
            timestamp: Utc::now(),
            report,
        }
    }

    /// Replace the editable part, keeping id and timestamp.
    #[must_use]
    pub fn with_report(&self, report: FireReport) -> Self {
        Self {
            id: self.id.clone(),
            timestamp: self.timestamp,
            report,
        }
    }
}

impl Record for FireIncident {
    const STORAGE_KEY: &'static str = "fire_incidents";
    const KIND: &'static str = "fire";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Draftable for FireIncident {
    type Draft = FireReport;

    fn to_draft(&self) -> FireReport {
        self.report.clone()
    }

    fn from_draft(draft: FireReport) -> Self {
        Self::new(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 30).unwrap()
    }

    #[test]
    fn test_severity_parse_case_insensitive() {
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!(" Low ".parse::<Severity>().unwrap(), Severity::Low);
        assert!("extreme".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Critical);
    }

    #[test]
    fn test_tags_and_units() {
        let mut report = FireReport::default();
        assert!(report.add_tag(" Hazmat "));
        assert!(!report.add_tag("Hazmat"));
        assert!(report.remove_tag("Hazmat"));
        assert!(!report.remove_tag("Hazmat"));

        assert!(report.toggle_unit("Engine 1"));
        assert!(!report.add_unit("Engine 1"));
        assert!(report.add_unit("Tanker 7"));
        assert!(!report.toggle_unit("Engine 1"));
        assert_eq!(report.units, vec!["Tanker 7".to_string()]);
    }

    #[test]
    fn test_timeline_events() {
        let mut report = FireReport::default();
        assert!(report.add_timeline_event(" Water on fire ", at(19, 42)));
        assert!(!report.add_timeline_event("", at(19, 43)));
        assert_eq!(report.timeline[0].time, "19:42");
        assert_eq!(report.timeline[0].event, "Water on fire");

        assert!(report.remove_timeline_event(5).is_none());
        assert!(report.remove_timeline_event(0).is_some());
        assert!(report.timeline.is_empty());
    }

    #[test]
    fn test_photo_limit() {
        let mut report = FireReport::default();
        for i in 0..3 {
            report.add_photo(format!("data:image/jpeg;base64,{i}"), 3).unwrap();
        }
        let err = report.add_photo("extra".to_string(), 3).unwrap_err();
        assert!(matches!(err, Error::PhotoLimit { limit: 3 }));

        assert!(report.remove_photo(1).is_some());
        assert!(report.add_photo("extra".to_string(), 3).is_ok());
    }

    #[test]
    fn test_json_shape() {
        let mut report = FireReport {
            fire_type: "Vehicle Fire".to_string(),
            severity: Some(Severity::High),
            ..Default::default()
        };
        report.add_timeline_event("On scene", at(8, 5));
        let incident = FireIncident::new(report);
        let json = serde_json::to_value(&incident).unwrap();

        assert_eq!(json["fireType"], "Vehicle Fire");
        assert_eq!(json["severity"], "High");
        assert_eq!(json["timeline"][0]["time"], "08:05");
        assert!(json.get("actionsTaken").is_some());
    }

    #[test]
    fn test_parses_record_with_optional_fields_missing() {
        let raw = r#"{"id":"f1","timestamp":"2025-02-01T12:00:00Z","fireType":"Wildland Fire","arrivalConditions":"","hazards":"","actionsTaken":"","notes":""}"#;
        let incident: FireIncident = serde_json::from_str(raw).unwrap();
        assert_eq!(incident.id, "f1");
        assert!(incident.report.severity.is_none());
        assert!(incident.report.tags.is_empty());
    }

    #[test]
    fn test_with_report_keeps_identity() {
        let original = FireIncident::new(FireReport::default());
        let edited = original.with_report(FireReport {
            notes: "edited".to_string(),
            ..Default::default()
        });
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.timestamp, original.timestamp);
        assert_eq!(edited.report.notes, "edited");
    }
}
