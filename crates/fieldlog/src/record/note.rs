//! General-purpose notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, Record};

/// Where a note was written.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// A free-form note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier.
    pub id: String,
    /// Note title.
    #[serde(default)]
    pub title: String,
    /// Note body.
    pub content: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the note was written.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Position at the time of writing, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Note {
    /// Create a note stamped with the current time.
    ///
    /// Title and content are trimmed.
    #[must_use]
    pub fn new(title: &str, content: &str, tags: Vec<String>, location: Option<Location>) -> Self {
        Self {
            id: new_id(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            tags,
            timestamp: Utc::now(),
            location,
        }
    }
}

impl Record for Note {
    const STORAGE_KEY: &'static str = "notes";
    const KIND: &'static str = "note";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
