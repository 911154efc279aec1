//! Filtering, searching and sorting of record lists.
//!
//! The history screens narrow a record list with a combination of
//! predicates, all ANDed together:
//!
//! - a date window ([`DateFilter`]),
//! - a tag set the record must contain entirely,
//! - equality filters with an `all` sentinel ([`Criterion`]), fire only,
//! - a case-insensitive substring search over the record's text fields.
//!
//! Matches keep the index of the record in the unfiltered list so callers
//! can open or edit the right one. Sorting is stable.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use fieldlog::filter::{DateFilter, RecordFilter, SortOrder};
//! use fieldlog::record::{EmtIncident, EmtReport};
//!
//! let incidents = vec![EmtIncident::new(EmtReport {
//!     notes: "Fall from ladder".to_string(),
//!     conditions: vec!["Trauma".to_string()],
//!     ..Default::default()
//! })];
//!
//! let filter = RecordFilter::new()
//!     .search("LADDER")
//!     .tag("Trauma")
//!     .date(DateFilter::Today)
//!     .sort(SortOrder::Newest);
//!
//! let matches = filter.apply(&incidents, &Utc::now());
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].index, 0);
//! ```

mod criteria;

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone};

pub use criteria::{Criterion, DateFilter, SortOrder};

use crate::record::{EmtIncident, FireIncident, Note, Record, Severity};

/// A record that the history filters can inspect.
pub trait Filterable: Record {
    /// The tags the tag filter checks (conditions for EMT incidents).
    fn tag_set(&self) -> &[String];

    /// Text fields the search box looks through.
    fn search_fields(&self) -> Vec<&str>;
}

impl Filterable for EmtIncident {
    fn tag_set(&self) -> &[String] {
        &self.report.conditions
    }

    fn search_fields(&self) -> Vec<&str> {
        let r = &self.report;
        std::iter::once(r.notes.as_str())
            .chain(r.timeline.iter().map(String::as_str))
            .chain(r.vitals.iter().map(String::as_str))
            .chain(r.conditions.iter().map(String::as_str))
            .collect()
    }
}

impl Filterable for FireIncident {
    fn tag_set(&self) -> &[String] {
        &self.report.tags
    }

    fn search_fields(&self) -> Vec<&str> {
        let r = &self.report;
        [
            r.fire_type.as_str(),
            r.arrival_conditions.as_str(),
            r.hazards.as_str(),
            r.actions_taken.as_str(),
            r.notes.as_str(),
        ]
        .into_iter()
        .chain(r.timeline.iter().map(|t| t.event.as_str()))
        .chain(r.tags.iter().map(String::as_str))
        .chain(r.units.iter().map(String::as_str))
        .collect()
    }
}

impl Filterable for Note {
    fn tag_set(&self) -> &[String] {
        &self.tags
    }

    fn search_fields(&self) -> Vec<&str> {
        [self.title.as_str(), self.content.as_str()]
            .into_iter()
            .chain(self.tags.iter().map(String::as_str))
            .collect()
    }
}

/// A record that passed a filter, with its position in the original list.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a, R> {
    /// Index in the unfiltered list.
    pub index: usize,
    /// The matching record.
    pub record: &'a R,
}

/// Filters shared by every history screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Case-insensitive search text. Empty matches everything.
    pub search_text: String,
    /// Tags a record must all carry.
    pub tags: BTreeSet<String>,
    /// Date window.
    pub date: DateFilter,
    /// Result ordering.
    pub sort: SortOrder,
}

impl RecordFilter {
    /// A filter that keeps everything, newest first.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text.
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Require a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Set the date window.
    #[must_use]
    pub fn date(mut self, date: DateFilter) -> Self {
        self.date = date;
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Add the tag if it is not required yet, remove it otherwise.
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.tags.remove(tag) {
            self.tags.insert(tag.to_string());
        }
    }

    /// Check whether a single record passes every predicate.
    #[must_use]
    pub fn matches<R: Filterable, Tz: TimeZone>(&self, record: &R, now: &DateTime<Tz>) -> bool {
        self.date.matches(record.timestamp(), now)
            && self.matches_tags(record)
            && matches_text(record, &self.search_text.to_lowercase())
    }

    /// Filter and sort a record list.
    #[must_use]
    pub fn apply<'a, R: Filterable, Tz: TimeZone>(
        &self,
        records: &'a [R],
        now: &DateTime<Tz>,
    ) -> Vec<Match<'a, R>> {
        let needle = self.search_text.to_lowercase();
        select(records, self.sort, |r| {
            self.date.matches(r.timestamp(), now)
                && self.matches_tags(r)
                && matches_text(r, &needle)
        })
    }

    fn matches_tags<R: Filterable>(&self, record: &R) -> bool {
        let have = record.tag_set();
        self.tags.iter().all(|t| have.contains(t))
    }
}

/// Filters for the fire incident history screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FireFilter {
    /// Search, tag, date and sort settings.
    pub common: RecordFilter,
    /// Fire type equality filter.
    pub fire_type: Criterion<String>,
    /// Severity equality filter.
    pub severity: Criterion<Severity>,
    /// Responding unit filter.
    pub unit: Criterion<String>,
}

impl FireFilter {
    /// A filter that keeps everything, newest first.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a single incident passes every predicate.
    #[must_use]
    pub fn matches<Tz: TimeZone>(&self, incident: &FireIncident, now: &DateTime<Tz>) -> bool {
        self.matches_fields(incident) && self.common.matches(incident, now)
    }

    /// Filter and sort a fire incident list.
    #[must_use]
    pub fn apply<'a, Tz: TimeZone>(
        &self,
        incidents: &'a [FireIncident],
        now: &DateTime<Tz>,
    ) -> Vec<Match<'a, FireIncident>> {
        let needle = self.common.search_text.to_lowercase();
        select(incidents, self.common.sort, |i| {
            self.matches_fields(i)
                && self.common.date.matches(i.timestamp, now)
                && self.common.matches_tags(i)
                && matches_text(i, &needle)
        })
    }

    fn matches_fields(&self, incident: &FireIncident) -> bool {
        let r = &incident.report;
        self.fire_type.matches(&r.fire_type)
            && self.severity.matches_option(r.severity.as_ref())
            && self.unit.matches_any(&r.units)
    }
}

/// Unique tags across `records`, in order of first appearance.
#[must_use]
pub fn collect_tags<R: Filterable>(records: &[R]) -> Vec<String> {
    unique(records.iter().flat_map(|r| r.tag_set().iter()))
}

/// Unique responding units across `incidents`, in order of first appearance.
#[must_use]
pub fn collect_units(incidents: &[FireIncident]) -> Vec<String> {
    unique(incidents.iter().flat_map(|i| i.report.units.iter()))
}

fn unique<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for value in values {
        if seen.insert(value) {
            out.push(value.clone());
        }
    }
    out
}

/// `needle` must already be lowercase.
fn matches_text<R: Filterable>(record: &R, needle: &str) -> bool {
    needle.is_empty()
        || record
            .search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
}

fn select<'a, R: Record>(
    records: &'a [R],
    sort: SortOrder,
    keep: impl Fn(&R) -> bool,
) -> Vec<Match<'a, R>> {
    let mut matches: Vec<_> = records
        .iter()
        .enumerate()
        .filter(|&(_, r)| keep(r))
        .map(|(index, record)| Match { index, record })
        .collect();

    // sort_by is stable, so equal timestamps keep their stored order.
    match sort {
        SortOrder::Newest => {
            matches.sort_by(|a, b| b.record.timestamp().cmp(&a.record.timestamp()));
        }
        SortOrder::Oldest => {
            matches.sort_by(|a, b| a.record.timestamp().cmp(&b.record.timestamp()));
        }
        SortOrder::Stored => {}
    }
    matches
}
