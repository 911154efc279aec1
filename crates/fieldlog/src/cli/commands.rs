//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands and the
//! form arguments that edit a draft.

use std::path::PathBuf;

use chrono::NaiveTime;
use clap::{Args, Subcommand, ValueEnum};

use crate::config::IncidentConfig;
use crate::error::Result;
use crate::filter::{Criterion, DateFilter, FireFilter, RecordFilter, SortOrder};
use crate::record::{EmtReport, FireReport, Severity};

/// Note commands.
#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    /// Write a new note
    Add {
        /// Note title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Note body
        content: String,

        /// Tag the note (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Latitude where the note was written
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude where the note was written
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },

    /// List notes
    List {
        #[command(flatten)]
        filter: ListArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Show a single note
    Show {
        /// Note id
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Delete a note
    Delete {
        /// Note id
        id: String,
    },

    /// Export all notes as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Import notes from a JSON file
    Import {
        /// File holding a JSON array of notes
        file: PathBuf,
    },
}

/// EMT incident commands.
#[derive(Debug, Subcommand)]
pub enum EmtCommand {
    /// Fill in the new incident form, resuming any saved draft
    New {
        #[command(flatten)]
        form: EmtFormArgs,

        /// Keep the form as a draft instead of saving the incident
        #[arg(long)]
        draft: bool,
    },

    /// Edit a saved incident (the most recent one by default)
    Edit {
        /// Position in the incident list
        index: Option<usize>,

        #[command(flatten)]
        form: EmtFormArgs,
    },

    /// List incidents
    List {
        #[command(flatten)]
        filter: ListArgs,

        /// Only incidents with this condition (repeatable)
        #[arg(long = "condition", value_name = "CONDITION")]
        conditions: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Show a single incident
    Show {
        /// Position in the incident list
        index: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },
}

/// Fire incident commands.
#[derive(Debug, Subcommand)]
pub enum FireCommand {
    /// Fill in the new incident form, resuming any saved draft
    New {
        #[command(flatten)]
        form: FireFormArgs,

        /// Keep the form as a draft instead of saving the incident
        #[arg(long)]
        draft: bool,
    },

    /// Edit a saved incident
    Edit {
        /// Position in the incident list
        index: usize,

        #[command(flatten)]
        form: FireFormArgs,
    },

    /// List incidents
    List {
        #[command(flatten)]
        filter: ListArgs,

        /// Only incidents with this tag (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Only incidents of this fire type
        #[arg(long = "type", value_name = "TYPE")]
        fire_type: Option<String>,

        /// Only incidents of this severity
        #[arg(long, value_enum)]
        severity: Option<SeverityArg>,

        /// Only incidents this unit responded to
        #[arg(long)]
        unit: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Show a single incident
    Show {
        /// Position in the incident list
        index: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Delete an incident
    Delete {
        /// Incident id
        id: String,
    },

    /// Copy an incident into the next new incident form
    Duplicate {
        /// Position in the incident list
        index: usize,
    },
}

/// Draft commands.
#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Show the saved draft
    Show {
        /// Which form
        #[arg(value_enum)]
        kind: DraftKind,
    },

    /// Throw away the saved draft
    Discard {
        /// Which form
        #[arg(value_enum)]
        kind: DraftKind,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Search, date and sort arguments shared by every listing.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Case-insensitive text to look for
    #[arg(short, long)]
    pub search: Option<String>,

    /// Date window
    #[arg(short, long, value_enum, default_value = "all")]
    pub date: DateArg,

    /// Sort order (defaults to the configured order)
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,
}

impl ListArgs {
    /// Build the common filter, falling back to `default_sort`.
    #[must_use]
    pub fn to_filter(&self, default_sort: SortOrder) -> RecordFilter {
        RecordFilter::new()
            .search(self.search.clone().unwrap_or_default())
            .date(self.date.into())
            .sort(self.sort.map_or(default_sort, SortOrder::from))
    }
}

/// Build the fire history filter from list arguments.
#[must_use]
pub fn fire_filter(
    list: &ListArgs,
    tags: &[String],
    fire_type: Option<String>,
    severity: Option<SeverityArg>,
    unit: Option<String>,
    default_sort: SortOrder,
) -> FireFilter {
    let mut common = list.to_filter(default_sort);
    common.tags.extend(tags.iter().cloned());
    FireFilter {
        common,
        fire_type: Criterion::from(fire_type),
        severity: Criterion::from(severity.map(Severity::from)),
        unit: Criterion::from(unit),
    }
}

/// Changes to an EMT incident form.
#[derive(Debug, Clone, Default, Args)]
pub struct EmtFormArgs {
    /// Replace the narrative
    #[arg(long)]
    pub notes: Option<String>,

    /// Log a configured quick-action event with the current time (repeatable)
    #[arg(long = "event", value_name = "LABEL")]
    pub events: Vec<String>,

    /// Log a vitals reading (repeatable)
    #[arg(long = "vital", value_name = "READING")]
    pub vitals: Vec<String>,

    /// Toggle a configured patient condition (repeatable)
    #[arg(long = "condition", value_name = "CONDITION")]
    pub conditions: Vec<String>,
}

impl EmtFormArgs {
    /// Apply the changes to a report.
    ///
    /// Events and conditions must name a configured quick action or chip.
    /// Nothing is changed if any of them does not.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownChoice`] for an unconfigured event or
    /// condition.
    pub fn apply(
        &self,
        report: &mut EmtReport,
        now: NaiveTime,
        presets: &IncidentConfig,
    ) -> Result<()> {
        let events = resolve_all(&self.events, |e| presets.emt_event(e))?;
        let conditions = resolve_all(&self.conditions, |c| presets.condition(c))?;

        if let Some(notes) = &self.notes {
            report.notes.clone_from(notes);
        }
        for label in &events {
            report.add_event(label, now);
        }
        for reading in &self.vitals {
            report.add_vital(reading);
        }
        for condition in &conditions {
            report.toggle_condition(condition);
        }
        Ok(())
    }
}

fn resolve_all(
    values: &[String],
    resolve: impl Fn(&str) -> Result<String>,
) -> Result<Vec<String>> {
    values.iter().map(|v| resolve(v)).collect()
}

/// Changes to a fire incident form.
#[derive(Debug, Clone, Default, Args)]
pub struct FireFormArgs {
    /// Fire type, one of the configured types
    #[arg(long = "type", value_name = "TYPE")]
    pub fire_type: Option<String>,

    /// Conditions on arrival
    #[arg(long)]
    pub arrival: Option<String>,

    /// Hazards present
    #[arg(long)]
    pub hazards: Option<String>,

    /// Actions taken
    #[arg(long)]
    pub actions: Option<String>,

    /// Additional notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Severity
    #[arg(long, value_enum)]
    pub severity: Option<SeverityArg>,

    /// Add a tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Remove a tag (repeatable)
    #[arg(long = "untag", value_name = "TAG")]
    pub untags: Vec<String>,

    /// Toggle a preset unit or add a custom one (repeatable)
    #[arg(long = "unit", value_name = "UNIT")]
    pub units: Vec<String>,

    /// Log a timeline event stamped with the current time (repeatable)
    #[arg(long = "event", value_name = "TEXT")]
    pub events: Vec<String>,

    /// Attach a photo as a data URL (repeatable)
    #[arg(long = "photo", value_name = "DATA_URL")]
    pub photos: Vec<String>,
}

impl FireFormArgs {
    /// Apply the changes to a report.
    ///
    /// The fire type must be a configured type. A preset unit is toggled;
    /// any other unit is added as a custom unit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownChoice`] for an unconfigured fire type,
    /// leaving the report untouched, or [`crate::Error::PhotoLimit`] if the
    /// photos would exceed the configured limit.
    pub fn apply(
        &self,
        report: &mut FireReport,
        now: NaiveTime,
        presets: &IncidentConfig,
    ) -> Result<()> {
        if let Some(fire_type) = &self.fire_type {
            report.fire_type = presets.fire_type(fire_type)?;
        }
        let text_fields = [
            (&self.arrival, &mut report.arrival_conditions),
            (&self.hazards, &mut report.hazards),
            (&self.actions, &mut report.actions_taken),
            (&self.notes, &mut report.notes),
        ];
        for (new, field) in text_fields {
            if let Some(value) = new {
                field.clone_from(value);
            }
        }
        if let Some(severity) = self.severity {
            report.severity = Some(severity.into());
        }
        for tag in &self.tags {
            report.add_tag(tag);
        }
        for tag in &self.untags {
            report.remove_tag(tag);
        }
        for unit in &self.units {
            match presets.preset_unit(unit) {
                Some(preset) => report.toggle_unit(preset),
                None => report.add_unit(unit),
            };
        }
        for event in &self.events {
            report.add_timeline_event(event, now);
        }
        for photo in &self.photos {
            report.add_photo(photo.clone(), presets.max_photos)?;
        }
        Ok(())
    }
}

/// Which draft to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DraftKind {
    /// The EMT incident form
    Emt,
    /// The fire incident form
    Fire,
}

/// Severity argument for forms and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    /// Low
    Low,
    /// Moderate
    Moderate,
    /// High
    High,
    /// Critical
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Low => Self::Low,
            SeverityArg::Moderate => Self::Moderate,
            SeverityArg::High => Self::High,
            SeverityArg::Critical => Self::Critical,
        }
    }
}

/// Date window argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DateArg {
    /// No restriction
    #[default]
    All,
    /// Today only
    Today,
    /// The last 7 days
    Last7,
    /// The last 30 days
    Last30,
}

impl From<DateArg> for DateFilter {
    fn from(arg: DateArg) -> Self {
        match arg {
            DateArg::All => Self::All,
            DateArg::Today => Self::Today,
            DateArg::Last7 => Self::Last7Days,
            DateArg::Last30 => Self::Last30Days,
        }
    }
}

/// Sort order argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Most recent first
    Newest,
    /// Oldest first
    Oldest,
    /// Stored order
    Stored,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Newest => Self::Newest,
            SortArg::Oldest => Self::Oldest,
            SortArg::Stored => Self::Stored,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 5, 30).unwrap()
    }

    #[test]
    fn test_severity_arg_conversion() {
        assert_eq!(Severity::from(SeverityArg::Low), Severity::Low);
        assert_eq!(Severity::from(SeverityArg::Critical), Severity::Critical);
    }

    #[test]
    fn test_date_arg_conversion() {
        assert_eq!(DateFilter::from(DateArg::default()), DateFilter::All);
        assert_eq!(DateFilter::from(DateArg::Last7), DateFilter::Last7Days);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_list_args_default_sort() {
        let args = ListArgs {
            search: Some("Smoke".to_string()),
            date: DateArg::Today,
            sort: None,
        };
        let filter = args.to_filter(SortOrder::Stored);
        assert_eq!(filter.search_text, "Smoke");
        assert_eq!(filter.date, DateFilter::Today);
        assert_eq!(filter.sort, SortOrder::Stored);

        let args = ListArgs {
            sort: Some(SortArg::Oldest),
            ..args
        };
        assert_eq!(args.to_filter(SortOrder::Stored).sort, SortOrder::Oldest);
    }

    #[test]
    fn test_fire_filter_from_args() {
        let list = ListArgs {
            search: None,
            date: DateArg::All,
            sort: None,
        };
        let filter = fire_filter(
            &list,
            &["Hazmat".to_string()],
            Some("Vehicle Fire".to_string()),
            Some(SeverityArg::High),
            None,
            SortOrder::Newest,
        );
        assert!(filter.common.tags.contains("Hazmat"));
        assert_eq!(filter.fire_type, Criterion::Only("Vehicle Fire".to_string()));
        assert_eq!(filter.severity, Criterion::Only(Severity::High));
        assert!(filter.unit.is_all());
    }

    #[test]
    fn test_emt_form_apply() {
        let presets = IncidentConfig::default();
        let form = EmtFormArgs {
            notes: Some("Fall from ladder".to_string()),
            events: vec!["arrival".to_string()],
            vitals: vec!["BP 120/80".to_string(), "  ".to_string()],
            conditions: vec!["Trauma".to_string()],
        };
        let mut report = EmtReport::default();
        form.apply(&mut report, noon(), &presets).unwrap();

        assert_eq!(report.notes, "Fall from ladder");
        assert_eq!(report.timeline, vec!["Arrival — 12:05:30".to_string()]);
        assert_eq!(report.vitals, vec!["BP 120/80".to_string()]);
        assert_eq!(report.conditions, vec!["Trauma".to_string()]);

        // Applying again toggles the condition off.
        let toggle = EmtFormArgs {
            conditions: vec!["trauma".to_string()],
            ..Default::default()
        };
        toggle.apply(&mut report, noon(), &presets).unwrap();
        assert!(report.conditions.is_empty());
        assert_eq!(report.notes, "Fall from ladder");
    }

    #[test]
    fn test_emt_form_rejects_unknown_choices() {
        let presets = IncidentConfig::default();
        let mut report = EmtReport::default();

        let form = EmtFormArgs {
            notes: Some("changed".to_string()),
            events: vec!["Coffee Break".to_string()],
            ..Default::default()
        };
        let err = form.apply(&mut report, noon(), &presets).unwrap_err();
        assert!(matches!(err, crate::Error::UnknownChoice { field: "EMT event", .. }));
        assert_eq!(report, EmtReport::default());

        let form = EmtFormArgs {
            conditions: vec!["Hungry".to_string()],
            ..Default::default()
        };
        assert!(form.apply(&mut report, noon(), &presets).is_err());
        assert!(report.conditions.is_empty());
    }

    #[test]
    fn test_fire_form_apply() {
        let presets = IncidentConfig::default();
        let form = FireFormArgs {
            fire_type: Some("structure fire".to_string()),
            severity: Some(SeverityArg::Moderate),
            tags: vec!["Hazmat".to_string()],
            units: vec!["Engine 1".to_string(), "Rescue 9".to_string()],
            events: vec!["Water on fire".to_string()],
            ..Default::default()
        };
        let mut report = FireReport::default();
        form.apply(&mut report, noon(), &presets).unwrap();

        assert_eq!(report.fire_type, "Structure Fire");
        assert_eq!(report.severity, Some(Severity::Moderate));
        assert_eq!(report.tags, vec!["Hazmat".to_string()]);
        assert_eq!(report.units, vec!["Engine 1".to_string(), "Rescue 9".to_string()]);
        assert_eq!(report.timeline[0].time, "12:05");
    }

    #[test]
    fn test_fire_form_units_toggle_presets_only() {
        let presets = IncidentConfig::default();
        let form = FireFormArgs {
            units: vec!["Engine 1".to_string(), "Rescue 9".to_string()],
            ..Default::default()
        };
        let mut report = FireReport::default();
        form.apply(&mut report, noon(), &presets).unwrap();
        form.apply(&mut report, noon(), &presets).unwrap();

        assert_eq!(report.units, vec!["Rescue 9".to_string()]);
    }

    #[test]
    fn test_fire_form_rejects_unknown_type() {
        let presets = IncidentConfig::default();
        let form = FireFormArgs {
            fire_type: Some("Kitchen Fire".to_string()),
            notes: Some("ignored".to_string()),
            ..Default::default()
        };
        let mut report = FireReport::default();

        assert!(form.apply(&mut report, noon(), &presets).is_err());
        assert_eq!(report, FireReport::default());
    }

    #[test]
    fn test_fire_form_photo_limit() {
        let presets = IncidentConfig {
            max_photos: 1,
            ..Default::default()
        };
        let form = FireFormArgs {
            photos: vec!["data:a".into(), "data:b".into()],
            ..Default::default()
        };
        let mut report = FireReport::default();
        assert!(form.apply(&mut report, noon(), &presets).is_err());
        assert_eq!(report.photos.len(), 1);
    }
}
