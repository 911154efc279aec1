//! The application controller.
//!
//! [`Logbook`] owns the storage handle, the three record lists and the
//! draft slots. Every user action is one method that mutates state,
//! persists it and returns the screen to show next.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::draft::Drafts;
use crate::error::{Error, Result};
use crate::filter::{FireFilter, Match, RecordFilter};
use crate::record::{EmtIncident, EmtReport, FireIncident, FireReport, Note, Record};
use crate::records::RecordStore;
use crate::storage::{Storage, StorageStats};
use crate::transfer;
use crate::view::View;

/// Notes, EMT incidents and fire incidents kept on this device.
#[derive(Debug)]
pub struct Logbook {
    storage: Storage,
    config: Config,
    notes: RecordStore<Note>,
    emt: RecordStore<EmtIncident>,
    fire: RecordStore<FireIncident>,
    emt_drafts: Drafts<EmtIncident>,
    fire_drafts: Drafts<FireIncident>,
}

impl Logbook {
    /// Load every record list from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading storage fails.
    pub fn open(storage: Storage, config: Config) -> Result<Self> {
        let notes = RecordStore::load(&storage)?;
        let emt = RecordStore::load(&storage)?;
        let fire = RecordStore::load(&storage)?;
        let autosave = config.drafts.autosave;

        info!(
            notes = notes.len(),
            emt = emt.len(),
            fire = fire.len(),
            "Opened logbook at {}",
            storage.path().display()
        );

        Ok(Self {
            storage,
            config,
            notes,
            emt,
            fire,
            emt_drafts: Drafts::new(autosave),
            fire_drafts: Drafts::new(autosave),
        })
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Saved notes, newest first.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        self.notes.all()
    }

    /// Saved EMT incidents, newest first.
    #[must_use]
    pub fn emt_incidents(&self) -> &[EmtIncident] {
        self.emt.all()
    }

    /// Saved fire incidents, newest first.
    #[must_use]
    pub fn fire_incidents(&self) -> &[FireIncident] {
        self.fire.all()
    }

    // === Notes ===

    /// Look up a note by id.
    #[must_use]
    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.find(id)
    }

    /// Save a new note and show it.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn save_note(&mut self, note: Note) -> Result<View> {
        let id = note.id.clone();
        self.notes.prepend(&self.storage, note)?;
        debug!(id = %id, "Saved note");
        Ok(View::ViewNote { id })
    }

    /// Delete a note and go home.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no note has that id, or an
    /// error if persisting fails.
    pub fn delete_note(&mut self, id: &str) -> Result<View> {
        self.notes
            .remove(&self.storage, id)?
            .ok_or_else(|| Error::record_not_found(Note::KIND, id))?;
        debug!(id, "Deleted note");
        Ok(View::Home)
    }

    /// Export every note as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_notes(&self) -> Result<String> {
        transfer::export_json(self.notes.all())
    }

    /// Import notes from JSON, skipping invalid items and known ids.
    ///
    /// Returns the number of notes added.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn import_notes(&mut self, raw: &str) -> Result<usize> {
        let imported = transfer::import_notes(raw);
        transfer::merge_notes(&mut self.notes, &self.storage, imported)
    }

    // === EMT incidents ===

    /// Initial state of the new EMT incident form.
    ///
    /// # Errors
    ///
    /// Returns an error if reading storage fails.
    pub fn start_emt(&mut self) -> Result<EmtReport> {
        Ok(self.emt_drafts.load_initial(&self.storage)?.unwrap_or_default())
    }

    /// Autosave the EMT form. Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns an error if writing storage fails.
    pub fn autosave_emt(&mut self, draft: &EmtReport) -> Result<bool> {
        self.emt_drafts.autosave(&self.storage, draft)
    }

    /// The stored EMT draft, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if reading storage fails.
    pub fn emt_draft(&self) -> Result<Option<EmtReport>> {
        self.emt_drafts.peek(&self.storage)
    }

    /// Keep the EMT form as a draft, even with autosave off.
    ///
    /// Returns `false` if the stored draft already had this content.
    ///
    /// # Errors
    ///
    /// Returns an error if writing storage fails.
    pub fn keep_emt_draft(&mut self, draft: &EmtReport) -> Result<bool> {
        self.emt_drafts.save(&self.storage, draft)
    }

    /// Throw away the EMT draft. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if writing storage fails.
    pub fn discard_emt_draft(&mut self) -> Result<bool> {
        self.emt_drafts.discard(&self.storage)
    }

    /// Save the EMT form.
    ///
    /// With `edit_index`, the incident at that position gets the new
    /// report and keeps its id and creation time. Without it, a new
    /// incident goes to the front. Either way the EMT draft is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if `edit_index` is out of range,
    /// or an error if persisting fails.
    pub fn save_emt(&mut self, report: EmtReport, edit_index: Option<usize>) -> Result<View> {
        match edit_index {
            Some(index) => {
                let existing = self
                    .emt
                    .get(index)
                    .ok_or_else(|| Error::record_not_found(EmtIncident::KIND, index))?;
                let updated = EmtIncident {
                    report,
                    ..existing.clone()
                };
                self.emt.replace(&self.storage, index, updated)?;
                self.emt_drafts.discard(&self.storage)?;
                debug!(index, "Updated EMT incident");
            }
            None => {
                let emt = &mut self.emt;
                let storage = &self.storage;
                self.emt_drafts.commit(storage, report, |incident| {
                    debug!(id = %incident.id, "Saving EMT incident");
                    emt.prepend(storage, incident)
                })?;
            }
        }
        Ok(View::EmtDashboard)
    }

    /// Reopen the most recent EMT incident for editing.
    ///
    /// Returns `None` when nothing has been saved yet.
    #[must_use]
    pub fn continue_emt(&self) -> Option<View> {
        (!self.emt.is_empty()).then_some(View::EmtEdit { index: 0 })
    }

    /// The EMT incident at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if `index` is out of range.
    pub fn emt_incident(&self, index: usize) -> Result<&EmtIncident> {
        self.emt
            .get(index)
            .ok_or_else(|| Error::record_not_found(EmtIncident::KIND, index))
    }

    /// Filter the EMT history.
    #[must_use]
    pub fn emt_history<Tz: TimeZone>(
        &self,
        filter: &RecordFilter,
        now: &DateTime<Tz>,
    ) -> Vec<Match<'_, EmtIncident>> {
        filter.apply(self.emt.all(), now)
    }

    // === Fire incidents ===

    /// Initial state of the new fire incident form.
    ///
    /// A staged duplicate wins over the in-progress draft.
    ///
    /// # Errors
    ///
    /// Returns an error if reading storage fails.
    pub fn start_fire(&mut self) -> Result<FireReport> {
        Ok(self
            .fire_drafts
            .load_initial(&self.storage)?
            .unwrap_or_default())
    }

    /// Autosave the fire form. Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns an error if writing storage fails.
    pub fn autosave_fire(&mut self, draft: &FireReport) -> Result<bool> {
        self.fire_drafts.autosave(&self.storage, draft)
    }

    /// The stored fire draft, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if reading storage fails.
    pub fn fire_draft(&self) -> Result<Option<FireReport>> {
        self.fire_drafts.peek(&self.storage)
    }

    /// Keep the fire form as a draft, even with autosave off.
    ///
    /// # Errors
    ///
    /// Returns an error if writing storage fails.
    pub fn keep_fire_draft(&mut self, draft: &FireReport) -> Result<bool> {
        self.fire_drafts.save(&self.storage, draft)
    }

    /// Throw away the fire draft. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if writing storage fails.
    pub fn discard_fire_draft(&mut self) -> Result<bool> {
        self.fire_drafts.discard(&self.storage)
    }

    /// Save a new fire incident at the front and clear the fire draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhotoLimit`] if the report carries more photos than
    /// configured, or an error if persisting fails.
    pub fn save_fire(&mut self, report: FireReport) -> Result<View> {
        self.check_photos(&report)?;
        let fire = &mut self.fire;
        let storage = &self.storage;
        self.fire_drafts.commit(storage, report, |incident| {
            debug!(id = %incident.id, "Saving fire incident");
            fire.prepend(storage, incident)
        })?;
        Ok(View::FireDashboard)
    }

    /// Replace the report of the fire incident at `index`.
    ///
    /// The incident keeps its id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if `index` is out of range,
    /// [`Error::PhotoLimit`] if the report carries too many photos, or an
    /// error if persisting fails.
    pub fn update_fire(&mut self, index: usize, report: FireReport) -> Result<View> {
        self.check_photos(&report)?;
        let updated = self.fire_incident(index)?.with_report(report);
        self.fire.replace(&self.storage, index, updated)?;
        self.fire_drafts.discard(&self.storage)?;
        debug!(index, "Updated fire incident");
        Ok(View::FireHistory)
    }

    /// Delete a fire incident by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no incident has that id, or an
    /// error if persisting fails.
    pub fn delete_fire(&mut self, id: &str) -> Result<View> {
        self.fire
            .remove(&self.storage, id)?
            .ok_or_else(|| Error::record_not_found(FireIncident::KIND, id))?;
        debug!(id, "Deleted fire incident");
        Ok(View::FireHistory)
    }

    /// Stage the incident at `index` as the next new fire form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if `index` is out of range, or an
    /// error if writing storage fails.
    pub fn duplicate_fire(&mut self, index: usize) -> Result<View> {
        let incident = self.fire_incident(index)?;
        self.fire_drafts.stage_duplicate(&self.storage, incident)?;
        Ok(View::FireIncident)
    }

    /// The fire incident at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if `index` is out of range.
    pub fn fire_incident(&self, index: usize) -> Result<&FireIncident> {
        self.fire
            .get(index)
            .ok_or_else(|| Error::record_not_found(FireIncident::KIND, index))
    }

    /// Filter the fire history.
    #[must_use]
    pub fn fire_history<Tz: TimeZone>(
        &self,
        filter: &FireFilter,
        now: &DateTime<Tz>,
    ) -> Vec<Match<'_, FireIncident>> {
        filter.apply(self.fire.all(), now)
    }

    fn check_photos(&self, report: &FireReport) -> Result<()> {
        let limit = self.config.incidents.max_photos;
        if report.photos.len() > limit {
            return Err(Error::PhotoLimit { limit });
        }
        Ok(())
    }

    // === Status ===

    /// Summarize what is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if reading storage fails.
    pub fn status(&self) -> Result<Status> {
        Ok(Status {
            database_path: self.storage.path().display().to_string(),
            notes: self.notes.len(),
            emt_incidents: self.emt.len(),
            fire_incidents: self.fire.len(),
            emt_draft: self.emt_drafts.has_draft(&self.storage)?,
            fire_draft: self.fire_drafts.has_draft(&self.storage)?,
            storage: self.storage.stats()?.into(),
        })
    }
}

/// Snapshot of the logbook contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    /// Where the database lives.
    pub database_path: String,
    /// Number of notes.
    pub notes: usize,
    /// Number of EMT incidents.
    pub emt_incidents: usize,
    /// Number of fire incidents.
    pub fire_incidents: usize,
    /// Whether an EMT draft is waiting.
    pub emt_draft: bool,
    /// Whether a fire draft is waiting.
    pub fire_draft: bool,
    /// Raw storage figures.
    pub storage: StorageSummary,
}

/// Serializable form of [`StorageStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageSummary {
    /// Number of stored keys.
    pub entries: usize,
    /// Total size of stored values in bytes.
    pub value_bytes: u64,
    /// RFC 3339 time of the last write.
    pub last_updated: Option<String>,
    /// Database file size in bytes.
    pub db_size_bytes: u64,
}

impl From<StorageStats> for StorageSummary {
    fn from(stats: StorageStats) -> Self {
        Self {
            entries: stats.entries,
            value_bytes: stats.value_bytes,
            last_updated: stats.last_updated.map(|t| t.to_rfc3339()),
            db_size_bytes: stats.db_size_bytes,
        }
    }
}
