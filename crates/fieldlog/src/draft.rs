//! Autosaved drafts.
//!
//! Each draftable record kind has two storage slots:
//!
//! - `<kind>_in_progress`: the form being edited, rewritten on every change
//!   and offered back on the next visit;
//! - `<kind>_duplicate_temp`: a one-shot copy of an existing record, staged
//!   by "duplicate" and consumed the next time a new form is opened.

use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::error::Result;
use crate::record::Draftable;
use crate::storage::Storage;

/// Draft slots for one record kind.
#[derive(Debug)]
pub struct Drafts<T: Draftable> {
    in_progress_key: String,
    duplicate_key: String,
    autosave: bool,
    /// Hash of the last value this handle wrote to the in-progress slot.
    last_saved: Option<blake3::Hash>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Draftable> Drafts<T> {
    /// Create the draft slots for `T`.
    ///
    /// With `autosave` off, [`Drafts::autosave`] never writes.
    #[must_use]
    pub fn new(autosave: bool) -> Self {
        Self {
            in_progress_key: format!("{}_in_progress", T::KIND),
            duplicate_key: format!("{}_duplicate_temp", T::KIND),
            autosave,
            last_saved: None,
            _kind: PhantomData,
        }
    }

    /// Storage key of the in-progress slot.
    #[must_use]
    pub fn in_progress_key(&self) -> &str {
        &self.in_progress_key
    }

    /// Storage key of the duplicate slot.
    #[must_use]
    pub fn duplicate_key(&self) -> &str {
        &self.duplicate_key
    }

    /// Save the current form state to the in-progress slot.
    ///
    /// Returns `true` if anything was written. Identical consecutive saves
    /// are skipped, and nothing is written while autosave is off.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn autosave(&mut self, storage: &Storage, draft: &T::Draft) -> Result<bool> {
        if !self.autosave {
            return Ok(false);
        }
        self.write(storage, draft)
    }

    /// Save the form state because the user asked to keep it.
    ///
    /// Writes even when autosave is off. Returns `false` only when the
    /// stored draft already has this content.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn save(&mut self, storage: &Storage, draft: &T::Draft) -> Result<bool> {
        self.write(storage, draft)
    }

    fn write(&mut self, storage: &Storage, draft: &T::Draft) -> Result<bool> {
        let json = serde_json::to_string(draft)?;
        let hash = blake3::hash(json.as_bytes());
        if self.last_saved == Some(hash) {
            return Ok(false);
        }

        storage.set_item(&self.in_progress_key, &json)?;
        self.last_saved = Some(hash);
        debug!(key = %self.in_progress_key, "Saved draft");
        Ok(true)
    }

    /// Pick the initial state for a new form.
    ///
    /// A staged duplicate wins and is consumed. Otherwise the in-progress
    /// draft is returned. Entries that fail to parse are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage access fails.
    pub fn load_initial(&mut self, storage: &Storage) -> Result<Option<T::Draft>> {
        if let Some(raw) = storage.get_item(&self.duplicate_key)? {
            storage.remove_item(&self.duplicate_key)?;
            match serde_json::from_str::<T::Draft>(&raw) {
                Ok(draft) => {
                    debug!(key = %self.duplicate_key, "Loaded duplicated record as draft");
                    self.autosave(storage, &draft)?;
                    return Ok(Some(draft));
                }
                Err(e) => {
                    warn!(key = %self.duplicate_key, error = %e, "Discarding unreadable duplicate");
                }
            }
        }

        self.peek(storage)
    }

    /// Read the in-progress draft without touching the duplicate slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage read fails.
    pub fn peek(&self, storage: &Storage) -> Result<Option<T::Draft>> {
        let Some(raw) = storage.get_item(&self.in_progress_key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(draft) => Ok(Some(draft)),
            Err(e) => {
                warn!(key = %self.in_progress_key, error = %e, "Ignoring unreadable draft");
                Ok(None)
            }
        }
    }

    /// Check whether an in-progress draft is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage read fails.
    pub fn has_draft(&self, storage: &Storage) -> Result<bool> {
        Ok(storage.get_item(&self.in_progress_key)?.is_some())
    }

    /// Stage a copy of `record` to prefill the next new form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn stage_duplicate(&self, storage: &Storage, record: &T) -> Result<()> {
        let json = serde_json::to_string(&record.to_draft())?;
        storage.set_item(&self.duplicate_key, &json)?;
        debug!(key = %self.duplicate_key, id = record.id(), "Staged duplicate");
        Ok(())
    }

    /// Throw away the in-progress draft.
    ///
    /// Returns `true` if a draft was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn discard(&mut self, storage: &Storage) -> Result<bool> {
        self.last_saved = None;
        storage.remove_item(&self.in_progress_key)
    }

    /// Turn a draft into a new record and hand it to `persist`.
    ///
    /// The in-progress slot is cleared only after `persist` succeeds, so a
    /// failed save leaves the draft in place.
    ///
    /// # Errors
    ///
    /// Returns the error from `persist`, or an error if clearing the slot
    /// fails.
    pub fn commit<R>(
        &mut self,
        storage: &Storage,
        draft: T::Draft,
        persist: impl FnOnce(T) -> Result<R>,
    ) -> Result<R> {
        let saved = persist(T::from_draft(draft))?;
        self.discard(storage)?;
        Ok(saved)
    }
}
