//! Persistent lists of records.
//!
//! A [`RecordStore`] keeps every record of one kind in memory and mirrors
//! the full list into [`Storage`] as a JSON array after each mutation.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::Record;
use crate::storage::Storage;

/// All saved records of one kind, newest first.
#[derive(Debug, Clone)]
pub struct RecordStore<T: Record> {
    records: Vec<T>,
}

impl<T: Record> RecordStore<T> {
    /// Load the record list from storage.
    ///
    /// A missing key or a value that is not a JSON array yields an empty
    /// list. Array elements that do not parse as `T` are skipped with a
    /// warning; the rest load normally.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage read fails.
    pub fn load(storage: &Storage) -> Result<Self> {
        let records = match storage.get_item(T::STORAGE_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Value>>(&raw) {
                Ok(items) => parse_items(items),
                Err(e) => {
                    warn!(
                        key = T::STORAGE_KEY,
                        error = %e,
                        "Stored records are not a JSON array, starting empty"
                    );
                    Vec::new()
                }
            },
        };

        debug!(kind = T::KIND, count = records.len(), "Loaded records");
        Ok(Self { records })
    }

    /// All records in stored order.
    #[must_use]
    pub fn all(&self) -> &[T] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    /// Find a record by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Position of the record with the given id.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Insert a record at the front of the list.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails. The list is unchanged then.
    pub fn prepend(&mut self, storage: &Storage, record: T) -> Result<()> {
        let mut records = Vec::with_capacity(self.records.len() + 1);
        records.push(record);
        records.extend(self.records.iter().cloned());
        self.commit(storage, records)
    }

    /// Replace the record at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if `index` is out of range, or an
    /// error if persisting fails.
    pub fn replace(&mut self, storage: &Storage, index: usize, record: T) -> Result<()> {
        if index >= self.records.len() {
            return Err(Error::record_not_found(T::KIND, index));
        }
        let mut records = self.records.clone();
        records[index] = record;
        self.commit(storage, records)
    }

    /// Replace the record that has the same id as `record`.
    ///
    /// Returns the index of the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no record has that id, or an
    /// error if persisting fails.
    pub fn update(&mut self, storage: &Storage, record: T) -> Result<usize> {
        let index = self
            .position(record.id())
            .ok_or_else(|| Error::record_not_found(T::KIND, record.id()))?;
        self.replace(storage, index, record)?;
        Ok(index)
    }

    /// Remove the record with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn remove(&mut self, storage: &Storage, id: &str) -> Result<Option<T>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let mut records = self.records.clone();
        let removed = records.remove(index);
        self.commit(storage, records)?;
        Ok(Some(removed))
    }

    /// Replace the whole list.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    pub fn replace_all(&mut self, storage: &Storage, records: Vec<T>) -> Result<()> {
        self.commit(storage, records)
    }

    /// Write `records` and adopt them only once the write succeeded.
    fn commit(&mut self, storage: &Storage, records: Vec<T>) -> Result<()> {
        let json = serde_json::to_string(&records)?;
        storage.set_item(T::STORAGE_KEY, &json)?;
        self.records = records;
        Ok(())
    }
}

fn parse_items<T: Record>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key = T::STORAGE_KEY, index, error = %e, "Skipping unreadable record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EmtIncident, EmtReport, FireIncident, Note};

    fn note(title: &str) -> Note {
        Note::new(title, "body", Vec::new(), None)
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let storage = Storage::open_in_memory().unwrap();
        let store = RecordStore::<Note>::load(&storage).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupt_json_is_empty() {
        crate::logging::init_test_logging();
        let storage = Storage::open_in_memory().unwrap();
        storage.set_item("notes", "{not json").unwrap();

        let store = RecordStore::<Note>::load(&storage).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_non_array_is_empty() {
        let storage = Storage::open_in_memory().unwrap();
        storage.set_item("notes", r#"{"id":"x"}"#).unwrap();
        assert!(RecordStore::<Note>::load(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_prepend_persists_newest_first() {
        let storage = Storage::open_in_memory().unwrap();
        let mut store = RecordStore::<Note>::load(&storage).unwrap();

        store.prepend(&storage, note("first")).unwrap();
        store.prepend(&storage, note("second")).unwrap();

        let reloaded = RecordStore::<Note>::load(&storage).unwrap();
        let titles: Vec<_> = reloaded.all().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_replace_and_out_of_range() {
        let storage = Storage::open_in_memory().unwrap();
        let mut store = RecordStore::<Note>::load(&storage).unwrap();
        store.prepend(&storage, note("old")).unwrap();

        store.replace(&storage, 0, note("new")).unwrap();
        assert_eq!(store.get(0).unwrap().title, "new");

        let err = store.replace(&storage, 3, note("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_by_id() {
        let storage = Storage::open_in_memory().unwrap();
        let mut store = RecordStore::<Note>::load(&storage).unwrap();
        let original = note("a");
        store.prepend(&storage, original.clone()).unwrap();
        store.prepend(&storage, note("b")).unwrap();

        let mut edited = original.clone();
        edited.content = "changed".to_string();
        assert_eq!(store.update(&storage, edited).unwrap(), 1);
        assert_eq!(store.find(&original.id).unwrap().content, "changed");

        assert!(store.update(&storage, note("missing")).is_err());
    }

    #[test]
    fn test_remove() {
        let storage = Storage::open_in_memory().unwrap();
        let mut store = RecordStore::<Note>::load(&storage).unwrap();
        let n = note("gone");
        store.prepend(&storage, n.clone()).unwrap();

        assert_eq!(store.remove(&storage, &n.id).unwrap(), Some(n.clone()));
        assert!(store.remove(&storage, &n.id).unwrap().is_none());
        assert!(RecordStore::<Note>::load(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_mutation_overwrites_corrupt_value() {
        let storage = Storage::open_in_memory().unwrap();
        storage.set_item("emt_incidents", "garbage").unwrap();

        let mut store = RecordStore::<EmtIncident>::load(&storage).unwrap();
        store
            .prepend(&storage, EmtIncident::new(EmtReport::default()))
            .unwrap();

        assert_eq!(RecordStore::<EmtIncident>::load(&storage).unwrap().len(), 1);
    }

    #[test]
    fn test_load_skips_unreadable_elements() {
        crate::logging::init_test_logging();
        let storage = Storage::open_in_memory().unwrap();
        let good = serde_json::to_value(note("kept")).unwrap();
        let raw = serde_json::json!([good, {"id": 7, "content": null}, "junk"]);
        storage.set_item("notes", &raw.to_string()).unwrap();

        let store = RecordStore::<Note>::load(&storage).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().title, "kept");
    }

    #[test]
    fn test_locale_timestamp_skips_only_that_fire() {
        let storage = Storage::open_in_memory().unwrap();
        let raw = serde_json::json!([
            {"id": "1", "timestamp": "3/14/2024, 2:05:00 PM", "fireType": "Vehicle Fire"},
            {"id": "2", "timestamp": "2024-03-14T14:05:00Z", "fireType": "Structure Fire"},
        ]);
        storage.set_item("fire_incidents", &raw.to_string()).unwrap();

        let store = RecordStore::<FireIncident>::load(&storage).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.find("2").unwrap().report.fire_type, "Structure Fire");
        assert!(store.find("1").is_none());
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let storage = Storage::open_in_memory().unwrap();
        let mut store = RecordStore::<Note>::load(&storage).unwrap();
        store.prepend(&storage, note("saved")).unwrap();
        storage.fail_writes_to("notes");

        assert!(store.prepend(&storage, note("lost")).is_err());
        let id = store.all()[0].id.clone();
        assert!(store.remove(&storage, &id).is_err());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().title, "saved");
    }
}
