//! Moving records in and out as JSON.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::record::Note;
use crate::records::RecordStore;
use crate::storage::Storage;

/// Render records as pretty-printed JSON with two-space indentation.
///
/// # Errors
///
/// Returns an error if a record fails to serialize.
pub fn export_json<T: Serialize>(records: &[T]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse notes from untrusted JSON.
///
/// Anything that is not a JSON array yields no notes. Array items are kept
/// only when they are objects with a string `id` and a string `content`;
/// missing optional fields take their defaults.
#[must_use]
pub fn import_notes(raw: &str) -> Vec<Note> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) else {
        debug!("Import input is not a JSON array");
        return Vec::new();
    };

    items
        .into_iter()
        .filter(|item| {
            item.get("id").is_some_and(Value::is_string)
                && item.get("content").is_some_and(Value::is_string)
        })
        .filter_map(|item| match serde_json::from_value::<Note>(item) {
            Ok(note) => Some(note),
            Err(e) => {
                debug!(error = %e, "Skipping malformed note");
                None
            }
        })
        .collect()
}

/// Add imported notes whose ids are not stored yet.
///
/// New notes go to the front, in import order. Returns the number added.
///
/// # Errors
///
/// Returns an error if persisting fails.
pub fn merge_notes(
    store: &mut RecordStore<Note>,
    storage: &Storage,
    imported: Vec<Note>,
) -> Result<usize> {
    let mut seen: HashSet<String> = store.all().iter().map(|n| n.id.clone()).collect();
    let fresh: Vec<Note> = imported
        .into_iter()
        .filter(|n| seen.insert(n.id.clone()))
        .collect();

    let added = fresh.len();
    if added > 0 {
        let mut merged = fresh;
        merged.extend(store.all().iter().cloned());
        store.replace_all(storage, merged)?;
    }

    info!("Imported {} notes", added);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_two_space_indent() {
        let mut note = Note::new("Title", "Body", Vec::new(), None);
        note.id = "n1".to_string();

        let json = export_json(&[note]).unwrap();
        assert!(json.starts_with("[\n  {\n    \"id\": \"n1\""));
    }

    #[test]
    fn test_export_empty() {
        assert_eq!(export_json::<Note>(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_import_rejects_non_array() {
        assert!(import_notes("not json").is_empty());
        assert!(import_notes(r#"{"id":"a","content":"b"}"#).is_empty());
        assert!(import_notes("").is_empty());
    }

    #[test]
    fn test_import_keeps_valid_items_only() {
        let raw = r#"[
            {"id": "a", "content": "keep", "title": "T"},
            {"id": 5, "content": "numeric id"},
            {"id": "b"},
            "just a string",
            null,
            {"id": "c", "content": "also keep"}
        ]"#;

        let notes = import_notes(raw);
        let ids: Vec<_> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(notes[0].title, "T");
        assert_eq!(notes[1].title, "");
        assert!(notes[1].tags.is_empty());
    }

    #[test]
    fn test_export_then_import_preserves_notes() {
        let notes = vec![
            Note::new("One", "first", vec!["shift".to_string()], None),
            Note::new("Two", "second", Vec::new(), None),
        ];
        let imported = import_notes(&export_json(&notes).unwrap());
        assert_eq!(imported, notes);
    }

    #[test]
    fn test_merge_skips_known_ids() {
        let storage = Storage::open_in_memory().unwrap();
        let mut store = RecordStore::<Note>::load(&storage).unwrap();
        let existing = Note::new("Existing", "x", Vec::new(), None);
        store.prepend(&storage, existing.clone()).unwrap();

        let fresh = Note::new("Fresh", "y", Vec::new(), None);
        let added = merge_notes(
            &mut store,
            &storage,
            vec![existing.clone(), fresh.clone(), fresh.clone()],
        )
        .unwrap();

        assert_eq!(added, 1);
        let reloaded = RecordStore::<Note>::load(&storage).unwrap();
        assert_eq!(reloaded.all(), &[fresh, existing]);
    }
}
