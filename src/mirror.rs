//! Write-through mirror of the list into a single storage slot.
//!
//! The slot holds a JSON array of todo objects. It is read once, when the
//! store is opened, and rewritten in full after every mutation.

use std::collections::HashSet;

use chrono::{SubsecRound, Utc};
use log::{debug, info, trace, warn};

use crate::{normalize_text, KeyValueStore, Result, Todo};

/// Slot key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Serializes the whole list into one storage slot.
#[derive(Debug)]
pub struct PersistenceMirror<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceMirror<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The slot this mirror reads and writes
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Loads the initial list from the slot.
    ///
    /// Never fails: an absent or unreadable slot yields an empty list, and a
    /// slot that does not parse is copied aside to `<key>.corrupt-<secs>`
    /// and reset to `[]` before starting empty. Entries with blank text or a
    /// repeated id are dropped, and creation times are cut to milliseconds,
    /// the precision they are written back with.
    pub fn hydrate(&mut self) -> Vec<Todo> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("No saved list under '{}', starting empty", self.key);
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read saved list '{}', starting empty: {}", self.key, e);
                return Vec::new();
            }
        };

        let parsed: Vec<Todo> = match serde_json::from_str(&raw) {
            Ok(todos) => todos,
            Err(e) => {
                warn!("Saved list '{}' is malformed, starting empty: {}", self.key, e);
                if self.quarantine(&raw) {
                    if let Err(e) = self.write(&[]) {
                        warn!("Failed to reset unreadable list '{}': {}", self.key, e);
                    }
                }
                return Vec::new();
            }
        };

        let todos = sanitize(parsed);
        info!("Loaded {} todos from '{}'", todos.len(), self.key);
        todos
    }

    /// Overwrites the slot with the full list.
    pub fn write(&mut self, todos: &[Todo]) -> Result<()> {
        let json = serde_json::to_string(todos)?;
        self.storage.set(&self.key, &json)?;
        debug!("Wrote {} todos to '{}'", todos.len(), self.key);
        Ok(())
    }

    /// Copies unreadable slot contents aside; returns whether the copy was made.
    fn quarantine(&mut self, raw: &str) -> bool {
        let backup_key = format!("{}.corrupt-{}", self.key, Utc::now().timestamp());
        match self.storage.set(&backup_key, raw) {
            Ok(()) => {
                info!("Kept unreadable list as '{}'", backup_key);
                true
            }
            Err(e) => {
                warn!("Failed to keep unreadable list as '{}': {}", backup_key, e);
                false
            }
        }
    }
}

/// Restores the list invariants on data that came from outside.
fn sanitize(parsed: Vec<Todo>) -> Vec<Todo> {
    let mut seen = HashSet::with_capacity(parsed.len());
    let mut todos = Vec::with_capacity(parsed.len());

    for mut todo in parsed {
        let Some(text) = normalize_text(&todo.text) else {
            warn!("Dropping saved todo {} with empty text", todo.id);
            continue;
        };
        if !seen.insert(todo.id) {
            warn!("Dropping saved todo with duplicate id {}", todo.id);
            continue;
        }
        trace!("Hydrated todo {}", todo.id);
        todo.text = text;
        todo.created_at = todo.created_at.trunc_subsecs(3);
        todos.push(todo);
    }

    todos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn mirror_with(raw: &str) -> PersistenceMirror<MemoryStore> {
        let mut storage = MemoryStore::new();
        storage.set(DEFAULT_STORAGE_KEY, raw).unwrap();
        PersistenceMirror::new(storage, DEFAULT_STORAGE_KEY)
    }

    #[test]
    fn absent_slot_hydrates_empty() {
        let mut mirror = PersistenceMirror::new(MemoryStore::new(), DEFAULT_STORAGE_KEY);
        assert!(mirror.hydrate().is_empty());
        assert!(mirror.storage().keys().is_empty());
    }

    #[test]
    fn malformed_slot_hydrates_empty_and_is_kept_aside() {
        let mut mirror = mirror_with("[{\"id\": 1, \"text\": ");
        assert!(mirror.hydrate().is_empty());

        let keys = mirror.storage().keys();
        assert_eq!(keys.len(), 2);
        let backup = keys
            .iter()
            .find(|k| k.starts_with("todos.corrupt-"))
            .unwrap();
        assert_eq!(
            mirror.storage().get(backup).unwrap().as_deref(),
            Some("[{\"id\": 1, \"text\": ")
        );
        assert_eq!(
            mirror.storage().get(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );

        // The reset slot reads cleanly, so no further copies pile up
        assert!(mirror.hydrate().is_empty());
        assert_eq!(mirror.storage().keys().len(), 2);
    }

    #[test]
    fn sub_millisecond_timestamps_are_truncated_on_load() {
        let mut mirror = mirror_with(
            r#"[{"id":1,"text":"Buy milk","completed":false,"createdAt":"2024-01-01T00:00:00.123456789Z"}]"#,
        );

        let todos = mirror.hydrate();
        assert_eq!(todos[0].created_at.timestamp_subsec_nanos(), 123_000_000);

        mirror.write(&todos).unwrap();
        assert_eq!(mirror.hydrate(), todos);
    }

    #[test]
    fn wrong_shape_counts_as_malformed() {
        let mut mirror = mirror_with(r#"{"todos": []}"#);
        assert!(mirror.hydrate().is_empty());
    }

    #[test]
    fn invalid_entries_are_dropped() {
        let mut mirror = mirror_with(
            r#"[
                {"id":1,"text":"  Buy milk ","completed":false,"createdAt":"2024-01-01T00:00:00.000Z"},
                {"id":2,"text":"   ","completed":false,"createdAt":"2024-01-01T00:00:00.000Z"},
                {"id":1,"text":"dup","completed":true,"createdAt":"2024-01-01T00:00:00.000Z"},
                {"id":3,"text":"Pay bills","completed":true,"createdAt":"2024-01-01T00:00:00.000Z"}
            ]"#,
        );

        let todos = mirror.hydrate();
        let summary: Vec<(i64, &str, bool)> = todos
            .iter()
            .map(|t| (t.id, t.text.as_str(), t.completed))
            .collect();
        assert_eq!(summary, vec![(1, "Buy milk", false), (3, "Pay bills", true)]);
    }

    #[test]
    fn write_then_hydrate_reproduces_list() {
        let mut mirror = PersistenceMirror::new(MemoryStore::new(), "custom");
        let mut done = Todo::new(10, "Walk dog".to_string());
        done.completed = true;
        let todos = vec![Todo::new(5, "Buy milk".to_string()), done];

        mirror.write(&todos).unwrap();
        assert_eq!(mirror.hydrate(), todos);
        assert_eq!(mirror.storage().keys(), vec!["custom".to_string()]);
    }

    #[test]
    fn empty_list_is_written_as_empty_array() {
        let mut mirror = PersistenceMirror::new(MemoryStore::new(), DEFAULT_STORAGE_KEY);
        mirror.write(&[]).unwrap();
        assert_eq!(
            mirror.storage().get(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }
}
