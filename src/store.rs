use log::{debug, info};

use crate::{
    next_id, normalize_text, KeyValueStore, PersistenceMirror, Result, Stats, Todo,
};

/// Question asked before the whole list is wiped
pub const CLEAR_ALL_PROMPT: &str = "Delete all todos?";

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self(prompt))
    }
}

/// What became of a request to replace an item's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The text was replaced and the list saved
    Saved,
    /// The new text was blank; nothing changed
    Rejected,
    /// No item has that id; nothing changed
    Missing,
}

/// Owns the list in memory and keeps its storage slot in step with it.
///
/// Invalid input (blank text, unknown ids) leaves the list untouched and is
/// reported through the return value, never as an error. Errors only come
/// from writing the slot, and by then the in-memory change has been made.
#[derive(Debug)]
pub struct TodoStore<S> {
    todos: Vec<Todo>,
    mirror: PersistenceMirror<S>,
}

impl<S: KeyValueStore> TodoStore<S> {
    /// Opens the list saved under `key`, starting empty if there is none.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let mut mirror = PersistenceMirror::new(storage, key);
        let todos = mirror.hydrate();
        info!("Opened list '{}' with {} todos", mirror.key(), todos.len());
        Self { todos, mirror }
    }

    /// Items in insertion order
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: i64) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Item at a 1-based position, as shown by `list`
    pub fn nth(&self, position: usize) -> Option<&Todo> {
        position
            .checked_sub(1)
            .and_then(|index| self.todos.get(index))
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Counts, recomputed from the list on every call.
    pub fn stats(&self) -> Stats {
        Stats {
            total: self.todos.len(),
            completed: self.todos.iter().filter(|todo| todo.completed).count(),
        }
    }

    /// Appends a new open item and returns its id; blank text adds nothing.
    pub fn add(&mut self, text: &str) -> Result<Option<i64>> {
        let Some(text) = normalize_text(text) else {
            debug!("Ignoring add with blank text");
            return Ok(None);
        };

        let ids: Vec<i64> = self.todos.iter().map(|todo| todo.id).collect();
        let id = next_id(&ids);
        self.todos.push(Todo::new(id, text));
        debug!("Added todo {}", id);

        self.persist()?;
        Ok(Some(id))
    }

    /// Flips the completion flag; returns `false` if no item has `id`.
    pub fn toggle(&mut self, id: i64) -> Result<bool> {
        let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == id) else {
            debug!("Ignoring toggle of unknown todo {}", id);
            return Ok(false);
        };

        todo.completed = !todo.completed;
        debug!("Todo {} completed={}", id, todo.completed);

        self.persist()?;
        Ok(true)
    }

    /// Removes the item; returns `false` if no item has `id`.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let Some(index) = self.todos.iter().position(|todo| todo.id == id) else {
            debug!("Ignoring delete of unknown todo {}", id);
            return Ok(false);
        };

        self.todos.remove(index);
        debug!("Deleted todo {}", id);

        self.persist()?;
        Ok(true)
    }

    /// Empties the list once `confirm` agrees; returns whether it did.
    pub fn clear_all<C: Confirm + ?Sized>(&mut self, confirm: &mut C) -> Result<bool> {
        if !confirm.confirm(CLEAR_ALL_PROMPT)? {
            debug!("Clear all declined");
            return Ok(false);
        }

        let removed = self.todos.len();
        self.todos.clear();
        info!("Cleared {} todos", removed);

        self.persist()?;
        Ok(true)
    }

    /// Replaces an item's text with the trimmed `new_text`.
    pub fn finish_edit(&mut self, id: i64, new_text: &str) -> Result<EditOutcome> {
        let Some(text) = normalize_text(new_text) else {
            debug!("Rejecting blank edit of todo {}", id);
            return Ok(EditOutcome::Rejected);
        };

        let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == id) else {
            debug!("Ignoring edit of unknown todo {}", id);
            return Ok(EditOutcome::Missing);
        };

        todo.text = text;
        debug!("Edited todo {}", id);

        self.persist()?;
        Ok(EditOutcome::Saved)
    }

    pub fn mirror(&self) -> &PersistenceMirror<S> {
        &self.mirror
    }

    /// Gives the storage back, e.g. to reopen the list from it.
    pub fn into_storage(self) -> S {
        self.mirror.into_storage()
    }

    fn persist(&mut self) -> Result<()> {
        self.mirror.write(&self.todos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, DEFAULT_STORAGE_KEY};

    fn empty_store() -> TodoStore<MemoryStore> {
        TodoStore::open(MemoryStore::new(), DEFAULT_STORAGE_KEY)
    }

    fn saved(store: &TodoStore<MemoryStore>) -> Option<String> {
        store.mirror().storage().get(DEFAULT_STORAGE_KEY).unwrap()
    }

    #[test]
    fn add_counts_only_non_blank_text_in_order() {
        let mut store = empty_store();
        let inputs = ["Buy milk", "", "   ", "\tWalk dog ", "Pay bills", "\n"];

        for text in inputs {
            store.add(text).unwrap();
        }

        let texts: Vec<&str> = store.todos().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Buy milk", "Walk dog", "Pay bills"]);
    }

    #[test]
    fn blank_add_does_not_write() {
        let mut store = empty_store();
        assert_eq!(store.add("").unwrap(), None);
        assert_eq!(store.add("   ").unwrap(), None);
        assert!(store.is_empty());
        assert_eq!(saved(&store), None);
    }

    #[test]
    fn ids_are_unique_for_rapid_adds() {
        let mut store = empty_store();
        for i in 0..200 {
            store.add(&format!("item {}", i)).unwrap();
        }

        let mut ids: Vec<i64> = store.todos().iter().map(|t| t.id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn add_after_hydrating_max_id_does_not_overflow() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"[{"id":9223372036854775807,"text":"x","completed":false,"createdAt":"2024-01-01T00:00:00.000Z"}]"#,
            )
            .unwrap();
        let mut store = TodoStore::open(storage, DEFAULT_STORAGE_KEY);

        let first = store.add("y").unwrap().unwrap();
        let second = store.add("z").unwrap().unwrap();
        assert_ne!(first, i64::MAX);
        assert_ne!(second, first);
        assert_ne!(second, i64::MAX);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn toggle_twice_restores_flag() {
        let mut store = empty_store();
        let id = store.add("Walk dog").unwrap().unwrap();

        assert!(store.toggle(id).unwrap());
        assert!(store.get(id).unwrap().completed);
        assert!(store.toggle(id).unwrap());
        assert!(!store.get(id).unwrap().completed);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut store = empty_store();
        let id = store.add("Walk dog").unwrap().unwrap();
        let before = store.todos().to_vec();

        assert!(!store.toggle(id + 1).unwrap());
        assert!(!store.delete(id + 1).unwrap());
        assert_eq!(store.finish_edit(id + 1, "x").unwrap(), EditOutcome::Missing);
        assert_eq!(store.todos(), before.as_slice());
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = empty_store();
        let first = store.add("Buy milk").unwrap().unwrap();
        store.add("Walk dog").unwrap();

        assert!(store.delete(first).unwrap());
        assert!(!store.delete(first).unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.todos()[0].text, "Walk dog");
    }

    #[test]
    fn finish_edit_trims_and_keeps_identity() {
        let mut store = empty_store();
        let id = store.add("Buy milk").unwrap().unwrap();
        let created_at = store.get(id).unwrap().created_at;

        assert_eq!(
            store.finish_edit(id, "  Buy milk (done) ").unwrap(),
            EditOutcome::Saved
        );
        let todo = store.get(id).unwrap();
        assert_eq!(todo.text, "Buy milk (done)");
        assert_eq!(todo.created_at, created_at);
    }

    #[test]
    fn blank_edit_is_rejected() {
        let mut store = empty_store();
        let id = store.add("Buy milk").unwrap().unwrap();

        assert_eq!(store.finish_edit(id, "  ").unwrap(), EditOutcome::Rejected);
        assert_eq!(store.get(id).unwrap().text, "Buy milk");
    }

    #[test]
    fn clear_all_respects_confirmation() {
        let mut store = empty_store();
        store.add("Buy milk").unwrap();
        store.add("Walk dog").unwrap();

        let mut asked = Vec::new();
        let cleared = store
            .clear_all(&mut |prompt: &str| {
                asked.push(prompt.to_string());
                false
            })
            .unwrap();
        assert!(!cleared);
        assert_eq!(store.len(), 2);
        assert_eq!(asked, vec![CLEAR_ALL_PROMPT.to_string()]);

        assert!(store.clear_all(&mut |_: &str| true).unwrap());
        assert!(store.is_empty());
        assert_eq!(saved(&store).as_deref(), Some("[]"));
    }

    #[test]
    fn stats_stay_within_bounds() {
        let mut store = empty_store();
        assert_eq!(store.stats(), Stats { total: 0, completed: 0 });

        let ids: Vec<i64> = ["a", "b", "c", "d"]
            .iter()
            .map(|text| store.add(text).unwrap().unwrap())
            .collect();
        for id in ids.iter().step_by(2) {
            store.toggle(*id).unwrap();
        }
        store.delete(ids[3]).unwrap();

        let stats = store.stats();
        assert_eq!(stats, Stats { total: 3, completed: 2 });
        assert!(stats.completed <= stats.total);
    }

    #[test]
    fn nth_is_one_based() {
        let mut store = empty_store();
        store.add("Buy milk").unwrap();
        store.add("Walk dog").unwrap();

        assert!(store.nth(0).is_none());
        assert_eq!(store.nth(2).unwrap().text, "Walk dog");
        assert!(store.nth(3).is_none());
    }

    #[test]
    fn reopening_reproduces_state() {
        let mut store = empty_store();
        let id = store.add("Buy milk").unwrap().unwrap();
        store.add("Walk dog").unwrap();
        store.toggle(id).unwrap();
        let before = store.todos().to_vec();

        let reopened = TodoStore::open(store.into_storage(), DEFAULT_STORAGE_KEY);
        assert_eq!(reopened.todos(), before.as_slice());
    }
}
