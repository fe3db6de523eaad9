//! Transient edit state for the presentation layer.
//!
//! Which item is being edited and its draft text live here, outside the
//! store, and are never written to storage.

use log::debug;

use crate::{EditOutcome, KeyValueStore, Result, TodoStore};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    id: i64,
    text: String,
}

/// Tracks at most one in-progress edit.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    draft: Option<Draft>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins editing `id` with its current text as the draft, replacing any
    /// edit already in progress.
    pub fn start(&mut self, id: i64, current_text: &str) {
        debug!("Editing todo {}", id);
        self.draft = Some(Draft {
            id,
            text: current_text.to_string(),
        });
    }

    /// Replaces the draft text. Does nothing when no edit is in progress.
    pub fn set_draft(&mut self, text: &str) {
        if let Some(draft) = self.draft.as_mut() {
            draft.text = text.to_string();
        }
    }

    /// Drops the edit without touching the list.
    pub fn cancel(&mut self) {
        if let Some(draft) = self.draft.take() {
            debug!("Cancelled edit of todo {}", draft.id);
        }
    }

    /// Id of the item being edited
    pub fn editing(&self) -> Option<i64> {
        self.draft.as_ref().map(|draft| draft.id)
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_ref().map(|draft| draft.text.as_str())
    }

    /// Saves the draft into `store`.
    ///
    /// A blank draft is rejected and the edit stays open, so the caller has
    /// to either supply text or cancel. With no edit in progress this
    /// reports `Missing`.
    pub fn commit<S: KeyValueStore>(&mut self, store: &mut TodoStore<S>) -> Result<EditOutcome> {
        let Some(draft) = self.draft.as_ref() else {
            return Ok(EditOutcome::Missing);
        };

        let outcome = store.finish_edit(draft.id, &draft.text)?;
        if outcome != EditOutcome::Rejected {
            self.draft = None;
        }
        Ok(outcome)
    }
}
