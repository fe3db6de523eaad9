//! Shared types for the todolist application.
//!
//! This module contains the crate-wide `Result` alias, the derived list
//! counts and the sub-commands understood by the CLI.
use std::fmt;

use clap::Subcommand;
use serde::Serialize;

use crate::TodoError;

/// A specialized Result type for todolist operations.
pub type Result<T> = std::result::Result<T, TodoError>;

/// Derived counts over the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of items on the list
    pub total: usize,
    /// Number of items marked completed
    pub completed: usize,
}

impl Stats {
    /// Items still open
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total {}, completed {}", self.total, self.completed)
    }
}

/// Available subcommands for the todolist application
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Add a new todo
    Add {
        /// Text of the todo (words are joined with spaces)
        #[clap(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show all todos with their counts
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Mark a todo completed, or open again
    Toggle {
        /// Id of the todo, or @N for its position in the list
        target: String,
    },

    /// Replace the text of a todo
    Edit {
        /// Id of the todo, or @N for its position in the list
        target: String,

        /// New text (words are joined with spaces)
        #[clap(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Delete a todo
    Delete {
        /// Id of the todo, or @N for its position in the list
        target: String,
    },

    /// Delete every todo
    Clear {
        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Print the total and completed counts
    Stats {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Work with the list interactively
    Shell,
}
