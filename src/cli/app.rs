//! CLI module for the todolist application
//!
//! This module turns parsed commands, or lines typed into the interactive
//! shell, into calls on the todo store and renders the results.
use std::io::{BufRead, Write};

use clap::{CommandFactory, Parser};
use console::style;
use log::{debug, info, warn};

use crate::{
    cli::args::ShellLine, Commands, Confirm, EditOutcome, EditSession, KeyValueStore, Result,
    TodoError, TodoStore,
};

/// Typed into the shell while editing to drop the draft
pub const CANCEL_EDIT: &str = ":cancel";

/// CLI Application handler - processes commands against a todo store
pub struct App<S> {
    /// The list being worked on
    store: TodoStore<S>,

    /// In-progress shell edit, never saved
    session: EditSession,

    /// Whether to display verbose output
    verbose: bool,
}

/// How an item is picked on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Id(i64),
    Position(usize),
}

enum ShellFlow {
    Continue,
    Quit,
}

/// Asks a yes/no question on the given streams.
struct TerminalPrompt<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> Confirm for TerminalPrompt<'_, R, W> {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        write!(self.out, "{} [y/N]: ", prompt)?;
        self.out.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;

        let answer = answer.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

impl<S: KeyValueStore> App<S> {
    /// Create a new CLI application over the given store
    pub fn new(store: TodoStore<S>, verbose: bool) -> Self {
        Self {
            store,
            session: EditSession::new(),
            verbose,
        }
    }

    pub fn store(&self) -> &TodoStore<S> {
        &self.store
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Run the CLI application with the given command.
    ///
    /// `input` is only read for confirmations and by the shell.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        command: Commands,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        match command {
            Commands::Shell => self.run_shell(input, out),
            command => self.execute(command, input, out),
        }
    }

    fn execute<R: BufRead, W: Write>(
        &mut self,
        command: Commands,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        match command {
            Commands::Add { text } => self.handle_add(&text.join(" "), out),
            Commands::List { json } => self.display_todos(json, out),
            Commands::Toggle { target } => self.handle_toggle(&target, out),
            Commands::Edit { target, text } => self.handle_edit(&target, &text.join(" "), out),
            Commands::Delete { target } => self.handle_delete(&target, out),
            Commands::Clear { force } => self.handle_clear(force, input, out),
            Commands::Stats { json } => self.display_stats(json, out),
            Commands::Shell => {
                writeln!(out, "Already in the shell.")?;
                Ok(())
            }
        }
    }

    fn handle_add<W: Write>(&mut self, text: &str, out: &mut W) -> Result<()> {
        match self.store.add(text)? {
            Some(id) => writeln!(out, "Added @{} (id {})", self.store.len(), id)?,
            None => writeln!(out, "Nothing to add: the text is empty.")?,
        }
        Ok(())
    }

    fn handle_toggle<W: Write>(&mut self, target: &str, out: &mut W) -> Result<()> {
        let Some(id) = self.resolve(target, out)? else {
            return Ok(());
        };

        if !self.store.toggle(id)? {
            writeln!(out, "No todo with id {}.", id)?;
            return Ok(());
        }

        if let Some(todo) = self.store.get(id) {
            let state = if todo.completed { "done" } else { "open" };
            writeln!(out, "Marked \"{}\" as {}.", todo.text, state)?;
        }
        Ok(())
    }

    fn handle_delete<W: Write>(&mut self, target: &str, out: &mut W) -> Result<()> {
        let Some(id) = self.resolve(target, out)? else {
            return Ok(());
        };

        let text = self.store.get(id).map(|todo| todo.text.clone());
        if self.store.delete(id)? {
            writeln!(out, "Deleted \"{}\".", text.unwrap_or_default())?;
            if self.session.editing() == Some(id) {
                self.session.cancel();
            }
        } else {
            writeln!(out, "No todo with id {}.", id)?;
        }
        Ok(())
    }

    /// Start and commit an edit in one step.
    fn handle_edit<W: Write>(&mut self, target: &str, text: &str, out: &mut W) -> Result<()> {
        if !self.begin_edit(target, out)? {
            return Ok(());
        }

        self.session.set_draft(text);
        let outcome = self.commit_edit(out)?;
        if outcome == EditOutcome::Rejected {
            // No further input will follow, so there is no edit to keep open
            self.session.cancel();
        }
        Ok(())
    }

    fn begin_edit<W: Write>(&mut self, target: &str, out: &mut W) -> Result<bool> {
        let Some(id) = self.resolve(target, out)? else {
            return Ok(false);
        };

        match self.store.get(id) {
            Some(todo) => {
                self.session.start(id, &todo.text);
                Ok(true)
            }
            None => {
                writeln!(out, "No todo with id {}.", id)?;
                Ok(false)
            }
        }
    }

    fn commit_edit<W: Write>(&mut self, out: &mut W) -> Result<EditOutcome> {
        let outcome = self.session.commit(&mut self.store)?;
        match outcome {
            EditOutcome::Saved => writeln!(out, "Updated.")?,
            EditOutcome::Rejected => writeln!(
                out,
                "The text cannot be empty. Enter new text, or {} to stop editing.",
                CANCEL_EDIT
            )?,
            EditOutcome::Missing => writeln!(out, "That todo no longer exists.")?,
        }
        Ok(outcome)
    }

    fn handle_clear<R: BufRead, W: Write>(
        &mut self,
        force: bool,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        if self.store.is_empty() {
            writeln!(out, "The list is already empty.")?;
            return Ok(());
        }

        let cleared = if force {
            self.store.clear_all(&mut |_: &str| true)?
        } else {
            let mut prompt = TerminalPrompt {
                input: &mut *input,
                out: &mut *out,
            };
            self.store.clear_all(&mut prompt)?
        };

        if cleared {
            self.session.cancel();
            writeln!(out, "All todos deleted.")?;
        } else {
            writeln!(out, "Nothing deleted.")?;
        }
        Ok(())
    }

    /// Display the list followed by its counts
    fn display_todos<W: Write>(&self, json: bool, out: &mut W) -> Result<()> {
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(self.store.todos())?)?;
            return Ok(());
        }

        if self.store.is_empty() {
            writeln!(out, "No todos yet. Add one with `add <text>`.")?;
        }

        for (index, todo) in self.store.todos().iter().enumerate() {
            let mark = if todo.completed { "[x]" } else { "[ ]" };
            let text = if todo.completed {
                style(&todo.text).dim().strikethrough().to_string()
            } else {
                todo.text.clone()
            };

            let mut line = format!("{:>3}. {} {}", index + 1, mark, text);
            if self.session.editing() == Some(todo.id) {
                line.push_str(&format!(" {}", style("(editing)").yellow()));
            }
            line.push_str(&format!("  {}", style(format!("id {}", todo.id)).dim()));
            if self.verbose {
                let created = todo.created_at.format("%Y-%m-%d %H:%M");
                line.push_str(&format!(" {}", style(format!("created {}", created)).dim()));
            }
            writeln!(out, "{}", line)?;
        }

        // Use terminal width for the separator if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);
        writeln!(out, "{}", "-".repeat(term_width.min(40)))?;
        let stats = self.store.stats();
        writeln!(out, "{} ({} open)", style(stats).bold(), stats.remaining())?;
        Ok(())
    }

    fn display_stats<W: Write>(&self, json: bool, out: &mut W) -> Result<()> {
        let stats = self.store.stats();
        if json {
            writeln!(out, "{}", serde_json::to_string(&stats)?)?;
        } else {
            writeln!(out, "{}", stats)?;
        }
        Ok(())
    }

    /// Turns an id or `@N` position into an id, reporting positions that do
    /// not exist. Ids are passed through unchecked.
    fn resolve<W: Write>(&self, target: &str, out: &mut W) -> Result<Option<i64>> {
        match parse_target(target)? {
            Target::Id(id) => Ok(Some(id)),
            Target::Position(position) => match self.store.nth(position) {
                Some(todo) => Ok(Some(todo.id)),
                None => {
                    writeln!(out, "No todo at position @{}.", position)?;
                    Ok(None)
                }
            },
        }
    }

    /// Read commands line by line until `quit` or end of input.
    fn run_shell<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        info!("Starting interactive shell");
        writeln!(out, "Type `help` for commands, `quit` to leave.")?;
        self.display_todos(false, out)?;

        loop {
            let prompt = if self.session.editing().is_some() {
                "edit> "
            } else {
                "todo> "
            };
            write!(out, "{}", prompt)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }
            let line = line.trim_end_matches(['\r', '\n']);

            match self.handle_shell_line(line, input, out) {
                Ok(ShellFlow::Continue) => {}
                Ok(ShellFlow::Quit) => break,
                Err(e) => {
                    warn!("Shell command failed: {}", e);
                    writeln!(out, "error: {}", e)?;
                }
            }
        }

        self.session.cancel();
        info!("Leaving interactive shell");
        Ok(())
    }

    fn handle_shell_line<R: BufRead, W: Write>(
        &mut self,
        line: &str,
        input: &mut R,
        out: &mut W,
    ) -> Result<ShellFlow> {
        // While editing, each line is the new draft
        if self.session.editing().is_some() {
            if line.trim() == CANCEL_EDIT {
                self.session.cancel();
                writeln!(out, "Edit cancelled.")?;
            } else {
                self.session.set_draft(line);
                self.commit_edit(out)?;
            }
            return Ok(ShellFlow::Continue);
        }

        let words = shell_words::split(line).map_err(|e| TodoError::ApplicationError {
            message: format!("Failed to parse command: {}", e),
        })?;
        debug!("Shell words: {:?}", words);

        match words.first().map(String::as_str) {
            None => return Ok(ShellFlow::Continue),
            Some("quit") | Some("exit") => return Ok(ShellFlow::Quit),
            Some("help") => {
                writeln!(out, "{}", ShellLine::command().render_help())?;
                writeln!(out, "A target is a todo id, or @N for the N-th item in `list`.")?;
                writeln!(
                    out,
                    "`edit <target>` on its own starts editing: type the new text, or {} to stop.",
                    CANCEL_EDIT
                )?;
                return Ok(ShellFlow::Continue);
            }
            Some("edit") if words.len() == 2 => {
                if self.begin_edit(&words[1], out)? {
                    writeln!(
                        out,
                        "Editing \"{}\". Enter new text, or {} to stop.",
                        self.session.draft().unwrap_or_default(),
                        CANCEL_EDIT
                    )?;
                }
                return Ok(ShellFlow::Continue);
            }
            Some(_) => {}
        }

        match ShellLine::try_parse_from(&words) {
            Ok(parsed) => self.execute(parsed.command, input, out)?,
            Err(e) => writeln!(out, "{}", e)?,
        }
        Ok(ShellFlow::Continue)
    }
}

fn parse_target(target: &str) -> Result<Target> {
    let invalid = || TodoError::ApplicationError {
        message: format!(
            "Invalid todo reference '{}': use an id or @N for a position",
            target
        ),
    };

    let trimmed = target.trim();
    match trimmed.strip_prefix('@') {
        Some(position) => position
            .parse::<usize>()
            .map(Target::Position)
            .map_err(|_| invalid()),
        None => trimmed.parse::<i64>().map(Target::Id).map_err(|_| invalid()),
    }
}
