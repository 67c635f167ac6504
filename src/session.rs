// Interactive session: the presentation layer over a TaskStore

use crate::error::StoreError;
use crate::filter::Filter;
use crate::store::TaskStore;
use crate::view;
use eyre::{Context, Result};
use std::io::{BufRead, Write};
use tracing::debug;

const HELP: &str = "\
Commands:
  add [TITLE]          add a task (prompts when TITLE is omitted)
  remove N             remove task N
  complete N           mark task N as completed
  edit N [TITLE]       change the title of task N (prompts when TITLE is omitted)
  filter all|pending|completed
                       choose which tasks are shown
  list                 show tasks again
  help                 show this help
  quit                 leave
";

/// Operations that need a selected task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Remove,
    Complete,
    Edit,
}

impl Action {
    fn phrase(self) -> &'static str {
        match self {
            Action::Remove => "remove",
            Action::Complete => "mark as completed",
            Action::Edit => "edit",
        }
    }
}

/// User-facing text for a validation failure, or `None` if the error is not a warning
pub fn warning_message(action: Action, err: &StoreError) -> Option<String> {
    match err {
        StoreError::NoSelection => Some(format!("Please select a task to {}.", action.phrase())),
        StoreError::InvalidPosition { position, .. } => Some(format!("There is no task #{}.", position)),
        _ => None,
    }
}

/// One parsed line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Option<String>),
    Remove(Option<usize>),
    Complete(Option<usize>),
    Edit(Option<usize>, Option<String>),
    Filter(Filter),
    List,
    Help,
    Quit,
}

/// Parse a command line; blank lines yield `Ok(None)`
pub fn parse_command(line: &str) -> std::result::Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let text = (!rest.is_empty()).then(|| rest.to_string());

    let command = match word.to_ascii_lowercase().as_str() {
        "add" | "a" => Command::Add(text),
        "remove" | "rm" => Command::Remove(parse_position(rest)?),
        "complete" | "done" => Command::Complete(parse_position(rest)?),
        "edit" | "e" => {
            let (pos, title) = match rest.split_once(char::is_whitespace) {
                Some((pos, title)) => (pos, title.trim()),
                None => (rest, ""),
            };
            Command::Edit(parse_position(pos)?, (!title.is_empty()).then(|| title.to_string()))
        }
        "filter" | "f" => Command::Filter(rest.parse::<Filter>().map_err(|e| e.to_string())?),
        "list" | "ls" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}' (type 'help')", other)),
    };
    Ok(Some(command))
}

fn parse_position(s: &str) -> std::result::Result<Option<usize>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let s = s.strip_prefix('#').unwrap_or(s);
    s.parse::<usize>()
        .map(Some)
        .map_err(|_| format!("'{}' is not a task number", s))
}

/// Line-oriented session driving a [`TaskStore`]
///
/// Keeps the current filter between commands and re-renders the filtered
/// list after each one, so positions shown are always fresh.
pub struct Session<'a, R, W> {
    store: &'a mut TaskStore,
    filter: Filter,
    input: R,
    output: W,
    color: bool,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(store: &'a mut TaskStore, input: R, output: W) -> Self {
        Self {
            store,
            filter: Filter::All,
            input,
            output,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Run until `quit` or end of input
    ///
    /// Storage failures end the session with an error.
    pub fn run(&mut self) -> Result<()> {
        self.render()?;

        loop {
            let Some(line) = self.read_line("> ")? else {
                break;
            };

            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    self.warn(&message)?;
                    continue;
                }
            };
            debug!(?command, "session command");

            let rerender = command != Command::Help;
            if !self.execute(command)? {
                break;
            }
            if rerender {
                self.render()?;
            }
        }

        Ok(())
    }

    /// Apply one command; returns false when the session should end
    pub fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Add(title) => {
                let title = match title {
                    Some(title) => title,
                    None => self.read_line("Enter task title: ")?.unwrap_or_default(),
                };
                let result = self.store.add(&title);
                self.settle(None, result)?;
            }
            Command::Remove(selection) => {
                let result = self
                    .store
                    .resolve_selection(selection)
                    .and_then(|position| self.store.remove(position).map(|_| ()));
                self.settle(Some(Action::Remove), result)?;
            }
            Command::Complete(selection) => {
                let result = self
                    .store
                    .resolve_selection(selection)
                    .and_then(|position| self.store.complete(position));
                self.settle(Some(Action::Complete), result)?;
            }
            Command::Edit(selection, title) => {
                let position = match self.store.resolve_selection(selection) {
                    Ok(position) => position,
                    Err(e) => {
                        self.settle(Some(Action::Edit), Err(e))?;
                        return Ok(true);
                    }
                };
                let title = match title {
                    Some(title) => title,
                    None => {
                        let current = self.store.get(position)?.title.clone();
                        self.read_line(&format!("Enter new task title [{}]: ", current))?
                            .unwrap_or_default()
                    }
                };
                let result = self.store.edit(position, &title);
                self.settle(Some(Action::Edit), result)?;
            }
            Command::Filter(filter) => self.filter = filter,
            Command::List => {}
            Command::Help => self.output.write_all(HELP.as_bytes())?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Report warnings, drop cancelled input, propagate storage errors
    fn settle(&mut self, action: Option<Action>, result: crate::error::Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(StoreError::EmptyInput) => Ok(()),
            Err(e) => match action.and_then(|action| warning_message(action, &e)) {
                Some(message) => self.warn(&message),
                None => Err(e).wrap_err_with(|| format!("Failed to update {}", self.store.path().display())),
            },
        }
    }

    fn render(&mut self) -> Result<()> {
        let rows = self.store.list(self.filter);
        writeln!(self.output, "[{}]", self.filter)?;
        self.output.write_all(view::render_table(&rows, self.color).as_bytes())?;
        Ok(())
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", view::warning(message, self.color))?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        let n = self.input.read_line(&mut line).context("Failed to read input")?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
