use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Context, Result};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use todolist::session::{Action, warning_message};
use todolist::{CorruptPolicy, DEFAULT_TASKS_FILE, Filter, Session, StoreError, TaskStore, read_snapshot, view};
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "Add, edit, complete, remove and filter tasks kept in a JSON file")]
#[command(version)]
struct Cli {
    /// Path to the task file
    #[arg(short, long, default_value = DEFAULT_TASKS_FILE)]
    file: PathBuf,

    /// What to do when the task file cannot be parsed
    #[arg(long, value_enum, default_value_t = OnCorrupt::Fail)]
    on_corrupt: OnCorrupt,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Runs the interactive shell when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnCorrupt {
    /// Stop with an error and leave the file untouched
    Fail,
    /// Move the file to an unused <file>.corrupt[.N] and start with no tasks
    StartEmpty,
}

impl From<OnCorrupt> for CorruptPolicy {
    fn from(value: OnCorrupt) -> Self {
        match value {
            OnCorrupt::Fail => CorruptPolicy::Fail,
            OnCorrupt::StartEmpty => CorruptPolicy::StartEmpty,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task title (prompted for when omitted)
        title: Vec<String>,
    },

    /// Remove the task at a position
    Remove { position: Option<usize> },

    /// Mark the task at a position as completed
    Complete { position: Option<usize> },

    /// Change the title of the task at a position
    Edit {
        position: Option<usize>,

        /// New title (prompted for when omitted)
        title: Vec<String>,
    },

    /// List tasks
    List {
        /// all, pending or completed
        #[arg(short = 's', long, default_value = "all")]
        filter: Filter,
    },

    /// Interactive session
    Shell,
}

fn main() -> Result<()> {
    let Cli {
        file,
        on_corrupt,
        verbose,
        command,
    } = Cli::parse();
    init_tracing(verbose);

    let color = io::stdout().is_terminal();
    let policy = CorruptPolicy::from(on_corrupt);

    match command.unwrap_or(Commands::Shell) {
        // Listing only reads, so it does not take the store lock
        Commands::List { filter } => {
            let tasks =
                read_snapshot(&file).wrap_err_with(|| format!("Failed to read task file {}", file.display()))?;
            print!("{}", view::render_table(&todolist::filter::apply(&tasks, filter), color));
        }
        Commands::Shell => {
            let mut store = open_store(&file, policy)?;
            let stdin = io::stdin();
            Session::new(&mut store, stdin.lock(), io::stdout())
                .with_color(color)
                .run()?;
        }
        Commands::Add { title } => {
            let mut store = open_store(&file, policy)?;
            let title = text_or_prompt(title, "Enter task title: ")?;
            let result = store.add(&title);
            report(None, result, color)?;
            print_table(&store, color);
        }
        Commands::Remove { position } => {
            let mut store = open_store(&file, policy)?;
            let result = store
                .resolve_selection(position)
                .and_then(|position| store.remove(position).map(|_| ()));
            report(Some(Action::Remove), result, color)?;
            print_table(&store, color);
        }
        Commands::Complete { position } => {
            let mut store = open_store(&file, policy)?;
            let result = store
                .resolve_selection(position)
                .and_then(|position| store.complete(position));
            report(Some(Action::Complete), result, color)?;
            print_table(&store, color);
        }
        Commands::Edit { position, title } => {
            let mut store = open_store(&file, policy)?;
            let result = match store.resolve_selection(position) {
                Ok(position) => {
                    let current = store.get(position)?.title.clone();
                    let title = text_or_prompt(title, &format!("Enter new task title [{}]: ", current))?;
                    store.edit(position, &title)
                }
                Err(e) => Err(e),
            };
            report(Some(Action::Edit), result, color)?;
            print_table(&store, color);
        }
    }

    Ok(())
}

fn open_store(file: &Path, policy: CorruptPolicy) -> Result<TaskStore> {
    TaskStore::open_with(file, policy).wrap_err_with(|| format!("Failed to open task file {}", file.display()))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn print_table(store: &TaskStore, color: bool) {
    print!("{}", view::render_table(&store.list(Filter::All), color));
}

/// Warnings go to stderr and leave the exit code at 0; storage errors propagate.
fn report(action: Option<Action>, result: Result<(), StoreError>, color: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(StoreError::EmptyInput) => {
            info!("Empty title, nothing changed");
            Ok(())
        }
        Err(e) => match action.and_then(|action| warning_message(action, &e)) {
            Some(message) => {
                eprintln!("{}", view::warning(&message, color));
                Ok(())
            }
            None => Err(e).wrap_err("Failed to update task file"),
        },
    }
}

/// Join words given on the command line, or ask on a terminal
///
/// Returns an empty string when there is nothing to ask, which callers treat as cancel.
fn text_or_prompt(words: Vec<String>, prompt: &str) -> Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Ok(String::new());
    }

    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    stdin.lock().read_line(&mut line).context("Failed to read title")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_failure() -> StoreError {
        StoreError::StorageUnavailable {
            path: "tasks.json".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
    }

    #[test]
    fn test_report_success_and_cancel() {
        assert!(report(None, Ok(()), false).is_ok());
        assert!(report(Some(Action::Edit), Err(StoreError::EmptyInput), false).is_ok());
    }

    #[test]
    fn test_report_warnings_do_not_fail() {
        assert!(report(Some(Action::Remove), Err(StoreError::NoSelection), false).is_ok());
        assert!(report(Some(Action::Complete), Err(StoreError::InvalidPosition { position: 5, len: 2 }), false).is_ok());
    }

    #[test]
    fn test_report_propagates_storage_errors() {
        let err = report(Some(Action::Complete), Err(io_failure()), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::StorageUnavailable { .. })
        ));
        assert!(report(None, Err(io_failure()), false).is_err());
    }

    #[test]
    fn test_text_or_prompt_joins_words() {
        let title = text_or_prompt(vec!["Buy".to_string(), "milk".to_string()], "unused").unwrap();
        assert_eq!(title, "Buy milk");
    }

    #[test]
    fn test_cli_parses_list_filter() {
        let cli = Cli::try_parse_from(["todolist", "list", "--filter", "pending"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List { filter: Filter::Pending })));
        assert_eq!(cli.file, PathBuf::from(DEFAULT_TASKS_FILE));

        let cli = Cli::try_parse_from(["todolist", "--on-corrupt", "start-empty", "edit", "2", "Walk", "dog"]).unwrap();
        assert!(matches!(cli.on_corrupt, OnCorrupt::StartEmpty));
        match cli.command {
            Some(Commands::Edit { position, title }) => {
                assert_eq!(position, Some(2));
                assert_eq!(title, vec!["Walk", "dog"]);
            }
            _ => panic!("expected edit"),
        }
    }
}
