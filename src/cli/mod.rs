//! Command-line interface for yap
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is implemented in its own submodule.

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{resolve_home, Config};
use crate::datetime::TaskDate;
use crate::error::Result;
use crate::link::LinkId;
use crate::lock::FileLock;
use crate::sort::SortKey;
use crate::storage::Storage;
use crate::task::Tracker;

mod add;
mod edit;
mod list;
mod show;
mod transition;

/// yap - yet another planner
///
/// Keeps one file per task under a home directory and gives pending and
/// completed tasks short numeric ids.
#[derive(Parser, Debug)]
#[command(name = "yap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Home directory for task files [default: ~/.yap]
    #[arg(long, global = true, env = "YAP_HOME")]
    pub home: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run; lists pending tasks when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new pending task and print its id
    #[command(visible_alias = "a")]
    Add {
        /// Task title
        #[arg(required = true)]
        title: Vec<String>,

        /// Due date: YYYY-MM-DD, HH:MM, "YYYY-MM-DD HH:MM", today, tomorrow
        #[arg(short, long)]
        due: Option<String>,

        /// Hide the task from `list pending` until this date
        #[arg(short, long)]
        wait: Option<String>,

        /// Set both due and wait date
        #[arg(short, long, conflicts_with_all = ["due", "wait"])]
        on: Option<String>,
    },

    /// List pending, completed or waiting tasks
    #[command(visible_alias = "l")]
    List {
        /// Which tasks to list
        #[arg(value_enum, default_value_t = ListKind::Pending)]
        kind: ListKind,

        /// Override the ordering
        #[arg(long, value_enum)]
        sort: Option<SortKey>,

        /// Show at most this many tasks (0 = all)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Mark pending tasks as completed
    #[command(visible_alias = "c")]
    Complete {
        /// Pending task ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Move completed tasks back to pending
    Continue {
        /// Completed task ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show every field of one task
    Show {
        /// Task id
        id: String,

        /// Look the id up among completed tasks
        #[arg(long)]
        completed: bool,
    },

    /// Change the title or dates of a pending task
    Edit {
        /// Pending task id
        id: String,

        /// New title
        #[arg(short, long, num_args = 1..)]
        title: Option<Vec<String>>,

        /// New due date ("" clears it)
        #[arg(short, long)]
        due: Option<String>,

        /// New wait date ("" clears it)
        #[arg(short, long)]
        wait: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    Pending,
    Completed,
    Waiting,
}

/// Everything a command needs once the home is open and locked
struct TaskContext {
    tracker: Tracker,
    config: Config,
    // Held for the whole command; released on drop.
    _lock: FileLock,
}

fn load_context(home: Option<PathBuf>) -> Result<TaskContext> {
    let home = resolve_home(home.as_deref())?;
    let storage = Storage::open(&home)?;
    let lock = FileLock::acquire_instance(storage.lock_file())?;
    let config = Config::load_or_default(&storage.config_file())?;
    tracing::debug!(home = %storage.home().display(), "home opened");
    Ok(TaskContext {
        tracker: Tracker::new(storage),
        config,
        _lock: lock,
    })
}

/// Parse every id up front so a typo fails before any task moves.
fn parse_ids(raw: &[String]) -> Result<Vec<LinkId>> {
    raw.iter().map(|s| s.parse()).collect()
}

/// Parse a date flag. An empty value means "no date".
fn parse_date_arg(value: Option<&str>) -> Result<Option<TaskDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => TaskDate::parse_relative(value, Local::now().naive_local()).map(Some),
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn format_date(date: Option<&TaskDate>) -> String {
    date.map(ToString::to_string).unwrap_or_default()
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let command = self.command.unwrap_or(Commands::List {
            kind: ListKind::Pending,
            sort: None,
            limit: None,
        });

        match command {
            Commands::Add {
                title,
                due,
                wait,
                on,
            } => add::run(add::AddOptions {
                title,
                due,
                wait,
                on,
                home: self.home,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List { kind, sort, limit } => list::run(list::ListOptions {
                kind,
                sort,
                limit,
                home: self.home,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Complete { ids } => transition::run_complete(transition::TransitionOptions {
                ids,
                home: self.home,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Continue { ids } => transition::run_continue(transition::TransitionOptions {
                ids,
                home: self.home,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Show { id, completed } => show::run(show::ShowOptions {
                id,
                completed,
                home: self.home,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Edit {
                id,
                title,
                due,
                wait,
            } => edit::run(edit::EditOptions {
                id,
                title,
                due,
                wait,
                home: self.home,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}
