//! yap add command implementation

use std::path::PathBuf;

use crate::cli::{load_context, parse_date_arg};
use crate::error::Result;
use crate::output::{emit_success, Human, OutputOptions};
use crate::task::NewTask;

pub struct AddOptions {
    pub title: Vec<String>,
    pub due: Option<String>,
    pub wait: Option<String>,
    pub on: Option<String>,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: AddOptions) -> Result<()> {
    // Validate arguments before taking the lock.
    let (due_date, wait_date) = match parse_date_arg(options.on.as_deref())? {
        Some(on) => (Some(on), Some(on)),
        None => (
            parse_date_arg(options.due.as_deref())?,
            parse_date_arg(options.wait.as_deref())?,
        ),
    };
    let title = options.title.join(" ");

    let ctx = load_context(options.home)?;
    let added = ctx.tracker.add(NewTask {
        title,
        due_date,
        wait_date,
    })?;

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "add",
        &added,
        Some(&Human::Line(added.id.to_string())),
    )
}
