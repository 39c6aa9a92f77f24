//! yap edit command implementation

use std::path::PathBuf;

use crate::cli::show::task_report;
use crate::cli::{load_context, parse_date_arg};
use crate::error::Result;
use crate::output::{emit_success, Human, OutputOptions};
use crate::task::{TaskEdit, TaskState};

pub struct EditOptions {
    pub id: String,
    pub title: Option<Vec<String>>,
    pub due: Option<String>,
    pub wait: Option<String>,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: EditOptions) -> Result<()> {
    let id = options.id.parse()?;
    let edit = TaskEdit {
        title: options.title.map(|words| words.join(" ")),
        due_date: options
            .due
            .as_deref()
            .map(|v| parse_date_arg(Some(v)))
            .transpose()?,
        wait_date: options
            .wait
            .as_deref()
            .map(|v| parse_date_arg(Some(v)))
            .transpose()?,
    };

    let ctx = load_context(options.home)?;
    let edited = ctx.tracker.edit(id, edit)?;
    drop(ctx);

    let human = Human::Report(task_report(&edited, TaskState::Pending));
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "edit",
        &edited,
        Some(&human),
    )
}
